//! Pieces shared by both binaries.

use clap::ValueEnum;
use slide_backend::BackendKind;

/// Backend choice on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// Google Translate web page (no key needed)
    Google,
    /// DeepL API (needs a key)
    Deepl,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Google => BackendKind::Google,
            BackendArg::Deepl => BackendKind::Deepl,
        }
    }
}

/// Initialize logging; `RUST_LOG` still overrides the default level.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
