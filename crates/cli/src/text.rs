//! Translate a single text from the command line.
//!
//! Unlike deck translation this fails closed: any backend error is reported
//! and the process exits with status 2.

mod cli;

use anyhow::{bail, Result};
use clap::Parser;
use cli::{init_logging, BackendArg};
use slide_backend::BackendKind;
use slide_core::SourceLanguage;
use std::process::ExitCode;

/// Translate one text and print the result.
#[derive(Parser, Debug)]
#[command(name = "slide-translate-text")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Text to translate
    text: String,

    /// Target language code (e.g. FR, DE, EN-GB)
    target_lang: String,

    /// Source language code; detected when omitted
    source_lang: Option<String>,

    /// Translation backend
    #[arg(short, long, value_enum, default_value_t = BackendArg::Deepl)]
    backend: BackendArg,

    /// DeepL API key
    #[arg(long, env = "DEEPL_API_KEY", hide_env_values = true)]
    deepl_api_key: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

async fn translate(args: &Args) -> Result<String> {
    let backend = BackendKind::from(args.backend).build(args.deepl_api_key.as_deref())?;
    let source = args
        .source_lang
        .as_deref()
        .map(SourceLanguage::parse)
        .unwrap_or(SourceLanguage::Auto);

    if source == SourceLanguage::Auto && !backend.supports_auto_detect() {
        bail!("{} needs an explicit source language", backend.name());
    }

    Ok(backend.translate(&args.text, &source, &args.target_lang).await?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match translate(&args).await {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Translation error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let args = Args::try_parse_from(["slide-translate-text", "Hello", "fr", "en"]).unwrap();
        assert_eq!(args.text, "Hello");
        assert_eq!(args.target_lang, "fr");
        assert_eq!(args.source_lang.as_deref(), Some("en"));
        assert_eq!(args.backend, BackendArg::Deepl);
    }

    #[tokio::test]
    async fn test_missing_key_fails() {
        let args = Args::try_parse_from([
            "slide-translate-text",
            "Hello",
            "fr",
            "--deepl-api-key",
            "",
        ])
        .unwrap();
        let err = translate(&args).await.unwrap_err();
        assert!(err.to_string().contains("Missing API key"));
    }
}
