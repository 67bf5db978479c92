//! The translation backend seam.

use crate::BackendError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source language of a translation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceLanguage {
    /// Let the backend detect the language.
    Auto,
    /// A backend-specific language code.
    Code(String),
}

impl SourceLanguage {
    /// Parse a command-line value; `auto` (any case) or an empty string means
    /// auto-detection.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("auto") {
            Self::Auto
        } else {
            Self::Code(value.to_string())
        }
    }

    /// The language code, or `None` for auto-detection.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Auto => None,
            Self::Code(code) => Some(code),
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Code(code) => write!(f, "{}", code),
        }
    }
}

/// A remote machine translation service.
///
/// Implementations are stateless from the pipeline's point of view and are
/// called concurrently for the chunks of one unit.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Translate `text` from `source` into `target`.
    ///
    /// An empty string in the `Ok` case counts as "no translation".
    async fn translate(
        &self,
        text: &str,
        source: &SourceLanguage,
        target: &str,
    ) -> std::result::Result<String, BackendError>;

    /// Short name for logs.
    fn name(&self) -> &str;

    /// Whether [`SourceLanguage::Auto`] is accepted.
    fn supports_auto_detect(&self) -> bool {
        true
    }

    /// Largest payload the service accepts in one call, in characters.
    fn max_chunk_chars(&self) -> usize;
}
