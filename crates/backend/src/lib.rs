//! Translation backends for the slide deck translator.

pub mod deepl;
pub mod google;

pub use deepl::{DeepLTranslator, DEEPL_API_KEY_ENV};
pub use google::GoogleWebTranslator;
pub use slide_core::BackendError;

use serde::{Deserialize, Serialize};
use slide_core::TranslationBackend;
use std::fmt;
use std::sync::Arc;

/// Available backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Google Translate web page, no key needed.
    Google,
    /// DeepL API, needs a key.
    Deepl,
}

impl BackendKind {
    /// Instantiate the backend. `api_key` is only used by DeepL.
    pub fn build(
        self,
        api_key: Option<&str>,
    ) -> Result<Arc<dyn TranslationBackend>, BackendError> {
        match self {
            Self::Google => Ok(Arc::new(GoogleWebTranslator::new())),
            Self::Deepl => {
                let key = api_key
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| {
                        BackendError::MissingApiKey(format!(
                            "deepl (pass --deepl-api-key or set {})",
                            DEEPL_API_KEY_ENV
                        ))
                    })?;
                Ok(Arc::new(DeepLTranslator::new(key)?))
            }
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::Deepl => write!(f, "deepl"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_google_without_key() {
        let backend = BackendKind::Google.build(None).unwrap();
        assert_eq!(backend.name(), "google");
    }

    #[test]
    fn test_build_deepl_needs_key() {
        assert!(matches!(
            BackendKind::Deepl.build(None),
            Err(BackendError::MissingApiKey(_))
        ));
        assert!(BackendKind::Deepl.build(Some("")).is_err());

        let backend = BackendKind::Deepl.build(Some("k:fx")).unwrap();
        assert_eq!(backend.name(), "deepl");
        assert!(backend.supports_auto_detect());
    }
}
