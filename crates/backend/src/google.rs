//! Google Translate through its mobile web page.
//!
//! No API key is needed. The page is fetched with the text in the query
//! string and the translation is scraped from the `result-container` div.

use async_trait::async_trait;
use quick_xml::escape::unescape;
use regex::Regex;
use reqwest::Client;
use slide_core::{BackendError, SourceLanguage, TranslationBackend};
use std::sync::LazyLock;
use std::time::Duration;

const BASE_URL: &str = "https://translate.google.com/m";

/// Longest text the page accepts.
pub const GOOGLE_MAX_CHARS: usize = 5000;

static RESULT_CONTAINER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div[^>]*class="[^"]*\bresult-container\b[^"]*"[^>]*>(.*?)</div>"#).unwrap()
});

/// Scrapes translations from translate.google.com.
pub struct GoogleWebTranslator {
    client: Client,
    base_url: String,
}

impl Default for GoogleWebTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleWebTranslator {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the translator at a different host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Query parameters of one request.
fn query_params<'a>(text: &'a str, source: &'a SourceLanguage, target: &'a str) -> [(&'static str, &'a str); 3] {
    [
        ("sl", source.code().unwrap_or("auto")),
        ("tl", target),
        ("q", text),
    ]
}

/// Pull the translated text out of the result page.
fn extract_translation(html: &str) -> Result<String, BackendError> {
    let raw = RESULT_CONTAINER
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| BackendError::Parse("no result-container in response".to_string()))?;

    let raw = raw.replace("&nbsp;", "\u{a0}");
    unescape(&raw)
        .map(|text| text.into_owned())
        .map_err(|e| BackendError::Parse(format!("bad entity in translation: {}", e)))
}

#[async_trait]
impl TranslationBackend for GoogleWebTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &SourceLanguage,
        target: &str,
    ) -> Result<String, BackendError> {
        if text.chars().count() > GOOGLE_MAX_CHARS {
            return Err(BackendError::Unsupported(format!(
                "text longer than {} characters",
                GOOGLE_MAX_CHARS
            )));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&query_params(text, source, target))
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Request(format!("Failed to read response: {}", e)))?;
        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        extract_translation(&body)
    }

    fn name(&self) -> &str {
        "google"
    }

    fn max_chunk_chars(&self) -> usize {
        GOOGLE_MAX_CHARS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params() {
        let auto = SourceLanguage::Auto;
        assert_eq!(
            query_params("Hello", &auto, "fr"),
            [("sl", "auto"), ("tl", "fr"), ("q", "Hello")]
        );

        let en = SourceLanguage::Code("en".into());
        assert_eq!(query_params("Hi", &en, "de")[0], ("sl", "en"));
    }

    #[test]
    fn test_extract_translation() {
        let html = r#"<html><body><div class="other">x</div>
<div class="result-container">Bonjour l&#39;ami &amp; co&nbsp;!</div></body></html>"#;
        assert_eq!(extract_translation(html).unwrap(), "Bonjour l'ami & co\u{a0}!");
    }

    #[test]
    fn test_extract_translation_multiline() {
        let html = "<div dir=\"ltr\" class=\"result-container\">ligne 1\nligne 2</div>";
        assert_eq!(extract_translation(html).unwrap(), "ligne 1\nligne 2");
    }

    #[test]
    fn test_missing_container_is_parse_error() {
        assert!(matches!(
            extract_translation("<html>captcha</html>"),
            Err(BackendError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_oversized_text() {
        let translator = GoogleWebTranslator::new().with_base_url("http://127.0.0.1:9");
        let text = "a".repeat(GOOGLE_MAX_CHARS + 1);
        let result = translator.translate(&text, &SourceLanguage::Auto, "fr").await;
        assert!(matches!(result, Err(BackendError::Unsupported(_))));
    }

    #[test]
    fn test_capabilities() {
        let translator = GoogleWebTranslator::default();
        assert!(translator.supports_auto_detect());
        assert_eq!(translator.max_chunk_chars(), 5000);
        assert_eq!(translator.name(), "google");
    }
}
