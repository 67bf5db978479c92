//! DeepL REST API (`/v2/translate`).

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use slide_core::{BackendError, SourceLanguage, TranslationBackend};
use std::time::Duration;

const FREE_API_URL: &str = "https://api-free.deepl.com/v2/translate";
const PRO_API_URL: &str = "https://api.deepl.com/v2/translate";

/// Environment variable holding the API key.
pub const DEEPL_API_KEY_ENV: &str = "DEEPL_API_KEY";

/// Characters per request. DeepL limits the request body to 128 KiB.
pub const DEEPL_MAX_CHARS: usize = 30_000;

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: [&'a str; 1],
    target_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(default)]
    detected_source_language: Option<String>,
    text: String,
}

/// Client for the DeepL API.
pub struct DeepLTranslator {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl DeepLTranslator {
    /// Create a client. Keys ending in `:fx` belong to the free plan and are
    /// sent to the free endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self, BackendError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(BackendError::MissingApiKey("deepl".to_string()));
        }

        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint_for(&api_key).to_string(),
            api_key,
        })
    }

    /// Use a different endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn endpoint_for(api_key: &str) -> &'static str {
    if api_key.ends_with(":fx") {
        FREE_API_URL
    } else {
        PRO_API_URL
    }
}

fn build_request<'a>(text: &'a str, source: &SourceLanguage, target: &str) -> TranslateRequest<'a> {
    TranslateRequest {
        text: [text],
        target_lang: target.trim().to_uppercase(),
        source_lang: source.code().map(|code| code.trim().to_uppercase()),
    }
}

fn parse_response(body: &str) -> Result<String, BackendError> {
    let response: TranslateResponse =
        serde_json::from_str(body).map_err(|e| BackendError::Parse(e.to_string()))?;
    let translation = response
        .translations
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::Parse("response holds no translations".to_string()))?;

    if let Some(detected) = &translation.detected_source_language {
        log::debug!("DeepL detected source language {}", detected);
    }
    Ok(translation.text)
}

#[async_trait]
impl TranslationBackend for DeepLTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &SourceLanguage,
        target: &str,
    ) -> Result<String, BackendError> {
        let request = build_request(text, source, target);

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("DeepL-Auth-Key {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Request(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = match status.as_u16() {
                403 => "authorization failed, check the API key".to_string(),
                456 => "quota exceeded".to_string(),
                _ => body,
            };
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        parse_response(&body)
    }

    fn name(&self) -> &str {
        "deepl"
    }

    fn max_chunk_chars(&self) -> usize {
        DEEPL_MAX_CHARS
    }
}
