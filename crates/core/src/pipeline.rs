//! Per-unit translation: protect the brand name, translate, restore.

use crate::backend::SourceLanguage;
use crate::brand::BrandGuard;
use crate::report::{RunReport, UnitOutcome, UnitStatus};
use crate::translator::ChunkedTranslator;
use crate::{Error, Result};
use std::borrow::Cow;

/// Translates single units of text and records each outcome.
#[derive(Clone)]
pub struct UnitPipeline {
    guard: BrandGuard,
    translator: ChunkedTranslator,
    source: SourceLanguage,
    target: String,
}

impl UnitPipeline {
    /// Create a pipeline, checking that the backend can serve the request.
    ///
    /// Fails when auto-detection is requested from a backend without it, or
    /// when the chunk size exceeds what the backend accepts.
    pub fn new(
        translator: ChunkedTranslator,
        source: SourceLanguage,
        target: impl Into<String>,
    ) -> Result<Self> {
        let target = target.into();
        let backend = translator.backend();

        if target.trim().is_empty() {
            return Err(Error::InvalidConfig("target language is empty".to_string()));
        }
        if source == SourceLanguage::Auto && !backend.supports_auto_detect() {
            return Err(Error::InvalidConfig(format!(
                "{} cannot detect the source language; pass one explicitly",
                backend.name()
            )));
        }
        if translator.chunk_size() > backend.max_chunk_chars() {
            return Err(Error::InvalidConfig(format!(
                "chunk size {} exceeds the {} limit of {} characters",
                translator.chunk_size(),
                backend.name(),
                backend.max_chunk_chars()
            )));
        }

        Ok(Self {
            guard: BrandGuard::default(),
            translator,
            source,
            target,
        })
    }

    /// Use a different brand guard.
    pub fn with_guard(mut self, guard: BrandGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Target language code.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Translate one unit and record the outcome in `report`.
    pub async fn translate_unit(&self, text: &str, report: &mut RunReport) -> String {
        let outcome = self.process(text).await;
        if outcome.status != UnitStatus::SkippedBlank {
            log::info!("{} -> {}", outcome.original, outcome.translated);
        }
        let translated = outcome.translated.clone();
        report.record_unit(outcome);
        translated
    }

    async fn process(&self, text: &str) -> UnitOutcome {
        if text.trim().is_empty() {
            return UnitOutcome {
                original: text.to_string(),
                translated: text.to_string(),
                status: UnitStatus::SkippedBlank,
                chunks: Vec::new(),
            };
        }

        let collides = self.guard.collides(text);
        if collides {
            log::warn!(
                "Text already contains the placeholder {:?}; translating without brand protection",
                self.guard.placeholder()
            );
        }

        let protected = if collides {
            Cow::Borrowed(text)
        } else {
            self.guard.protect(text)
        };

        if !collides && self.guard.is_brand_only(&protected) {
            return UnitOutcome {
                original: text.to_string(),
                translated: self.guard.canonical().to_string(),
                status: UnitStatus::BrandOnly,
                chunks: Vec::new(),
            };
        }

        let translation = self
            .translator
            .translate(&protected, &self.source, &self.target)
            .await;

        let translated = if collides {
            self.guard.restore_variants(&translation.text).into_owned()
        } else {
            self.guard.restore(&translation.text).into_owned()
        };

        let status = if translated.trim() != text.trim() {
            UnitStatus::Translated
        } else {
            UnitStatus::Unchanged
        };

        UnitOutcome {
            original: text.to_string(),
            translated,
            status,
            chunks: translation.chunks,
        }
    }
}
