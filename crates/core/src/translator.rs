//! Concurrent, fail-open translation of arbitrarily long text.
//!
//! A unit is cut into chunks the backend accepts, the chunks are translated
//! with a bounded number of requests in flight, and the results are joined
//! back in chunk order. A chunk the backend fails on keeps its original text.

use crate::backend::{SourceLanguage, TranslationBackend};
use crate::chunk::{split_into_chunks, DEFAULT_CHUNK_SIZE};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;

/// Default number of chunk requests in flight per unit.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Delimiter placed between reassembled chunks.
const CHUNK_JOINER: &str = " ";

/// What became of one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ChunkOutcome {
    /// The backend returned a translation.
    Translated(String),
    /// The backend failed or returned nothing; the original text is kept.
    Fallback {
        /// The untranslated chunk.
        original: String,
        /// Why the backend result was not used.
        reason: String,
    },
}

impl ChunkOutcome {
    fn fallback(original: &str, reason: impl Into<String>) -> Self {
        Self::Fallback {
            original: original.to_string(),
            reason: reason.into(),
        }
    }

    /// Text to use when reassembling.
    pub fn text(&self) -> &str {
        match self {
            Self::Translated(text) => text,
            Self::Fallback { original, .. } => original,
        }
    }

    /// True when the original chunk was kept.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Result of translating one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkedTranslation {
    /// Reassembled text.
    pub text: String,
    /// Per-chunk outcomes in chunk order. Empty when nothing was dispatched.
    pub chunks: Vec<ChunkOutcome>,
}

impl ChunkedTranslation {
    /// Number of chunks that fell back to their original text.
    pub fn fallback_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_fallback()).count()
    }
}

/// Splits text into chunks and translates them concurrently.
#[derive(Clone)]
pub struct ChunkedTranslator {
    backend: Arc<dyn TranslationBackend>,
    chunk_size: usize,
    concurrency: usize,
}

impl ChunkedTranslator {
    /// Create a translator with the default chunk size and concurrency.
    pub fn new(backend: Arc<dyn TranslationBackend>) -> Self {
        Self {
            backend,
            chunk_size: DEFAULT_CHUNK_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the maximum chunk length in characters (at least 1).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set how many chunk requests may be in flight at once (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Maximum chunk length in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Maximum number of requests in flight.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// The backend chunks are sent to.
    pub fn backend(&self) -> &dyn TranslationBackend {
        self.backend.as_ref()
    }

    /// Translate `text`. Never fails: chunks the backend cannot handle keep
    /// their original text.
    ///
    /// Blank text is returned as-is without calling the backend. Blank chunks
    /// are neither sent nor reassembled.
    pub async fn translate(
        &self,
        text: &str,
        source: &SourceLanguage,
        target: &str,
    ) -> ChunkedTranslation {
        if text.trim().is_empty() {
            return ChunkedTranslation {
                text: text.to_string(),
                chunks: Vec::new(),
            };
        }

        let chunks: Vec<&str> = split_into_chunks(text, self.chunk_size)
            .into_iter()
            .filter(|chunk| !chunk.trim().is_empty())
            .collect();
        let total = chunks.len();

        log::debug!(
            "Dispatching {} chunk(s) to {} ({} in flight max)",
            total,
            self.backend.name(),
            self.concurrency
        );

        let backend = self.backend.as_ref();
        let mut results: Vec<(usize, ChunkOutcome)> = stream::iter(chunks.into_iter().enumerate())
            .map(|(index, chunk)| async move {
                let outcome = translate_chunk(backend, chunk, source, target).await;
                if let ChunkOutcome::Fallback { reason, .. } = &outcome {
                    log::error!("Translation error (chunk {}/{}): {}", index + 1, total, reason);
                }
                (index, outcome)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        // Completion order is arbitrary; reassemble by chunk index.
        results.sort_by_key(|(index, _)| *index);
        let chunks: Vec<ChunkOutcome> = results.into_iter().map(|(_, outcome)| outcome).collect();
        let text = chunks
            .iter()
            .map(ChunkOutcome::text)
            .collect::<Vec<_>>()
            .join(CHUNK_JOINER);

        ChunkedTranslation { text, chunks }
    }
}

async fn translate_chunk(
    backend: &dyn TranslationBackend,
    chunk: &str,
    source: &SourceLanguage,
    target: &str,
) -> ChunkOutcome {
    match backend.translate(chunk, source, target).await {
        Ok(translated) if translated.is_empty() => {
            ChunkOutcome::fallback(chunk, "backend returned no text")
        }
        Ok(translated) => ChunkOutcome::Translated(translated),
        Err(e) => ChunkOutcome::fallback(chunk, e.to_string()),
    }
}
