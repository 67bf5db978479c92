//! Core of the slide deck translator: chunk splitting, brand-name protection,
//! concurrent chunked translation and run reporting.
//!
//! Nothing here knows about the document format. Units of text come in,
//! translated text goes out, and every decision is recorded in a
//! [`RunReport`].

pub mod backend;
pub mod brand;
pub mod chunk;
pub mod error;
pub mod fit;
pub mod pipeline;
pub mod report;
pub mod translator;

pub use backend::{SourceLanguage, TranslationBackend};
pub use brand::BrandGuard;
pub use chunk::{split_into_chunks, DEFAULT_CHUNK_SIZE};
pub use error::{BackendError, Error, Result};
pub use fit::FontFitPolicy;
pub use pipeline::UnitPipeline;
pub use report::{RunReport, SummaryLog, UnitOutcome, UnitStatus};
pub use translator::{ChunkOutcome, ChunkedTranslation, ChunkedTranslator};
