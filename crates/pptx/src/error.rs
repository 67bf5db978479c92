//! Error types for reading and writing PPTX packages.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, editing or saving a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read or write a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not a PPTX package.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// A part the package must contain is missing.
    #[error("Missing part: {0}")]
    MissingPart(String),

    /// Invalid or corrupted package.
    #[error("Invalid or corrupted file: {0}")]
    CorruptedFile(String),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    XmlError(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::ZipError(e.to_string())
    }
}

/// A run's formatting could not be read completely.
///
/// Never fatal: the translated text is written without the formatting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// An attribute holds a value we cannot interpret.
    #[error("Invalid value {value:?} for attribute {attr}")]
    InvalidAttribute {
        /// Attribute name
        attr: String,
        /// Offending value
        value: String,
    },

    /// A color element has no usable value.
    #[error("Unusable color: {0}")]
    InvalidColor(String),
}
