//! PPTX (Office Open XML) support for slide deck translation.
//!
//! A .pptx file is a ZIP archive of XML parts. Decks are read into memory,
//! slide parts are parsed into lossless XML trees that can be edited in
//! place, and the package is written back with every other part untouched.

pub mod deck;
pub mod error;
pub mod format;
pub mod package;
pub mod shape;
pub mod text;
pub mod translate;
pub mod xml;

#[cfg(test)]
pub(crate) mod fixtures;

pub use deck::{PptxDeck, Slide};
pub use error::{Error, FormatError, Result};
pub use format::{FontColor, FontFormat};
pub use package::{check_magic, PptxPackage};
pub use shape::ShapeCapabilities;
pub use translate::{Granularity, PresentationTranslator};
pub use xml::{XmlDocument, XmlElement, XmlNode};
