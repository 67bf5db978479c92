//! An opened deck: the package plus its slides parsed into XML trees.

use crate::package::{check_magic, PptxPackage};
use crate::shape::is_shape;
use crate::xml::{XmlDocument, XmlElement};
use crate::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

const SHAPE_TREE: &[&str] = &["cSld", "spTree"];

/// One slide of a deck.
#[derive(Debug, Clone)]
pub struct Slide {
    /// 1-based position in presentation order.
    pub number: usize,
    /// Part name inside the package, e.g. `ppt/slides/slide3.xml`.
    pub part_name: String,
    pub doc: XmlDocument,
}

impl Slide {
    fn shape_tree(&self) -> Option<&XmlElement> {
        self.doc.root()?.descend(SHAPE_TREE)
    }

    /// Top-level shapes of the slide, in z-order.
    pub fn shapes(&self) -> impl Iterator<Item = &XmlElement> {
        self.shape_tree()
            .into_iter()
            .flat_map(|tree| tree.elements())
            .filter(|e| is_shape(e))
    }

    /// Top-level shapes of the slide, mutably.
    pub fn shapes_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.doc
            .root_mut()
            .and_then(|root| root.descend_mut(SHAPE_TREE))
            .into_iter()
            .flat_map(|tree| tree.elements_mut())
            .filter(|e| is_shape(e))
    }
}

/// A PPTX deck held in memory.
#[derive(Debug, Clone)]
pub struct PptxDeck {
    package: PptxPackage,
    slides: Vec<Slide>,
}

impl PptxDeck {
    /// Open a deck from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        check_magic(&bytes)?;
        Self::from_reader(Cursor::new(bytes))
    }

    /// Read a deck from any seekable source.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let package = PptxPackage::read(reader)?;

        let mut slides = Vec::new();
        for (i, part_name) in package.slide_order()?.into_iter().enumerate() {
            let xml = package.read_string(&part_name)?;
            let doc = XmlDocument::parse(&xml)
                .map_err(|e| Error::CorruptedFile(format!("{}: {}", part_name, e)))?;
            slides.push(Slide {
                number: i + 1,
                part_name,
                doc,
            });
        }

        log::debug!("Loaded deck with {} slides", slides.len());
        Ok(Self { package, slides })
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slides_mut(&mut self) -> &mut [Slide] {
        &mut self.slides
    }

    /// Write the deck to `writer`. Parts other than slides are copied as read.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let replacements: HashMap<String, Vec<u8>> = self
            .slides
            .iter()
            .map(|slide| (slide.part_name.clone(), slide.doc.to_xml().into_bytes()))
            .collect();
        self.package.write(writer, &replacements)
    }

    /// Save the deck to disk. The file is only created once the whole
    /// package has been serialized.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.write_to(Cursor::new(Vec::new()))?.into_inner();
        fs::write(path, bytes)?;
        Ok(())
    }
}
