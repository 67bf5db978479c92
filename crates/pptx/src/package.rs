//! PPTX package access: the ZIP container and slide ordering.

use crate::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

/// ZIP local file header magic.
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// OLE/CFB magic of legacy binary `.ppt` files.
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Check the leading bytes of a file before trying to open it as a package.
pub fn check_magic(bytes: &[u8]) -> Result<()> {
    if bytes.starts_with(&ZIP_MAGIC) {
        Ok(())
    } else if bytes.starts_with(&OLE_MAGIC) {
        Err(Error::UnsupportedFormat(
            "legacy binary .ppt files are not supported; save the deck as .pptx".to_string(),
        ))
    } else {
        Err(Error::UnsupportedFormat("not a PPTX (ZIP) package".to_string()))
    }
}

/// One entry of the ZIP container, kept with the metadata needed to write
/// it back unchanged.
#[derive(Debug, Clone)]
pub struct PackageEntry {
    pub name: String,
    pub data: Vec<u8>,
    compression: CompressionMethod,
    last_modified: DateTime,
    unix_mode: Option<u32>,
    is_dir: bool,
}

/// All parts of a PPTX package, in archive order.
#[derive(Debug, Clone)]
pub struct PptxPackage {
    entries: Vec<PackageEntry>,
}

impl PptxPackage {
    /// Read every entry of the archive into memory.
    pub fn read<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", file.name(), e)))?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
                last_modified: file.last_modified(),
                unix_mode: file.unix_mode(),
                is_dir: file.is_dir(),
            });
        }

        Ok(Self { entries })
    }

    /// Entries in archive order.
    pub fn entries(&self) -> &[PackageEntry] {
        &self.entries
    }

    /// Raw bytes of a part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// A part decoded as UTF-8.
    pub fn read_string(&self, name: &str) -> Result<String> {
        let data = self
            .part(name)
            .ok_or_else(|| Error::MissingPart(name.to_string()))?;
        String::from_utf8(data.to_vec())
            .map_err(|e| Error::CorruptedFile(format!("'{}' is not UTF-8: {}", name, e)))
    }

    /// Write the package, substituting the parts in `replacements`.
    pub fn write<W: Write + Seek>(
        &self,
        writer: W,
        replacements: &HashMap<String, Vec<u8>>,
    ) -> Result<W> {
        let mut zip = ZipWriter::new(writer);

        for entry in &self.entries {
            let compression = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let mut options = FileOptions::default()
                .compression_method(compression)
                .last_modified_time(entry.last_modified);
            if let Some(mode) = entry.unix_mode {
                options = options.unix_permissions(mode);
            }

            if entry.is_dir || entry.name.ends_with('/') {
                zip.add_directory(entry.name.clone(), options)?;
                continue;
            }

            let data = replacements.get(&entry.name).unwrap_or(&entry.data);
            zip.start_file(entry.name.clone(), options)?;
            zip.write_all(data)
                .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", entry.name, e)))?;
        }

        Ok(zip.finish()?)
    }

    /// Part names of the slides in presentation order.
    ///
    /// Uses the slide id list of `presentation.xml`; when that is missing,
    /// falls back to the numbers in the relationship ids and targets.
    pub fn slide_order(&self) -> Result<Vec<String>> {
        let rels = read_relationships(&self.read_string(PRESENTATION_RELS_PART)?)?;
        let slide_rels: Vec<&Relationship> = rels.iter().filter(|r| r.is_slide()).collect();

        let ids = match self.read_string(PRESENTATION_PART) {
            Ok(xml) => read_slide_ids(&xml)?,
            Err(Error::MissingPart(_)) => Vec::new(),
            Err(e) => return Err(e),
        };

        if !ids.is_empty() {
            let by_id: HashMap<&str, &Relationship> =
                slide_rels.iter().map(|r| (r.id.as_str(), *r)).collect();
            return ids
                .iter()
                .map(|id| {
                    by_id
                        .get(id.as_str())
                        .map(|r| resolve_target(&r.target))
                        .ok_or_else(|| {
                            Error::CorruptedFile(format!("slide id {} has no relationship", id))
                        })
                })
                .collect();
        }

        log::debug!("No slide id list; ordering slides by relationship numbers");
        let mut slides: Vec<(String, Option<usize>)> = slide_rels
            .iter()
            .map(|r| {
                let order = extract_slide_number(&r.id).or_else(|| extract_slide_number(&r.target));
                (resolve_target(&r.target), order)
            })
            .collect();

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }
}

#[derive(Debug, Default)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

impl Relationship {
    fn is_slide(&self) -> bool {
        self.rel_type.ends_with("/slide")
    }
}

/// Parse a `.rels` part.
fn read_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut rels = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut rel = Relationship::default();
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"Type" => rel.rel_type = value,
                        b"Target" => rel.target = value,
                        b"Id" => rel.id = value,
                        _ => {}
                    }
                }
                rels.push(rel);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing relationships: {}", e)));
            }
            _ => {}
        }
    }

    Ok(rels)
}

/// Relationship ids of `p:sldIdLst/p:sldId`, in order.
fn read_slide_ids(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                // The relationship id is the namespaced `r:id`, not the numeric `id`.
                let rel_id = e
                    .attributes()
                    .flatten()
                    .find(|a| a.key.as_ref() != b"id" && local_name(a.key.as_ref()) == b"id")
                    .map(|a| String::from_utf8_lossy(&a.value).to_string());
                if let Some(rel_id) = rel_id {
                    ids.push(rel_id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing presentation: {}", e)));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Turn a relationship target of `presentation.xml` into a part name.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target),
    }
}

/// Extract the local name from a potentially namespaced XML name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{build_package, presentation_rels, presentation_xml};
    use std::io::Cursor;

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_check_magic() {
        assert!(check_magic(&[0x50, 0x4B, 0x03, 0x04, 0, 0]).is_ok());
        assert!(matches!(check_magic(&OLE_MAGIC), Err(Error::UnsupportedFormat(_))));
        assert!(check_magic(b"hello").is_err());
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(resolve_target("/ppt/slides/slide1.xml"), "ppt/slides/slide1.xml");
    }

    #[test]
    fn test_slide_order_follows_id_list() {
        // rId3 -> slide2.xml is listed first.
        let bytes = build_package(&[
            ("ppt/presentation.xml", presentation_xml(&["rId3", "rId2"])),
            (
                "ppt/_rels/presentation.xml.rels",
                presentation_rels(&[("rId2", "slide1.xml"), ("rId3", "slide2.xml")]),
            ),
        ]);
        let package = PptxPackage::read(Cursor::new(bytes)).unwrap();
        assert_eq!(
            package.slide_order().unwrap(),
            vec!["ppt/slides/slide2.xml", "ppt/slides/slide1.xml"]
        );
    }

    #[test]
    fn test_slide_order_without_id_list() {
        let bytes = build_package(&[(
            "ppt/_rels/presentation.xml.rels",
            presentation_rels(&[("rId10", "slide10.xml"), ("rId2", "slide2.xml")]),
        )]);
        let package = PptxPackage::read(Cursor::new(bytes)).unwrap();
        assert_eq!(
            package.slide_order().unwrap(),
            vec!["ppt/slides/slide2.xml", "ppt/slides/slide10.xml"]
        );
    }

    #[test]
    fn test_missing_rels_is_an_error() {
        let bytes = build_package(&[("ppt/presentation.xml", presentation_xml(&[]))]);
        let package = PptxPackage::read(Cursor::new(bytes)).unwrap();
        assert!(matches!(package.slide_order(), Err(Error::MissingPart(_))));
    }

    #[test]
    fn test_write_replaces_only_given_parts() {
        let bytes = build_package(&[
            ("a.xml", "<a/>".to_string()),
            ("b.xml", "<b/>".to_string()),
        ]);
        let package = PptxPackage::read(Cursor::new(bytes)).unwrap();

        let mut replacements = HashMap::new();
        replacements.insert("b.xml".to_string(), b"<b>new</b>".to_vec());
        let out = package
            .write(Cursor::new(Vec::new()), &replacements)
            .unwrap()
            .into_inner();

        let reread = PptxPackage::read(Cursor::new(out)).unwrap();
        let names: Vec<&str> = reread.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.xml", "b.xml"]);
        assert_eq!(reread.part("a.xml"), Some(&b"<a/>"[..]));
        assert_eq!(reread.read_string("b.xml").unwrap(), "<b>new</b>");
    }

    #[test]
    fn test_not_a_zip() {
        assert!(PptxPackage::read(Cursor::new(b"plain text".to_vec())).is_err());
    }
}
