//! In-memory decks for tests.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const SLIDE_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

pub(crate) fn build_package(parts: &[(&str, String)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        zip.start_file(*name, FileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub(crate) fn presentation_xml(rel_ids: &[&str]) -> String {
    let ids: String = rel_ids
        .iter()
        .enumerate()
        .map(|(i, rid)| format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, rid))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}><p:sldIdLst>{}</p:sldIdLst></p:presentation>"#,
        NS, ids
    )
}

pub(crate) fn presentation_rels(rels: &[(&str, &str)]) -> String {
    let mut body: String = rels
        .iter()
        .map(|(id, target)| {
            format!(
                r#"<Relationship Id="{}" Type="{}" Target="slides/{}"/>"#,
                id, SLIDE_REL, target
            )
        })
        .collect();
    body.push_str(r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        body
    )
}

pub(crate) fn slide_xml(shapes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
        NS, shapes
    )
}

/// A run with optional `a:rPr` attributes and children.
pub(crate) fn run(text: &str, rpr: &str) -> String {
    if rpr.is_empty() {
        format!("<a:r><a:t>{}</a:t></a:r>", text)
    } else {
        format!("<a:r>{}<a:t>{}</a:t></a:r>", rpr, text)
    }
}

pub(crate) fn paragraph(runs: &[String]) -> String {
    format!("<a:p>{}</a:p>", runs.concat())
}

fn tx_body(paragraphs: &[String]) -> String {
    format!("<p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody>", paragraphs.concat())
}

pub(crate) fn text_shape(name: &str, width_emu: Option<u64>, paragraphs: &[String]) -> String {
    let xfrm = match width_emu {
        Some(cx) => format!(r#"<a:xfrm><a:off x="0" y="0"/><a:ext cx="{}" cy="914400"/></a:xfrm>"#, cx),
        None => String::new(),
    };
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="{}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>{}</p:spPr>{}</p:sp>"#,
        name,
        xfrm,
        tx_body(paragraphs)
    )
}

pub(crate) fn table_shape(cells: &[&str]) -> String {
    let tcs: String = cells
        .iter()
        .map(|c| {
            format!(
                "<a:tc><a:txBody><a:bodyPr/><a:lstStyle/>{}</a:txBody><a:tcPr/></a:tc>",
                paragraph(&[run(c, "")])
            )
        })
        .collect();
    format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="4" name="Table"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="0" y="0"/><a:ext cx="9144000" cy="914400"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblGrid><a:gridCol w="914400"/></a:tblGrid><a:tr h="370840">{}</a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#,
        tcs
    )
}

pub(crate) fn group_shape(children: &[String]) -> String {
    format!(
        r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="5" name="Group"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:grpSp>"#,
        children.concat()
    )
}

pub(crate) fn picture_shape() -> String {
    r#"<p:pic><p:nvPicPr><p:cNvPr id="6" name="Picture"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId9"/></p:blipFill><p:spPr/></p:pic>"#
        .to_string()
}

/// A complete deck with one part per slide body.
pub(crate) fn deck(slides: &[String]) -> Vec<u8> {
    let rel_ids: Vec<String> = (0..slides.len()).map(|i| format!("rId{}", i + 2)).collect();
    let targets: Vec<String> = (0..slides.len()).map(|i| format!("slide{}.xml", i + 1)).collect();
    let rels: Vec<(&str, &str)> = rel_ids
        .iter()
        .zip(targets.iter())
        .map(|(id, target)| (id.as_str(), target.as_str()))
        .collect();
    let ids: Vec<&str> = rel_ids.iter().map(|s| s.as_str()).collect();

    let mut parts: Vec<(String, String)> = vec![
        (
            "[Content_Types].xml".to_string(),
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#.to_string(),
        ),
        ("ppt/presentation.xml".to_string(), presentation_xml(&ids)),
        ("ppt/_rels/presentation.xml.rels".to_string(), presentation_rels(&rels)),
    ];
    for (i, body) in slides.iter().enumerate() {
        parts.push((format!("ppt/slides/slide{}.xml", i + 1), body.clone()));
    }

    let borrowed: Vec<(&str, String)> = parts.iter().map(|(n, c)| (n.as_str(), c.clone())).collect();
    build_package(&borrowed)
}
