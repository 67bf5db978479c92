//! DrawingML text frames: paragraphs, runs and their text.

use crate::format::FontFormat;
use crate::xml::{XmlElement, XmlNode};

/// Paragraphs (`a:p`) of a text frame.
pub fn paragraphs(body: &XmlElement) -> impl Iterator<Item = &XmlElement> {
    body.children_named("p")
}

/// Paragraphs of a text frame, mutably.
pub fn paragraphs_mut(body: &mut XmlElement) -> impl Iterator<Item = &mut XmlElement> {
    body.children_named_mut("p")
}

/// Runs (`a:r`) of a paragraph.
pub fn runs(paragraph: &XmlElement) -> impl Iterator<Item = &XmlElement> {
    paragraph.children_named("r")
}

/// Runs of a paragraph, mutably.
pub fn runs_mut(paragraph: &mut XmlElement) -> impl Iterator<Item = &mut XmlElement> {
    paragraph.children_named_mut("r")
}

/// Text of a run.
pub fn run_text(run: &XmlElement) -> String {
    run.child("t").map(XmlElement::text).unwrap_or_default()
}

/// Replace the text of a run, keeping its properties.
pub fn set_run_text(run: &mut XmlElement, text: &str) {
    if let Some(t) = run.child_mut("t") {
        t.set_text(text);
        return;
    }
    let mut t = XmlElement::new(run.sibling_name("t"));
    t.set_text(text);
    run.children.push(XmlNode::Element(t));
}

/// Text of the runs of a paragraph, concatenated.
pub fn paragraph_text(paragraph: &XmlElement) -> String {
    runs(paragraph).map(run_text).collect()
}

/// Everything a reader sees in a paragraph: runs, fields and line breaks.
pub fn paragraph_display_text(paragraph: &XmlElement) -> String {
    let mut out = String::new();
    for element in paragraph.elements() {
        match element.local_name() {
            "r" | "fld" => out.push_str(&run_text(element)),
            "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}

/// Text of a whole frame, paragraphs separated by newlines.
pub fn body_text(body: &XmlElement) -> String {
    paragraphs(body)
        .map(paragraph_display_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace all runs of a paragraph with a single run holding `text`.
///
/// The new run takes the place of the first old run (or goes before the
/// end-of-paragraph properties). Line breaks and fields stay where they are.
pub fn replace_runs(paragraph: &mut XmlElement, text: &str, format: Option<&FontFormat>) {
    let index = paragraph
        .remove_children(&["r"])
        .or_else(|| paragraph.position_of("endParaRPr"))
        .unwrap_or(paragraph.children.len());

    let mut run = XmlElement::new(paragraph.sibling_name("r"));
    if let Some(format) = format {
        format.apply(&mut run);
    }
    set_run_text(&mut run, text);
    paragraph.insert_element(index, run);
}

/// The run's properties element, created as the first child if missing.
pub fn run_properties_mut(run: &mut XmlElement) -> &mut XmlElement {
    run.ensure_child("rPr", 0)
}

/// Font size of a run in points, if set on the run.
pub fn run_size_pt(run: &XmlElement) -> Option<f64> {
    run.child("rPr")?
        .attr("sz")?
        .trim()
        .parse::<f64>()
        .ok()
        .map(|hundredths| hundredths / 100.0)
}

/// Set the font size of a run in points.
pub fn set_run_size_pt(run: &mut XmlElement, size_pt: f64) {
    let hundredths = (size_pt * 100.0).round() as u32;
    run_properties_mut(run).set_attr("sz", &hundredths.to_string());
}
