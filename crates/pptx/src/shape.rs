//! Shapes of a slide's shape tree and the traversal over their text frames.
//!
//! A shape can carry a text frame, a table, child shapes, or any mix of
//! those. Rather than probing each element kind separately, every shape is
//! tagged with its [`ShapeCapabilities`] and one traversal visits them.

use crate::xml::XmlElement;

/// English Metric Units per inch.
pub const EMU_PER_INCH: f64 = 914_400.0;

const SHAPE_ELEMENTS: &[&str] = &["sp", "grpSp", "graphicFrame", "pic", "cxnSp"];

/// What a shape can hold. Not mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapeCapabilities {
    /// Has a text frame (`p:txBody`).
    pub text: bool,
    /// Is a graphic frame holding a table (`a:tbl`).
    pub table: bool,
    /// Is a group with child shapes.
    pub children: bool,
}

/// Whether an element of a shape tree is a shape.
pub fn is_shape(element: &XmlElement) -> bool {
    SHAPE_ELEMENTS.contains(&element.local_name())
}

/// Whether a shape is a picture.
pub fn is_picture(element: &XmlElement) -> bool {
    element.local_name() == "pic"
}

/// Capabilities of a shape element.
pub fn capabilities(shape: &XmlElement) -> ShapeCapabilities {
    ShapeCapabilities {
        text: shape.child("txBody").is_some(),
        table: table(shape).is_some(),
        children: shape.local_name() == "grpSp",
    }
}

/// The shape's own text frame.
pub fn text_body(shape: &XmlElement) -> Option<&XmlElement> {
    shape.child("txBody")
}

/// The shape's own text frame, mutably.
pub fn text_body_mut(shape: &mut XmlElement) -> Option<&mut XmlElement> {
    shape.child_mut("txBody")
}

const TABLE_PATH: &[&str] = &["graphic", "graphicData", "tbl"];

fn table(shape: &XmlElement) -> Option<&XmlElement> {
    shape.descend(TABLE_PATH)
}

fn table_mut(shape: &mut XmlElement) -> Option<&mut XmlElement> {
    shape.descend_mut(TABLE_PATH)
}

/// Width of the shape in inches, if it declares one.
pub fn width_inches(shape: &XmlElement) -> Option<f64> {
    let xfrm = shape.child("xfrm").or_else(|| {
        shape
            .elements()
            .find(|e| matches!(e.local_name(), "spPr" | "grpSpPr"))
            .and_then(|props| props.child("xfrm"))
    })?;
    let cx = xfrm.child("ext")?.attr("cx")?;
    cx.trim().parse::<f64>().ok().map(|emu| emu / EMU_PER_INCH)
}

/// Text frames of a table, cell by cell in row order.
fn table_cell_bodies(tbl: &XmlElement) -> impl Iterator<Item = &XmlElement> {
    tbl.children_named("tr")
        .flat_map(|tr| tr.children_named("tc"))
        .filter_map(|tc| tc.child("txBody"))
}

/// Visit every text frame reachable from `shape`: its own, its table cells,
/// then its child shapes, recursively.
pub fn visit_text_bodies<F: FnMut(&XmlElement)>(shape: &XmlElement, visit: &mut F) {
    let caps = capabilities(shape);
    if caps.text {
        if let Some(body) = text_body(shape) {
            visit(body);
        }
    }
    if caps.table {
        if let Some(tbl) = table(shape) {
            table_cell_bodies(tbl).for_each(&mut *visit);
        }
    }
    if caps.children {
        for child in shape.elements().filter(|e| is_shape(e)) {
            visit_text_bodies(child, visit);
        }
    }
}

/// Mutable version of [`visit_text_bodies`], visiting in the same order.
pub fn visit_text_bodies_mut<F: FnMut(&mut XmlElement)>(shape: &mut XmlElement, visit: &mut F) {
    let caps = capabilities(shape);
    if caps.text {
        if let Some(body) = text_body_mut(shape) {
            visit(body);
        }
    }
    if caps.table {
        if let Some(tbl) = table_mut(shape) {
            for tr in tbl.children_named_mut("tr") {
                for tc in tr.children_named_mut("tc") {
                    if let Some(body) = tc.child_mut("txBody") {
                        visit(body);
                    }
                }
            }
        }
    }
    if caps.children {
        for child in shape.elements_mut().filter(|e| is_shape(e)) {
            visit_text_bodies_mut(child, visit);
        }
    }
}

/// Visit the text frames of a top-level shape without descending into
/// groups: its own frame and its table cells.
pub fn visit_own_text_bodies_mut<F: FnMut(&mut XmlElement)>(shape: &mut XmlElement, visit: &mut F) {
    if let Some(body) = text_body_mut(shape) {
        visit(body);
    }
    if let Some(tbl) = table_mut(shape) {
        for tr in tbl.children_named_mut("tr") {
            for tc in tr.children_named_mut("tc") {
                if let Some(body) = tc.child_mut("txBody") {
                    visit(body);
                }
            }
        }
    }
}
