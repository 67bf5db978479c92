//! Run-level font formatting that survives paragraph rewrites.
//!
//! When a paragraph's runs are merged into one translated run, the first
//! original run's font name, size, weight, slant, underline and color are
//! carried over.

use crate::error::FormatError;
use crate::xml::XmlElement;
use crate::text::run_properties_mut;
use serde::{Deserialize, Serialize};

/// Fill elements of `a:rPr`; at most one may be present.
const FILL_ELEMENTS: &[&str] = &["noFill", "solidFill", "gradFill", "blipFill", "pattFill", "grpFill"];

/// `a:rPr` children that must come after the font elements.
const AFTER_LATIN: &[&str] = &["ea", "cs", "sym", "hlinkClick", "hlinkMouseOver", "rtl", "extLst"];

/// A run's text color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontColor {
    /// Explicit RGB, six hex digits.
    Rgb(String),
    /// Theme color name, e.g. `accent1`.
    Theme(String),
}

/// Font attributes of a run. `None` means inherited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontFormat {
    /// Latin typeface.
    pub name: Option<String>,
    /// Size in hundredths of a point.
    pub size: Option<u32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// Underline style, e.g. `sng`.
    pub underline: Option<String>,
    pub color: Option<FontColor>,
}

impl FontFormat {
    /// Read the formatting of a run.
    pub fn from_run(run: &XmlElement) -> Result<Self, FormatError> {
        let Some(rpr) = run.child("rPr") else {
            return Ok(Self::default());
        };

        let size = match rpr.attr("sz") {
            Some(value) => Some(value.trim().parse::<u32>().map_err(|_| {
                FormatError::InvalidAttribute {
                    attr: "sz".to_string(),
                    value: value.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            name: rpr
                .child("latin")
                .and_then(|latin| latin.attr("typeface"))
                .map(|t| t.into_owned()),
            size,
            bold: parse_bool(rpr, "b")?,
            italic: parse_bool(rpr, "i")?,
            underline: rpr.attr("u").map(|u| u.into_owned()),
            color: read_color(rpr)?,
        })
    }

    /// Apply the set attributes to `run`, creating its `a:rPr` if needed.
    pub fn apply(&self, run: &mut XmlElement) {
        let rpr = run_properties_mut(run);

        if let Some(size) = self.size {
            rpr.set_attr("sz", &size.to_string());
        }
        if let Some(bold) = self.bold {
            rpr.set_attr("b", bool_attr(bold));
        }
        if let Some(italic) = self.italic {
            rpr.set_attr("i", bool_attr(italic));
        }
        if let Some(underline) = &self.underline {
            rpr.set_attr("u", underline);
        }

        if let Some(color) = &self.color {
            let at = rpr
                .remove_children(FILL_ELEMENTS)
                .or_else(|| rpr.position_of("ln").map(|i| i + 1))
                .unwrap_or(0);
            let mut fill = XmlElement::new(rpr.sibling_name("solidFill"));
            let mut clr = match color {
                FontColor::Rgb(_) => XmlElement::new(rpr.sibling_name("srgbClr")),
                FontColor::Theme(_) => XmlElement::new(rpr.sibling_name("schemeClr")),
            };
            match color {
                FontColor::Rgb(hex) | FontColor::Theme(hex) => clr.set_attr("val", hex),
            }
            fill.insert_element(0, clr);
            rpr.insert_element(at, fill);
        }

        if let Some(name) = &self.name {
            rpr.remove_children(&["latin"]);
            let at = AFTER_LATIN
                .iter()
                .filter_map(|local| rpr.position_of(local))
                .min()
                .unwrap_or(rpr.children.len());
            let mut latin = XmlElement::new(rpr.sibling_name("latin"));
            latin.set_attr("typeface", name);
            rpr.insert_element(at, latin);
        }
    }
}

fn bool_attr(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn parse_bool(rpr: &XmlElement, attr: &str) -> Result<Option<bool>, FormatError> {
    match rpr.attr(attr).as_deref() {
        None => Ok(None),
        Some("1") | Some("true") | Some("on") => Ok(Some(true)),
        Some("0") | Some("false") | Some("off") => Ok(Some(false)),
        Some(other) => Err(FormatError::InvalidAttribute {
            attr: attr.to_string(),
            value: other.to_string(),
        }),
    }
}

fn read_color(rpr: &XmlElement) -> Result<Option<FontColor>, FormatError> {
    let Some(fill) = rpr.child("solidFill") else {
        return Ok(None);
    };

    if let Some(srgb) = fill.child("srgbClr") {
        let value = srgb.attr("val").unwrap_or_default();
        if value.len() != 6 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(FormatError::InvalidColor(format!("srgbClr val={:?}", value)));
        }
        return Ok(Some(FontColor::Rgb(value.to_uppercase())));
    }

    if let Some(scheme) = fill.child("schemeClr") {
        return match scheme.attr("val") {
            Some(value) if !value.is_empty() => Ok(Some(FontColor::Theme(value.into_owned()))),
            _ => Err(FormatError::InvalidColor("schemeClr without val".to_string())),
        };
    }

    // Other color models (hsl, preset, system) are not carried over.
    Ok(None)
}
