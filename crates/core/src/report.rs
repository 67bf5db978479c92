//! Run-scoped record of what happened to each unit and slide.

use crate::translator::ChunkOutcome;
use crate::Result;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// How a unit was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnitStatus {
    /// Empty or whitespace-only, passed through.
    SkippedBlank,
    /// Only the company name; replaced by the canonical spelling.
    BrandOnly,
    /// Sent to the backend and the text changed.
    Translated,
    /// Sent to the backend but came back identical.
    Unchanged,
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SkippedBlank => "Skipped (empty or whitespace)",
            Self::BrandOnly => "Company name only - no translation",
            Self::Translated => "Translated (company name preserved)",
            Self::Unchanged => "No change after translation",
        };
        f.write_str(label)
    }
}

/// The fate of one translatable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitOutcome {
    /// Text as read from the document.
    pub original: String,
    /// Text written back.
    pub translated: String,
    pub status: UnitStatus,
    /// Per-chunk results; empty when the backend was not called.
    pub chunks: Vec<ChunkOutcome>,
}

/// Everything recorded during one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Units in the order they were processed.
    pub units: Vec<UnitOutcome>,
    /// 1-based numbers of slides whose fonts were scaled down.
    pub scaled_slides: Vec<usize>,
    /// 1-based numbers of slides with a picture.
    pub image_slides: Vec<usize>,
}

impl RunReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a processed unit.
    pub fn record_unit(&mut self, outcome: UnitOutcome) {
        self.units.push(outcome);
    }

    /// Record that a slide's fonts were scaled.
    pub fn mark_scaled(&mut self, slide_number: usize) {
        if !self.scaled_slides.contains(&slide_number) {
            self.scaled_slides.push(slide_number);
        }
    }

    /// Record that a slide contains a picture.
    pub fn mark_image(&mut self, slide_number: usize) {
        if !self.image_slides.contains(&slide_number) {
            self.image_slides.push(slide_number);
        }
    }

    /// Number of units with the given status.
    pub fn count(&self, status: UnitStatus) -> usize {
        self.units.iter().filter(|u| u.status == status).count()
    }

    /// Number of chunks that kept their original text.
    pub fn fallback_chunks(&self) -> usize {
        self.units
            .iter()
            .flat_map(|u| u.chunks.iter())
            .filter(|c| c.is_fallback())
            .count()
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        serde_json::to_writer_pretty(&mut file, self)?;
        file.write_all(b"\n")?;
        Ok(())
    }
}

/// Plain-text summary written next to a translated deck.
#[derive(Debug, Clone)]
pub struct SummaryLog {
    output_file: PathBuf,
    timestamp: String,
}

impl SummaryLog {
    /// Summary for `output_file`, stamped with `now`.
    pub fn new(output_file: impl Into<PathBuf>, now: DateTime<Local>) -> Self {
        Self {
            output_file: output_file.into(),
            timestamp: now.format("%Y-%m-%d_%H-%M-%S").to_string(),
        }
    }

    /// File name of the summary, e.g. `translation_log_2024-05-01_12-00-00.txt`.
    pub fn file_name(&self) -> String {
        format!("translation_log_{}.txt", self.timestamp)
    }

    /// Render the summary text.
    pub fn render(&self, report: &RunReport) -> String {
        let mut out = String::new();
        out.push_str("Translation Summary Log\n");
        out.push_str("=======================\n");
        out.push_str(&format!("Output File: {}\n", self.output_file.display()));
        out.push_str(&format!("Time: {}\n\n", self.timestamp));

        if report.scaled_slides.is_empty() {
            out.push_str("No slides required font scaling.\n");
        } else {
            out.push_str(&format!(
                "Slides with font scaling applied: {:?}\n",
                report.scaled_slides
            ));
        }

        if report.image_slides.is_empty() {
            out.push_str("No image-containing slides detected.\n");
        } else {
            out.push_str(&format!("Slides containing images: {:?}\n", report.image_slides));
        }

        out
    }

    /// Write the summary into `dir` and return its path.
    pub fn write_to_dir(&self, dir: &Path, report: &RunReport) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        let mut file = File::create(&path)?;
        file.write_all(self.render(report).as_bytes())?;
        Ok(path)
    }
}
