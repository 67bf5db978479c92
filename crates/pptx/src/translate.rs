//! Deck-level translation: collect units slide by slide, translate them
//! through a [`UnitPipeline`], write them back, then shrink overfull slides.

use crate::deck::{PptxDeck, Slide};
use crate::format::FontFormat;
use crate::shape::{
    is_picture, text_body, visit_own_text_bodies_mut, visit_text_bodies, visit_text_bodies_mut,
    width_inches,
};
use crate::text::{
    body_text, paragraph_text, paragraphs, paragraphs_mut, replace_runs, run_size_pt, run_text,
    runs, runs_mut, set_run_size_pt, set_run_text,
};
use crate::xml::XmlElement;
use serde::{Deserialize, Serialize};
use slide_core::{FontFitPolicy, RunReport, UnitPipeline};
use std::fmt;

/// What counts as one translatable unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Each run on its own; every run keeps its formatting.
    #[default]
    Run,
    /// A paragraph's runs as one text, rewritten as a single run formatted
    /// like the first.
    Paragraph,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run => f.write_str("run"),
            Self::Paragraph => f.write_str("paragraph"),
        }
    }
}

/// Translates every slide of a deck in place.
pub struct PresentationTranslator {
    pipeline: UnitPipeline,
    granularity: Granularity,
    fit: Option<FontFitPolicy>,
}

impl PresentationTranslator {
    /// Translator with run granularity and the default font-fit policy.
    pub fn new(pipeline: UnitPipeline) -> Self {
        Self {
            pipeline,
            granularity: Granularity::default(),
            fit: Some(FontFitPolicy::default()),
        }
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Replace the font-fit policy; `None` leaves font sizes alone.
    pub fn with_font_fit(mut self, fit: Option<FontFitPolicy>) -> Self {
        self.fit = fit;
        self
    }

    /// Translate the whole deck, recording every unit and slide in `report`.
    ///
    /// Backend failures never abort the run: affected text stays as it was.
    pub async fn translate(&self, deck: &mut PptxDeck, report: &mut RunReport) {
        let total = deck.slides().len();
        log::info!(
            "Translating {} slides to {} ({} granularity)",
            total,
            self.pipeline.target(),
            self.granularity
        );

        for slide in deck.slides_mut() {
            log::info!("Translating slide {}/{}", slide.number, total);
            self.translate_slide(slide, report).await;
        }
    }

    async fn translate_slide(&self, slide: &mut Slide, report: &mut RunReport) {
        let units = self.collect_units(slide);
        log::debug!("Slide {}: {} units", slide.number, units.len());

        let mut translations = Vec::with_capacity(units.len());
        for unit in &units {
            translations.push(self.pipeline.translate_unit(unit, report).await);
        }

        let written = self.write_back(slide, translations);
        if written != units.len() {
            log::warn!(
                "Slide {}: {} units collected but {} written back",
                slide.number,
                units.len(),
                written
            );
        }

        if let Some(policy) = &self.fit {
            if fit_slide(policy, slide) {
                log::info!("Slide {}: fonts scaled down to fit", slide.number);
                report.mark_scaled(slide.number);
            }
        }

        if slide.shapes().any(is_picture) {
            report.mark_image(slide.number);
        }
    }

    /// Units of a slide in traversal order.
    fn collect_units(&self, slide: &Slide) -> Vec<String> {
        let mut units = Vec::new();
        for shape in slide.shapes() {
            visit_text_bodies(shape, &mut |body| {
                if body_text(body).trim().is_empty() {
                    return;
                }
                for paragraph in paragraphs(body) {
                    match self.granularity {
                        Granularity::Run => units.extend(
                            runs(paragraph)
                                .map(run_text)
                                .filter(|text| !text.trim().is_empty()),
                        ),
                        Granularity::Paragraph => {
                            let text = paragraph_text(paragraph);
                            if !text.trim().is_empty() {
                                units.push(text);
                            }
                        }
                    }
                }
            });
        }
        units
    }

    /// Write translations back in the order [`Self::collect_units`] produced
    /// them. Returns how many were written.
    fn write_back(&self, slide: &mut Slide, translations: Vec<String>) -> usize {
        let mut pending = translations.into_iter();
        let mut written = 0;

        for shape in slide.shapes_mut() {
            visit_text_bodies_mut(shape, &mut |body| {
                if body_text(body).trim().is_empty() {
                    return;
                }
                for paragraph in paragraphs_mut(body) {
                    match self.granularity {
                        Granularity::Run => {
                            for run in runs_mut(paragraph) {
                                if run_text(run).trim().is_empty() {
                                    continue;
                                }
                                let Some(text) = pending.next() else { return };
                                set_run_text(run, &text);
                                written += 1;
                            }
                        }
                        Granularity::Paragraph => {
                            if paragraph_text(paragraph).trim().is_empty() {
                                continue;
                            }
                            let Some(text) = pending.next() else { return };
                            let format = first_run_format(paragraph);
                            replace_runs(paragraph, &text, format.as_ref());
                            written += 1;
                        }
                    }
                }
            });
        }

        written
    }
}

fn first_run_format(paragraph: &XmlElement) -> Option<FontFormat> {
    let run = runs(paragraph).next()?;
    match FontFormat::from_run(run) {
        Ok(format) => Some(format),
        Err(e) => {
            log::warn!("Could not copy run formatting, writing plain text: {}", e);
            None
        }
    }
}

/// Shrink the fonts of a slide when one of its shapes holds too much text for
/// its width. Returns whether anything was scaled.
fn fit_slide(policy: &FontFitPolicy, slide: &mut Slide) -> bool {
    let overfull = slide.shapes().find_map(|shape| {
        let length = body_text(text_body(shape)?).chars().count();
        let width = width_inches(shape);
        policy.needs_scaling(length, width).then_some((length, width))
    });
    let Some((length, width)) = overfull else {
        return false;
    };
    log::info!(
        "Slide {}: long text ({} chars) in narrow width ({:.2} inches)",
        slide.number,
        length,
        width.unwrap_or(policy.default_width_in)
    );

    for shape in slide.shapes_mut() {
        visit_own_text_bodies_mut(shape, &mut |body| {
            for paragraph in paragraphs_mut(body) {
                for run in runs_mut(paragraph) {
                    let size = policy.scaled_size(run_size_pt(run));
                    set_run_size_pt(run, size);
                }
            }
        });
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{deck, group_shape, paragraph, picture_shape, run, slide_xml, table_shape, text_shape};
    use async_trait::async_trait;
    use slide_core::{
        BackendError, ChunkedTranslator, SourceLanguage, TranslationBackend, UnitStatus,
    };
    use std::io::Cursor;
    use std::sync::Arc;

    /// Uppercases everything; fails on text containing "boom".
    struct Shout;

    #[async_trait]
    impl TranslationBackend for Shout {
        async fn translate(
            &self,
            text: &str,
            _source: &SourceLanguage,
            _target: &str,
        ) -> Result<String, BackendError> {
            if text.contains("boom") {
                return Err(BackendError::Request("connection reset".into()));
            }
            Ok(text.to_uppercase())
        }

        fn name(&self) -> &str {
            "shout"
        }

        fn max_chunk_chars(&self) -> usize {
            5000
        }
    }

    fn translator() -> PresentationTranslator {
        let chunked = ChunkedTranslator::new(Arc::new(Shout));
        let pipeline = UnitPipeline::new(chunked, SourceLanguage::Auto, "fr").unwrap();
        PresentationTranslator::new(pipeline)
    }

    fn open(bytes: Vec<u8>) -> PptxDeck {
        PptxDeck::from_reader(Cursor::new(bytes)).unwrap()
    }

    fn reopen(deck: &PptxDeck) -> PptxDeck {
        open(deck.write_to(Cursor::new(Vec::new())).unwrap().into_inner())
    }

    fn texts(slide: &Slide) -> Vec<String> {
        let mut out = Vec::new();
        for shape in slide.shapes() {
            visit_text_bodies(shape, &mut |body| out.push(body_text(body)));
        }
        out
    }

    #[tokio::test]
    async fn test_run_granularity_keeps_run_formatting() {
        let shapes = format!(
            "{}{}{}",
            text_shape(
                "Title",
                None,
                &[paragraph(&[
                    run("Hello ", r#"<a:rPr sz="2400" b="1"/>"#),
                    run("world", ""),
                ])]
            ),
            table_shape(&["cell", " "]),
            group_shape(&[text_shape("Inner", None, &[paragraph(&[run("nested", "")])])]),
        );
        let mut deck = open(deck(&[slide_xml(&shapes)]));
        let mut report = RunReport::new();

        translator().translate(&mut deck, &mut report).await;

        let deck = reopen(&deck);
        let slide = &deck.slides()[0];
        assert_eq!(texts(slide), vec!["HELLO WORLD", "CELL", " ", "NESTED"]);

        let title = text_body(slide.shapes().next().unwrap()).unwrap();
        let first = runs(paragraphs(title).next().unwrap()).next().unwrap();
        assert_eq!(run_size_pt(first), Some(24.0));
        assert_eq!(first.child("rPr").unwrap().attr("b").unwrap(), "1");

        assert_eq!(report.units.len(), 4);
        assert_eq!(report.count(UnitStatus::Translated), 4);
        assert!(report.scaled_slides.is_empty());
        assert!(report.image_slides.is_empty());
    }

    #[tokio::test]
    async fn test_paragraph_granularity_merges_runs() {
        let shapes = text_shape(
            "Body",
            None,
            &[paragraph(&[
                run("Good ", r#"<a:rPr sz="2000" i="1"><a:latin typeface="Verdana"/></a:rPr>"#),
                run("morning", r#"<a:rPr sz="1000"/>"#),
            ])],
        );
        let mut deck = open(deck(&[slide_xml(&shapes)]));
        let mut report = RunReport::new();

        translator()
            .with_granularity(Granularity::Paragraph)
            .translate(&mut deck, &mut report)
            .await;

        let deck = reopen(&deck);
        let body = text_body(deck.slides()[0].shapes().next().unwrap()).unwrap();
        let p = paragraphs(body).next().unwrap();
        let merged: Vec<&XmlElement> = runs(p).collect();
        assert_eq!(merged.len(), 1);
        assert_eq!(run_text(merged[0]), "GOOD MORNING");

        let format = FontFormat::from_run(merged[0]).unwrap();
        assert_eq!(format.size, Some(2000));
        assert_eq!(format.italic, Some(true));
        assert_eq!(format.name.as_deref(), Some("Verdana"));
        assert_eq!(report.units.len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_formatting_still_writes_text() {
        let shapes = text_shape(
            "Body",
            None,
            &[paragraph(&[
                run("Good ", r#"<a:rPr b="maybe" sz="2000"/>"#),
                run("night", ""),
            ])],
        );
        let mut deck = open(deck(&[slide_xml(&shapes)]));
        let mut report = RunReport::new();

        translator()
            .with_granularity(Granularity::Paragraph)
            .translate(&mut deck, &mut report)
            .await;

        let deck = reopen(&deck);
        let body = text_body(deck.slides()[0].shapes().next().unwrap()).unwrap();
        let p = paragraphs(body).next().unwrap();
        let merged: Vec<&XmlElement> = runs(p).collect();
        assert_eq!(merged.len(), 1);
        assert_eq!(run_text(merged[0]), "GOOD NIGHT");
        assert!(merged[0].child("rPr").is_none());
        assert_eq!(report.count(UnitStatus::Translated), 1);
    }

    #[tokio::test]
    async fn test_brand_name_survives() {
        let shapes = text_shape(
            "Body",
            None,
            &[
                paragraph(&[run("Promptora.ai", "")]),
                paragraph(&[run("Visit promptora ai today", "")]),
            ],
        );
        let mut deck = open(deck(&[slide_xml(&shapes)]));
        let mut report = RunReport::new();

        translator().translate(&mut deck, &mut report).await;

        assert_eq!(
            texts(&deck.slides()[0]),
            vec!["Promptora.ai\nVISIT Promptora.ai TODAY"]
        );
        assert_eq!(report.count(UnitStatus::BrandOnly), 1);
        assert_eq!(report.count(UnitStatus::Translated), 1);
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_original_text() {
        let shapes = text_shape("Body", None, &[paragraph(&[run("boom goes the dynamite", "")])]);
        let mut deck = open(deck(&[slide_xml(&shapes)]));
        let mut report = RunReport::new();

        translator().translate(&mut deck, &mut report).await;

        assert_eq!(texts(&deck.slides()[0]), vec!["boom goes the dynamite"]);
        assert_eq!(report.count(UnitStatus::Unchanged), 1);
        assert_eq!(report.fallback_chunks(), 1);
    }

    #[tokio::test]
    async fn test_long_text_in_narrow_shape_scales_slide() {
        let long = "word ".repeat(50);
        let shapes = format!(
            "{}{}",
            text_shape("Narrow", Some(914_400 * 3), &[paragraph(&[run(&long, "")])]),
            text_shape("Other", None, &[paragraph(&[run("short", r#"<a:rPr sz="4000"/>"#)])]),
        );
        let slides = [
            slide_xml(&shapes),
            slide_xml(&format!("{}{}", text_shape("Wide", None, &[paragraph(&[run(&long, "")])]), picture_shape())),
        ];
        let mut deck = open(deck(&slides));
        let mut report = RunReport::new();

        translator().translate(&mut deck, &mut report).await;

        assert_eq!(report.scaled_slides, vec![1]);
        assert_eq!(report.image_slides, vec![2]);

        let sizes: Vec<Option<f64>> = deck.slides()[0]
            .shapes()
            .filter_map(text_body)
            .flat_map(paragraphs)
            .flat_map(runs)
            .map(run_size_pt)
            .collect();
        assert_eq!(sizes, vec![Some(14.4), Some(32.0)]);
    }

    #[tokio::test]
    async fn test_font_fit_can_be_disabled() {
        let long = "word ".repeat(50);
        let shapes = text_shape("Narrow", Some(914_400), &[paragraph(&[run(&long, "")])]);
        let mut deck = open(deck(&[slide_xml(&shapes)]));
        let mut report = RunReport::new();

        translator()
            .with_font_fit(None)
            .translate(&mut deck, &mut report)
            .await;

        assert!(report.scaled_slides.is_empty());
    }

    #[test]
    fn test_granularity_display() {
        assert_eq!(Granularity::default(), Granularity::Run);
        assert_eq!(Granularity::Paragraph.to_string(), "paragraph");
    }
}
