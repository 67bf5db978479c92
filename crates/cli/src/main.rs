//! Translate every text of a PowerPoint deck.

mod cli;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, ValueEnum};
use cli::{init_logging, BackendArg};
use slide_backend::BackendKind;
use slide_core::translator::DEFAULT_CONCURRENCY;
use slide_core::{
    ChunkedTranslator, FontFitPolicy, RunReport, SourceLanguage, SummaryLog, UnitPipeline,
    UnitStatus, DEFAULT_CHUNK_SIZE,
};
use slide_pptx::{Granularity, PptxDeck, PresentationTranslator};
use std::path::PathBuf;

/// Translate a .pptx deck while keeping its layout and the company name intact.
#[derive(Parser, Debug)]
#[command(name = "slide-translate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input deck (.pptx)
    input: PathBuf,

    /// Where to write the translated deck
    output: PathBuf,

    /// Target language code (e.g. fr, de, es)
    target_lang: String,

    /// Source language code, or "auto" to let the backend detect it
    #[arg(short, long, default_value = "auto")]
    source: String,

    /// Translation backend
    #[arg(short, long, value_enum, default_value_t = BackendArg::Google)]
    backend: BackendArg,

    /// DeepL API key
    #[arg(long, env = "DEEPL_API_KEY", hide_env_values = true)]
    deepl_api_key: Option<String>,

    /// Translate run by run or whole paragraphs
    #[arg(short, long, value_enum, default_value_t = GranularityArg::Run)]
    granularity: GranularityArg,

    /// Maximum characters per backend request
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Backend requests in flight per text
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Leave font sizes alone
    #[arg(long)]
    no_font_fit: bool,

    /// Directory for the summary log
    #[arg(long, default_value = ".")]
    summary_dir: PathBuf,

    /// Do not write a summary log
    #[arg(long)]
    no_summary: bool,

    /// Also write a JSON report of every translated text
    #[arg(long)]
    report: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GranularityArg {
    /// Each run separately; formatting of every run is kept
    Run,
    /// Whole paragraphs; runs are merged into one
    Paragraph,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Run => Granularity::Run,
            GranularityArg::Paragraph => Granularity::Paragraph,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let backend = BackendKind::from(args.backend)
        .build(args.deepl_api_key.as_deref())
        .context("Failed to set up the translation backend")?;

    let translator = ChunkedTranslator::new(backend)
        .with_chunk_size(args.chunk_size)
        .with_concurrency(args.concurrency);
    let pipeline = UnitPipeline::new(
        translator,
        SourceLanguage::parse(&args.source),
        args.target_lang.clone(),
    )?;

    let fit = if args.no_font_fit {
        None
    } else {
        Some(FontFitPolicy::default())
    };
    let presentation = PresentationTranslator::new(pipeline)
        .with_granularity(args.granularity.into())
        .with_font_fit(fit);

    log::info!("Loading presentation: {}", args.input.display());
    let mut deck = PptxDeck::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;

    let mut report = RunReport::new();
    presentation.translate(&mut deck, &mut report).await;

    deck.save(&args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    log::info!("Translation complete. Saved to: {}", args.output.display());
    log::info!(
        "{} translated, {} unchanged, {} company name only, {} chunks kept untranslated",
        report.count(UnitStatus::Translated),
        report.count(UnitStatus::Unchanged),
        report.count(UnitStatus::BrandOnly),
        report.fallback_chunks()
    );

    if !args.no_summary {
        let summary = SummaryLog::new(args.output.clone(), Local::now());
        match summary.write_to_dir(&args.summary_dir, &report) {
            Ok(path) => log::info!("Summary saved to {}", path.display()),
            Err(e) => log::warn!("Failed to write summary log: {}", e),
        }
    }

    if let Some(path) = &args.report {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    Ok(())
}
