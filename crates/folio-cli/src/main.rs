//! Folio command-line interface

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use folio::cache::DiskPageCache;
use folio::export::write_paragraph_texts;
use folio::ocr::{TesseractEngine, parse_tsv};
use folio::pdf::PdftoppmRasterizer;
use folio::{
    CancellationToken, DocumentReconstructor, DocumentResult, FolioConfig, PageErrorPolicy, PageRange, PageResult,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One `page<TAB>paragraph<TAB>text` line per paragraph
    #[default]
    Text,
    /// Full result as JSON
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "folio", version)]
#[command(about = "Reconstruct paragraphs from scanned documents", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rasterize, OCR and reconstruct a PDF
    Document {
        /// PDF file to process
        pdf: PathBuf,

        /// Page or inclusive page range, e.g. `3` or `3-7` (default: all pages)
        #[arg(short, long)]
        pages: Option<PageRange>,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,

        /// Also write `page_<n>/paragraph_texts.txt` files under this directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Fail the whole document when any page fails
        #[arg(long)]
        strict: bool,

        /// Maximum pages processed concurrently
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Per-page timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Skip the page cache
        #[arg(long)]
        no_cache: bool,

        /// Configuration file (TOML, YAML or JSON); default: discover folio.toml
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Reconstruct one page from saved Tesseract TSV output
    Tsv {
        /// TSV file produced by `tesseract <image> <base> tsv`
        file: PathBuf,

        /// Page number to report
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,

        /// Configuration file (TOML, YAML or JSON); default: discover folio.toml
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Document {
            pdf,
            pages,
            format,
            output_dir,
            strict,
            concurrency,
            timeout,
            no_cache,
            config,
        } => {
            let mut config = load_config(config.as_deref())?;
            apply_overrides(&mut config, strict, concurrency, timeout, no_cache);
            config.validate()?;

            let result = run_document(&pdf, pages, config).await?;

            if let Some(dir) = output_dir {
                write_paragraph_texts(&dir, &result)
                    .await
                    .with_context(|| format!("Failed to export to {}", dir.display()))?;
            }

            print!("{}", render_document(&result, format)?);

            for failure in &result.failures {
                eprintln!(
                    "warning: page {} failed ({}): {}",
                    failure.page_number, failure.error_kind, failure.message
                );
            }

            Ok(if result.is_complete() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            })
        }

        Commands::Tsv {
            file,
            page,
            format,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            config.validate()?;

            let tsv = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let records = parse_tsv(&tsv)?;
            let result = folio::reconstruct_page(page, &records, &config.layout)?;

            print!("{}", render_page(&result, format)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<FolioConfig> {
    match path {
        Some(path) => FolioConfig::from_file(path).with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(FolioConfig::discover()?.unwrap_or_default()),
    }
}

fn apply_overrides(
    config: &mut FolioConfig,
    strict: bool,
    concurrency: Option<usize>,
    timeout: Option<u64>,
    no_cache: bool,
) {
    if strict {
        config.error_policy = PageErrorPolicy::Strict;
    }
    if concurrency.is_some() {
        config.max_concurrent_pages = concurrency;
    }
    if timeout.is_some() {
        config.page_timeout_secs = timeout;
    }
    if no_cache {
        config.use_cache = false;
    }
}

async fn run_document(pdf: &Path, pages: Option<PageRange>, config: FolioConfig) -> Result<DocumentResult> {
    let rasterizer = PdftoppmRasterizer::open(pdf, &config.raster)
        .await
        .with_context(|| format!("Failed to open {}", pdf.display()))?;

    let cache = if config.use_cache {
        Some(DiskPageCache::new(
            config.resolved_cache_dir(),
            rasterizer.document_key(),
            &config,
        )?)
    } else {
        None
    };

    let engine = TesseractEngine::new(config.ocr.clone());
    let cancel = CancellationToken::new();

    let mut reconstructor =
        DocumentReconstructor::new(Arc::new(rasterizer), Arc::new(engine), config).with_cancellation(cancel.clone());
    if let Some(cache) = cache {
        reconstructor = reconstructor.with_cache(Arc::new(cache));
    }

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling remaining pages");
            cancel.cancel();
        }
    });

    let result = reconstructor.reconstruct(pages).await;
    interrupt.abort();

    Ok(result?)
}

fn render_document(result: &DocumentResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(result
            .triples()
            .map(|(page, index, text)| format!("{}\t{}\t{}\n", page, index, text))
            .collect()),
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(result)?)),
    }
}

fn render_page(result: &PageResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(result
            .paragraphs
            .iter()
            .map(|p| format!("{}\t{}\t{}\n", result.page_number, p.paragraph_index, p.text))
            .collect()),
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(result)?)),
    }
}
