//! tablegrid command-line interface.
//!
//! # Usage
//!
//! ```bash
//! # Segment the whole page as one table, OCR every cell, print JSON
//! tablegrid extract scan.png
//!
//! # Two known table regions, Markdown output, overlay for inspection
//! tablegrid extract scan.png --region 40,300,1200,900 --region 40,950,1200,1400 \
//!     --format markdown --overlay scan.overlay.png
//!
//! # Grid geometry only, no OCR
//! tablegrid cells scan.png --region 40,300,1200,900
//!
//! # Print the effective configuration
//! tablegrid config
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::ImageFormat;
use tablegrid::core::config::ExtractionConfig;
use tablegrid::core::pipeline::TablePipeline;
use tablegrid::layout::{FixedLayout, LayoutDetector, WholePageTable};
use tablegrid::ocr::{OcrBackend, TesseractCliBackend};
use tablegrid::table::{rows_to_csv, table_to_markdown, text_to_csv};
use tablegrid::types::{BoundingBox, PageResult, TableGrid, TableResult};
use tablegrid::{load_image_file, render_overlay};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tablegrid", version, about = "Segment ruled tables in scanned pages into cells")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). Overrides RUST_LOG.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract tables: grid segmentation, cell OCR and export.
    Extract(ExtractArgs),
    /// Print the cell grid of each table region as JSON, without OCR.
    Cells(CellsArgs),
    /// Print the effective configuration as JSON.
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct RegionArgs {
    /// Page image (PNG, JPEG, TIFF, BMP, WebP, GIF).
    image: PathBuf,

    /// Table region as x1,y1,x2,y2 in page pixels. Repeatable; defaults to the whole page.
    #[arg(long = "region", value_name = "X1,Y1,X2,Y2")]
    regions: Vec<BoundingBox>,

    /// Configuration file (TOML, YAML or JSON). Defaults to a discovered tablegrid.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    #[command(flatten)]
    input: RegionArgs,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write a PNG with region and cell outlines drawn over the page.
    #[arg(long, value_name = "OUT.png")]
    overlay: Option<PathBuf>,

    /// Skip page and cell OCR.
    #[arg(long)]
    no_ocr: bool,

    /// Write the result to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CellsArgs {
    #[command(flatten)]
    input: RegionArgs,
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Configuration file (TOML, YAML or JSON). Defaults to a discovered tablegrid.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
    Csv,
}

fn init_tracing(verbose: u8) {
    let env_filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ExtractionConfig> {
    let config = match path {
        Some(path) => ExtractionConfig::from_file(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?,
        None => ExtractionConfig::discover()
            .context("failed to load discovered tablegrid.toml")?
            .unwrap_or_default(),
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn detector_for(regions: &[BoundingBox]) -> Arc<dyn LayoutDetector> {
    if regions.is_empty() {
        Arc::new(WholePageTable)
    } else {
        Arc::new(FixedLayout::from_table_regions(regions.iter().copied()))
    }
}

fn ocr_backend(config: &ExtractionConfig) -> Result<Option<Arc<dyn OcrBackend>>> {
    if !config.ocr.enabled {
        return Ok(None);
    }

    match config.ocr.backend.as_str() {
        "tesseract" => {
            let backend = TesseractCliBackend::from_config(&config.ocr).context("OCR is enabled but unavailable")?;
            Ok(Some(Arc::new(backend)))
        }
        other => bail!("unknown OCR backend '{}' (available: tesseract)", other),
    }
}

/// Cell texts for a table, or an empty grid of the same shape when OCR did not run.
fn table_rows(result: &TableResult) -> Vec<Vec<String>> {
    match &result.table {
        Some(table) => table.cells.clone(),
        None => vec![vec![String::new(); result.grid.columns]; result.grid.rows],
    }
}

fn render(result: &PageResult, format: OutputFormat) -> Result<String> {
    let tables: Vec<&TableResult> = result.tables.iter().filter(|t| !t.grid.is_empty()).collect();

    let rendered = match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(result)?;
            json.push('\n');
            json
        }
        OutputFormat::Markdown => tables
            .iter()
            .map(|t| table_to_markdown(&table_rows(t)))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Csv if tables.is_empty() => text_to_csv(&result.text)?,
        OutputFormat::Csv => tables
            .iter()
            .map(|t| rows_to_csv(&table_rows(t)))
            .collect::<tablegrid::Result<Vec<_>>>()?
            .join("\n"),
    };
    Ok(rendered)
}

fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, content).with_context(|| format!("failed to write '{}'", path.display())),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

fn run_extract(args: &ExtractArgs) -> Result<()> {
    let mut config = load_config(args.input.config.as_deref())?;
    if args.no_ocr {
        config.ocr.enabled = false;
    }

    let ocr = ocr_backend(&config)?;
    let pipeline = TablePipeline::new(config, detector_for(&args.input.regions), ocr)?;

    let page = load_image_file(&args.input.image)
        .with_context(|| format!("failed to load '{}'", args.input.image.display()))?;
    let result = pipeline
        .process_page(&page)
        .with_context(|| format!("failed to extract tables from '{}'", args.input.image.display()))?;

    if let Some(path) = &args.overlay {
        match render_overlay(&page, &result.tables) {
            Some(overlay) => overlay
                .save_with_format(path, ImageFormat::Png)
                .with_context(|| format!("failed to write overlay '{}'", path.display()))?,
            None => tracing::warn!("No table regions on the page, overlay not written"),
        }
    }

    let cell_count: usize = result.tables.iter().map(|t| t.grid.cells.len()).sum();
    tracing::info!("{} table regions, {} cells", result.tables.len(), cell_count);

    emit(&render(&result, args.format)?, args.output.as_deref())
}

fn run_cells(args: &CellsArgs) -> Result<()> {
    let mut config = load_config(args.input.config.as_deref())?;
    config.ocr.enabled = false;

    let pipeline = TablePipeline::new(config, detector_for(&args.input.regions), None)?;
    let result = pipeline
        .process_file(&args.input.image)
        .with_context(|| format!("failed to segment '{}'", args.input.image.display()))?;

    let grids: Vec<TableGrid> = result.tables.into_iter().map(|t| t.grid).collect();
    println!("{}", serde_json::to_string_pretty(&grids)?);
    Ok(())
}

fn run_config(args: &ConfigArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Extract(args) => run_extract(args),
        Commands::Cells(args) => run_cells(args),
        Commands::Config(args) => run_config(args),
    }
}
