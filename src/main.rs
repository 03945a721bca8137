use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stitch_quant::{DitherMode, NormalizedImage, Selection, SelectionMask, VectorPath};
use stitchgrid::image_loader::load_png;
use stitchgrid::models::AppConfig;
use stitchgrid::services::PatternService;

#[derive(Parser)]
#[command(name = "stitchgrid")]
#[command(about = "Stitchgrid - turn images into cross-stitch color regions")]
struct Cli {
    /// YAML config file (falls back to $STITCHGRID_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quantize an image and print palette and label statistics
    Quantize(PatternArgs),
    /// Build the region graph and print a summary
    Regions(PatternArgs),
    /// Trace vector paths per color
    Paths(PatternArgs),
}

#[derive(Args)]
struct PatternArgs {
    /// Input PNG
    image: PathBuf,

    /// Number of palette colors (overrides config)
    #[arg(short, long)]
    colors: Option<u32>,

    /// Ordered dithering (overrides config)
    #[arg(short, long, value_enum)]
    dither: Option<DitherArg>,

    /// Selection mask PNG; pixels with red >= 128 and alpha >= 128 are selected
    #[arg(short, long)]
    mask: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum DitherArg {
    None,
    Bayer,
}

impl From<DitherArg> for DitherMode {
    fn from(arg: DitherArg) -> Self {
        match arg {
            DitherArg::None => DitherMode::None,
            DitherArg::Bayer => DitherMode::Bayer,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuantizeReport {
    width: u32,
    height: u32,
    palette_hex: Vec<String>,
    label_counts: Vec<usize>,
    fabric_labels: Vec<u16>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PathsReport {
    width: u32,
    height: u32,
    palette_hex: Vec<String>,
    paths: Vec<VectorPath>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Minimal logging for CLI
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stitchgrid=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config_path = AppConfig::resolve_path(cli.config);
    let base_config = AppConfig::load(config_path.as_deref());

    match cli.command {
        Commands::Quantize(args) => run_quantize_command(base_config, &args).await,
        Commands::Regions(args) => run_regions_command(base_config, &args).await,
        Commands::Paths(args) => run_paths_command(base_config, &args).await,
    }
}

/// Apply command-line overrides and load the inputs
fn prepare(
    mut config: AppConfig,
    args: &PatternArgs,
) -> anyhow::Result<(PatternService, Arc<NormalizedImage>, Selection)> {
    if let Some(colors) = args.colors {
        config.processing = config.processing.color_count(colors);
    }
    if let Some(dither) = args.dither {
        config.processing = config.processing.dither(dither.into());
    }

    let image = load_png(&args.image)
        .with_context(|| format!("Failed to load {}", args.image.display()))?;
    let selection = match &args.mask {
        Some(path) => Selection::Mask(load_mask(path)?),
        None => Selection::select_all(image.width(), image.height()),
    };

    Ok((PatternService::new(Arc::new(config)), Arc::new(image), selection))
}

fn load_mask(path: &Path) -> anyhow::Result<SelectionMask> {
    let image =
        load_png(path).with_context(|| format!("Failed to load mask {}", path.display()))?;
    let data = image
        .rgba()
        .chunks_exact(4)
        .map(|p| (p[0] >= 128 && p[3] >= 128) as u8)
        .collect();
    SelectionMask::new(image.width(), image.height(), data).context("Invalid mask")
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_quantize_command(config: AppConfig, args: &PatternArgs) -> anyhow::Result<()> {
    let (service, image, selection) = prepare(config, args)?;
    let selection = selection.resample_to(image.width(), image.height())?;
    let mask = match selection {
        Selection::All { .. } => None,
        Selection::Mask(m) => Some(Arc::new(m)),
    };

    let result = service
        .quantize(image, mask)
        .await
        .context("Quantization failed")?;

    print_json(&QuantizeReport {
        width: result.width,
        height: result.height,
        palette_hex: result.palette.hex_colors(),
        label_counts: result.label_counts(),
        fabric_labels: service.fabric_labels(&result),
    })
}

async fn run_regions_command(config: AppConfig, args: &PatternArgs) -> anyhow::Result<()> {
    let (service, image, selection) = prepare(config, args)?;
    let run = service
        .run(image, &selection)
        .await
        .context("Pattern pipeline failed")?;
    print_json(&run.summary())
}

async fn run_paths_command(config: AppConfig, args: &PatternArgs) -> anyhow::Result<()> {
    let (service, image, selection) = prepare(config, args)?;
    let run = service
        .run(image, &selection)
        .await
        .context("Pattern pipeline failed")?;
    let mask = match &run.selection {
        Selection::All { .. } => None,
        Selection::Mask(m) => Some(Arc::new(m.clone())),
    };
    let paths = service
        .paths(run.quantized.clone(), mask)
        .await
        .context("Path extraction failed")?;

    print_json(&PathsReport {
        width: run.quantized.width,
        height: run.quantized.height,
        palette_hex: run.quantized.palette.hex_colors(),
        paths,
    })
}
