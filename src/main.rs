use anyhow::{Context, Result};
use clap::Parser;
use demodash::dashboard;
use demodash::dataset;
use demodash::render::{self, RenderConfig};
use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "demodash")]
#[command(about = "Render demographic summary charts from a subject CSV", long_about = None)]
struct Args {
    #[arg(help = "Input CSV file (reads stdin when omitted)")]
    input: Option<PathBuf>,

    #[arg(long = "out-dir", default_value = ".", help = "Directory for rendered PNG files")]
    out_dir: PathBuf,

    #[arg(long = "bins", default_value = "5", help = "Desired number of age histogram bins")]
    bins: usize,

    #[arg(long = "width", default_value = "800", help = "Chart width in pixels")]
    width: u32,

    #[arg(long = "height", default_value = "600", help = "Chart height in pixels")]
    height: u32,

    #[arg(
        long = "models-json",
        help = "Print the chart models as JSON instead of rendering"
    )]
    models_json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let dataset = match &args.input {
        Some(path) => dataset::read_from_path(path)
            .with_context(|| format!("Failed to load dataset from {}", path.display()))?,
        None => dataset::read_from_reader(io::stdin())
            .context("Failed to load dataset from stdin")?,
    };

    log::info!("Loaded {} records", dataset.records.len());
    for issue in &dataset.issues {
        log::warn!(
            "Row {}: could not parse {} value '{}'; record excluded from the histogram",
            issue.row,
            issue.column,
            issue.value
        );
    }

    let models = dashboard::build_models(&dataset.records, args.bins)
        .context("Failed to build chart models")?;

    if args.models_json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let config = RenderConfig {
        width: args.width,
        height: args.height,
    };
    for model in &models {
        log::info!("Rendering {}", model.mount);
        let png_bytes = render::render_chart(model, &config)
            .with_context(|| format!("Failed to render chart '{}'", model.mount))?;
        let path = args.out_dir.join(format!("{}.png", model.mount));
        fs::write(&path, png_bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}
