use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pathshape::config::Config;
use pathshape::filter::{self, ColorMatrix};
use pathshape::pipeline::{LogEvents, Pipeline, PipelineOptions};
use pathshape::storage::{LifecycleHook, TempStorage};
use pathshape::{PathShapeRenderer, ShapeGenerator};
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "pathshape")]
#[command(version, about = "Render declarative path shapes with deterministic cache keys")]
struct Cli {
    /// Config file to use instead of ~/.config/pathshape/config.toml
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a shape config to a PNG file
    Render {
        /// JSON shape config file, or `-` for stdin
        config: String,

        /// Raster width in pixels (defaults to render.default_width)
        #[arg(long)]
        width: Option<u32>,

        /// Raster height in pixels (defaults to render.default_height)
        #[arg(long)]
        height: Option<u32>,

        /// Output PNG path
        #[arg(long, short = 'o', value_name = "PNG")]
        output: PathBuf,

        /// Also extract the raster into temporary storage
        #[arg(long)]
        extract: bool,

        /// Color matrix filter as JSON, e.g. '{"name":"sepia","value":0.8}'.
        /// Repeat to chain filters in order.
        #[arg(long = "filter", value_name = "JSON")]
        filters: Vec<String>,
    },
    /// Print the cache key for a shape config
    Key {
        /// JSON shape config file, or `-` for stdin
        config: String,

        #[arg(long)]
        width: Option<u32>,

        #[arg(long)]
        height: Option<u32>,
    },
    /// Remove extracted images from temporary storage
    Clean,
    /// Print the JSON schema of the settings file
    Schema,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = match &cli.settings {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Render {
            config: shape_config,
            width,
            height,
            output,
            extract,
            filters,
        } => {
            config.extract.enabled |= extract;
            let shape = read_shape_config(&shape_config)?;
            let renderer = build_renderer(&config, &shape, width, height);
            let matrices = filters
                .iter()
                .map(|text| parse_filter(text))
                .collect::<Result<Vec<_>>>()?;

            let pipeline = Pipeline::new(PipelineOptions::from_config(&config));
            let mut key = renderer.generate_cache_key();
            let mut bitmap = pipeline
                .generate(&renderer, &LogEvents)
                .with_context(|| format!("Failed to render {}", renderer.name()))?;
            for matrix in &matrices {
                bitmap = pipeline.apply_filter(&bitmap, &key, matrix, &LogEvents);
                key = matrix.filtered_key(&key);
            }
            let png = bitmap.to_png().context("Failed to encode PNG")?;
            fs::write(&output, png)
                .with_context(|| format!("Failed to write {}", output.display()))?;

            println!("{}", output.display());
        }
        Command::Key {
            config: shape_config,
            width,
            height,
        } => {
            let shape = read_shape_config(&shape_config)?;
            let renderer = build_renderer(&config, &shape, width, height);
            println!("{}", renderer.generate_cache_key());
        }
        Command::Clean => {
            let storage = Arc::new(TempStorage::from_config(&config.extract));
            let hook = LifecycleHook::new(&storage, config.extract.cleanup_max_retries);
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to start runtime")?;

            let report = match hook.instance_destroyed(runtime.handle()) {
                Some(task) => runtime.block_on(task).context("Cleanup task panicked")?,
                None => None,
            };
            match report {
                Some(report) => println!(
                    "Removed {} file(s) from {} ({} failed)",
                    report.removed,
                    storage.dir().display(),
                    report.failed
                ),
                None => println!("Cleanup of {} did not complete", storage.dir().display()),
            }
        }
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&Config::schema())?);
        }
    }

    Ok(())
}

fn build_renderer(
    config: &Config,
    shape: &Value,
    width: Option<u32>,
    height: Option<u32>,
) -> PathShapeRenderer {
    let width = width.unwrap_or(config.render.default_width);
    let height = height.unwrap_or(config.render.default_height);
    PathShapeRenderer::new(width, height, Some(shape))
}

fn parse_filter(text: &str) -> Result<ColorMatrix> {
    let value: Value = serde_json::from_str(text)
        .with_context(|| format!("Filter is not valid JSON: {}", text))?;
    filter::from_config(&value).with_context(|| format!("Unknown color matrix filter: {}", text))
}

fn read_shape_config(source: &str) -> Result<Value> {
    let text = if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read shape config from stdin")?;
        text
    } else {
        let path = Path::new(source);
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read shape config {}", path.display()))?
    };

    serde_json::from_str(&text).context("Shape config is not valid JSON")
}
