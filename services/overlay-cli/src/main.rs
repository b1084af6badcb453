//! Air-quality overlay renderer.
//!
//! Renders ozone forecast and station AQI overlays to PNG from a grid pack
//! on disk or over HTTP.

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use grid_processor::OzoneService;
use npy_parser::NpyVersion;
use overlay_cli::{commands, load_stations, DataSource, LegendKind};
use projection::Viewport;
use renderer::{ClusterConfig, HeatmapConfig, OzoneStyle};
use storage::LoaderConfig;

#[derive(Parser, Debug)]
#[command(name = "overlay-cli")]
#[command(about = "Render air-quality map overlays")]
struct Args {
    /// Directory holding manifest.json and the hour files
    #[arg(long, env = "OZONE_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Base URL of a published grid pack
    #[arg(long, env = "OZONE_DATA_URL", global = true)]
    data_url: Option<String>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs, Debug, Clone, Copy)]
struct ViewArgs {
    #[arg(long, default_value_t = 1024)]
    width: u32,

    #[arg(long, default_value_t = 768)]
    height: u32,

    #[arg(long, default_value_t = 38.0, allow_hyphen_values = true)]
    lat: f64,

    #[arg(long, default_value_t = -96.0, allow_hyphen_values = true)]
    lon: f64,

    #[arg(long, default_value_t = 4.0)]
    zoom: f64,
}

impl ViewArgs {
    fn viewport(&self) -> Result<Viewport> {
        Viewport::new(self.width, self.height, self.lat, self.lon, self.zoom)
            .context("Invalid viewport")
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the forecast hours in the manifest
    Hours,

    /// Interpolated ozone value at a location
    Value {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, default_value_t = 0)]
        hour: u32,
    },

    /// Render the ozone overlay for one forecast hour
    Ozone {
        #[arg(long, default_value_t = 0)]
        hour: u32,
        #[command(flatten)]
        view: ViewArgs,
        #[arg(short, long, default_value = "ozone.png")]
        output: PathBuf,
    },

    /// Render the station AQI heatmap
    Heatmap {
        /// JSON array of station readings
        #[arg(long)]
        stations: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
        #[arg(short, long, default_value = "heatmap.png")]
        output: PathBuf,
    },

    /// Print station marker positions as JSON
    Markers {
        #[arg(long)]
        stations: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Print legend rows as JSON
    Legend {
        #[arg(value_enum)]
        kind: LegendKind,
        #[arg(long, default_value_t = 5)]
        ticks: usize,
    },

    /// Pack a raw little-endian float32 grid as npy
    Encode {
        input: PathBuf,
        #[arg(long)]
        rows: usize,
        #[arg(long)]
        cols: usize,
        /// npy format version (1 or 2)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
        npy_version: u8,
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(args))
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let open_service = || -> Result<OzoneService> {
        let source = DataSource::from_args(args.data_dir.clone(), args.data_url.clone())?;
        let cache = source.open(LoaderConfig::from_env())?;
        Ok(OzoneService::new(Arc::new(cache)))
    };

    match &args.command {
        Command::Hours => {
            let hours = commands::list_hours(&open_service()?).await?;
            print_json(&hours)?;
        }
        Command::Value { lat, lon, hour } => {
            let value = commands::point_value(&open_service()?, *lat, *lon, *hour).await?;
            print_json(&value)?;
        }
        Command::Ozone { hour, view, output } => {
            let summary = commands::render_ozone(
                open_service()?,
                *hour,
                view.viewport()?,
                OzoneStyle::from_env(),
                output,
            )
            .await?;
            print_json(&summary)?;
        }
        Command::Heatmap {
            stations,
            view,
            output,
        } => {
            let stations = load_stations(stations)?;
            let summary = commands::render_heatmap(
                &stations,
                &view.viewport()?,
                HeatmapConfig::from_env(),
                output,
            )?;
            print_json(&summary)?;
        }
        Command::Markers { stations, view } => {
            let stations = load_stations(stations)?;
            let markers =
                commands::marker_layout(&stations, &view.viewport()?, &ClusterConfig::from_env());
            info!(count = markers.len(), "Placed markers");
            print_json(&markers)?;
        }
        Command::Legend { kind, ticks } => {
            println!(
                "{}",
                commands::legend(*kind, &OzoneStyle::from_env(), *ticks)?
            );
        }
        Command::Encode {
            input,
            rows,
            cols,
            npy_version,
            output,
        } => {
            let version = if *npy_version == 2 {
                NpyVersion::V2
            } else {
                NpyVersion::V1
            };
            commands::encode_raw(input, *rows, *cols, version, output)?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
