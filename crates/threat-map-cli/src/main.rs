//! Threat Map CLI
//!
//! Usage:
//!   threat-map validate data/threats.json
//!   threat-map geojson data/threats.json --output data/threats.geojson
//!   threat-map args data/threats.json --height 600
//!   threat-map render data/threats.json --height 300 --click 0

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use threat_map_cli::{dry_run, export, loader, WRAPPER_DEFAULT_HEIGHT};
use threat_map_wasm::RenderArgs;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "threat-map",
    about = "Validate, export and dry-run threat map payloads"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a dataset for out-of-range values
    Validate {
        /// Dataset JSON file (`-` for stdin)
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Exit non-zero when any issue is found
        #[arg(long)]
        strict: bool,
    },

    /// Write the dataset as a GeoJSON FeatureCollection
    Geojson {
        /// Dataset JSON file (`-` for stdin)
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Map config JSON (palette)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the render arguments the dashboard would send for a dataset
    Args {
        /// Dataset JSON file (`-` for stdin)
        input: PathBuf,

        /// Frame height in pixels
        #[arg(long, default_value_t = WRAPPER_DEFAULT_HEIGHT)]
        height: u32,
    },

    /// Render in memory and show markers plus host messages
    Render {
        /// Dataset, render arguments, or a raw host render message (`-` for stdin)
        input: PathBuf,

        /// Override the frame height
        #[arg(long)]
        height: Option<u32>,

        /// Map config JSON
        #[arg(long)]
        config: Option<PathBuf>,

        /// Simulate a click on the marker at this index (repeatable)
        #[arg(long)]
        click: Vec<usize>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays machine-readable
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Validate { input, json, strict } => {
            let dataset = loader::load_dataset(&input)?;
            let report = dataset.validate();

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                info!(
                    "{} countries: {} high / {} mid / {} low",
                    report.total, report.high, report.mid, report.low
                );
                for issue in &report.issues {
                    warn!("  {}", issue);
                }
                if report.is_clean() {
                    info!("No issues found");
                }
            }

            if strict && !report.is_clean() {
                bail!("{} issue(s) found", report.issues.len());
            }
        }

        Command::Geojson {
            input,
            output,
            config,
        } => {
            let dataset = loader::load_dataset(&input)?;
            let config = loader::load_config(config.as_deref())?;
            let fc = export::to_feature_collection(&dataset, &config.palette);

            match output {
                Some(path) => {
                    info!("Writing GeoJSON to {:?}", path);
                    let writer = BufWriter::new(File::create(&path)?);
                    serde_json::to_writer_pretty(writer, &fc)?;
                }
                None => println!("{}", serde_json::to_string_pretty(&fc)?),
            }
        }

        Command::Args { input, height } => {
            let dataset = loader::load_dataset(&input)?;
            let render_args = RenderArgs::from_dataset(&dataset, Some(height))?;
            println!("{}", serde_json::to_string(&render_args)?);
        }

        Command::Render {
            input,
            height,
            config,
            click,
            json,
        } => {
            let mut render_args = loader::render_args_from(&loader::read_source(&input)?)?;
            if let Some(h) = height {
                render_args.height = Some(f64::from(h));
            }
            let config = loader::load_config(config.as_deref())?;

            let report = dry_run::dry_run(&render_args, config, &click)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                match (&report.outcome, &report.error) {
                    (Some(outcome), _) => info!("Outcome: {:?}", outcome),
                    (None, Some(err)) => warn!("Render failed: {}", err),
                    (None, None) => {}
                }
                if let Some(text) = &report.placeholder {
                    info!("Placeholder: {}", text);
                }
                for (i, m) in report.markers.iter().enumerate() {
                    info!(
                        "  #{:<3} {:>8.3},{:>9.3}  {:4}  {}  r={}",
                        i,
                        m.position.lat,
                        m.position.lon,
                        m.severity.label(),
                        m.color,
                        m.radius
                    );
                }
                for message in &report.messages {
                    info!("  -> {}", message);
                }
            }

            if report.error.is_some() {
                bail!("render failed");
            }
        }
    }

    Ok(())
}
