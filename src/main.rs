#![forbid(unsafe_code)]

mod compose;
mod config;
mod constants;
mod context;
mod error;
mod light;
mod network;
mod params;
mod platform;
mod registry;
mod socket;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::{info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use compose::{compose, BuildReport};
use config::BuildDocument;

#[derive(Parser, Debug)]
#[command(name = "bulb-composer", version, about = "Compose build parameters for RGBWW bulb firmware")]
struct Cli {
    /// Build document (defaults to <config dir>/bulb-composer/build.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate and compose, then write the parameter set as JSON
    Compose {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Validate only
    Check,
    /// List socket implementation sources excluded from the build
    Sources,
}

fn build(config: Option<PathBuf>) -> Result<BuildReport> {
    let path = config.unwrap_or_else(BuildDocument::default_path);
    let document = BuildDocument::load(&path)?;
    let report = compose(document).with_context(|| format!("Invalid build document {:?}", path))?;
    Ok(report)
}

fn main() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    // Logs go to stderr so stdout stays parseable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Command::Compose { output, compact } => {
            let report = build(cli.config)?;
            let json = if compact {
                serde_json::to_string(&report)?
            } else {
                serde_json::to_string_pretty(&report)?
            };
            match output {
                Some(path) => {
                    fs::write(&path, json + "\n")
                        .with_context(|| format!("Failed to write parameter set to {:?}", path))?;
                    info!(path = %path.display(), "Wrote parameter set");
                }
                None => println!("{json}"),
            }
        }
        Command::Check => {
            let report = build(cli.config)?;
            info!(lights = report.lights.len(), "Build document is valid");
        }
        Command::Sources => {
            let report = build(cli.config)?;
            match report.socket {
                Some(selection) => {
                    for source in selection.excluded_sources {
                        println!("{source}");
                    }
                }
                None => info!("No socket backend in this build"),
            }
        }
    }

    Ok(())
}
