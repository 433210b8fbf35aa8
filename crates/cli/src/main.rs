// insight CLI - weekly marketing performance reports, headless

mod exit_codes;
mod render;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "insight")]
#[command(about = "Reconcile ad traffic, clicks and weather into a weekly performance report")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline from a TOML report config
    #[command(after_help = "\
Examples:
  insight run weekly.report.toml
  insight run weekly.report.toml --json
  insight run weekly.report.toml --output result.json
  insight run weekly.report.toml --threshold 0.5")]
    Run {
        /// Path to the .report.toml config file
        config: PathBuf,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Also write JSON output to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Override anomaly.drop_threshold (fraction, e.g. 0.3)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Validate a report config without running
    #[command(after_help = "\
Config layout:
  [report]        client_name, week_start, week_end, output_dir, output_formats
  [data_sources]  traffic_csv, clicks_csv, weather_csv, extra_csv (optional)
  [anomaly]       drop_threshold (optional, default 0.30)")]
    Validate {
        /// Path to the .report.toml config file
        config: PathBuf,
    },

    /// Print one sentence per day-over-day traffic drop
    #[command(after_help = "\
Examples:
  insight anomalies weekly.report.toml
  insight anomalies weekly.report.toml --threshold 0.2")]
    Anomalies {
        /// Path to the .report.toml config file
        config: PathBuf,

        /// Override anomaly.drop_threshold (fraction, e.g. 0.3)
        #[arg(long)]
        threshold: Option<f64>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  insight-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn eval(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Run { config, json, output, threshold } => {
            report::cmd_run(config, json, output, threshold)
        }
        Commands::Validate { config } => report::cmd_validate(config),
        Commands::Anomalies { config, threshold } => report::cmd_anomalies(config, threshold),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
