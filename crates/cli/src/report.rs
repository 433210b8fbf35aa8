//! `insight run | validate | anomalies`: config-driven weekly report runs.

use std::path::{Path, PathBuf};

use insight_recon::config::{check_threshold, OutputFormat};
use insight_recon::engine::load_input;
use insight_recon::{InsightError, ReportConfig};

use crate::exit_codes::{insight_exit_code, EXIT_IO, EXIT_USAGE};
use crate::render::render_text;
use crate::CliError;

fn engine_err(err: InsightError) -> CliError {
    let hint = match &err {
        InsightError::DateParse { .. } => Some("dates must look like YYYY-MM-DD".to_string()),
        InsightError::ConfigParse(_) => Some("see `insight validate --help` for the config layout".to_string()),
        _ => None,
    };
    CliError {
        code: insight_exit_code(&err),
        message: err.to_string(),
        hint,
    }
}

fn io_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_IO, message: msg.into(), hint: None }
}

/// Read and validate a report config, applying a threshold override.
fn load_config(config_path: &Path, threshold: Option<f64>) -> Result<ReportConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| io_err(format!("cannot read config: {e}")))?;
    let mut config = ReportConfig::from_toml(&config_str).map_err(engine_err)?;

    if let Some(t) = threshold {
        check_threshold(t).map_err(|e| CliError {
            code: EXIT_USAGE,
            message: e.to_string(),
            hint: Some("pass --threshold as a fraction, e.g. 0.3 for a 30% drop".into()),
        })?;
        config.anomaly.drop_threshold = t;
    }
    Ok(config)
}

/// Directory that relative paths in the config resolve against.
fn base_dir(config_path: &Path) -> &Path {
    config_path.parent().unwrap_or_else(|| Path::new("."))
}

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    threshold: Option<f64>,
) -> Result<(), CliError> {
    let config = load_config(&config_path, threshold)?;
    let base = base_dir(&config_path);

    let input = load_input(&config, base).map_err(engine_err)?;
    let result = insight_recon::run(&config, &input).map_err(engine_err)?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::eval(format!("JSON serialization error: {e}")))?;

    let output_dir = base.join(&config.report.output_dir);
    std::fs::create_dir_all(&output_dir)
        .map_err(|e| io_err(format!("cannot create {}: {e}", output_dir.display())))?;

    let base_name = config.base_filename();
    for format in &config.report.output_formats {
        let path = output_dir.join(format!("{base_name}.{}", format.extension()));
        let body = match format {
            OutputFormat::Json => json_str.clone(),
            OutputFormat::Text => render_text(&result),
        };
        std::fs::write(&path, body)
            .map_err(|e| io_err(format!("cannot write {}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), "wrote report");
    }

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| io_err(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    let o = &result.overall;
    eprintln!(
        "{} rows reconciled: {} campaigns, {} impressions, {} clicks, {} conversions, {} anomalies",
        result.unified.len(),
        result.campaigns.len(),
        o.total_impressions,
        o.total_clicks,
        o.total_conversions,
        result.anomalies.len(),
    );

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path, None)?;
    eprintln!(
        "ok: report '{}' {} to {} (threshold {:.2})",
        config.report.client_name,
        config.report.week_start,
        config.report.week_end,
        config.anomaly.drop_threshold,
    );
    Ok(())
}

pub fn cmd_anomalies(config_path: PathBuf, threshold: Option<f64>) -> Result<(), CliError> {
    let config = load_config(&config_path, threshold)?;
    let input = load_input(&config, base_dir(&config_path)).map_err(engine_err)?;
    let result = insight_recon::run(&config, &input).map_err(engine_err)?;

    if result.anomalies.is_empty() {
        eprintln!("no anomalies at threshold {:.2}", config.anomaly.drop_threshold);
    }
    for finding in &result.anomalies {
        println!("{finding}");
    }
    Ok(())
}
