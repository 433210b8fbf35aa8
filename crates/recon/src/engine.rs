use std::path::Path;

use crate::anomaly::scan;
use crate::config::ReportConfig;
use crate::digest::build_digest;
use crate::error::InsightError;
use crate::model::{InsightMeta, InsightResult};
use crate::reconcile::reconcile;
use crate::schema::{ClickFrame, TrafficFrame, WeatherFrame};
use crate::summary::summarize;
use crate::table::Table;

/// Rows of the pass-through dataset carried on the result.
pub const EXTRA_PREVIEW_ROWS: usize = 5;

/// Pre-loaded input tables.
pub struct InsightInput {
    pub traffic: Table,
    pub clicks: Table,
    pub weather: Table,
    pub extra: Option<Table>,
}

/// Run the whole pipeline: schema validation, reconciliation, summaries,
/// anomaly scan and digest.
pub fn run(config: &ReportConfig, input: &InsightInput) -> Result<InsightResult, InsightError> {
    let traffic = TrafficFrame::from_table(&input.traffic)?;
    let clicks = ClickFrame::from_table(&input.clicks)?;
    let weather = WeatherFrame::from_table(&input.weather)?;

    let unified = reconcile(&traffic, &clicks, &weather);
    let (overall, campaigns) = summarize(&unified);
    let anomalies = scan(&unified, config.anomaly.drop_threshold);
    let digest = build_digest(&overall, &campaigns);

    tracing::info!(
        rows = unified.len(),
        campaigns = campaigns.len(),
        anomalies = anomalies.len(),
        "processing complete"
    );

    Ok(InsightResult {
        meta: InsightMeta {
            client_name: config.report.client_name.clone(),
            week_start: config.report.week_start,
            week_end: config.report.week_end,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            drop_threshold: config.anomaly.drop_threshold,
        },
        overall,
        campaigns,
        anomalies,
        digest,
        extra_preview: input.extra.as_ref().map(|t| t.head(EXTRA_PREVIEW_ROWS)),
        unified,
    })
}

/// Read every configured CSV, resolving relative paths against `base_dir`.
pub fn load_input(config: &ReportConfig, base_dir: &Path) -> Result<InsightInput, InsightError> {
    let ds = &config.data_sources;
    let load = |name: &str, file: &str| -> Result<Table, InsightError> {
        let path = base_dir.join(file);
        let data = std::fs::read_to_string(&path)
            .map_err(|e| InsightError::Io(format!("cannot read {}: {e}", path.display())))?;
        Table::from_csv(name, &data)
    };

    let input = InsightInput {
        traffic: load("traffic", &ds.traffic_csv)?,
        clicks: load("clicks", &ds.clicks_csv)?,
        weather: load("weather", &ds.weather_csv)?,
        extra: ds.extra_csv.as_deref().map(|f| load("extra", f)).transpose()?,
    };

    tracing::info!(
        traffic = input.traffic.len(),
        clicks = input.clicks.len(),
        weather = input.weather.len(),
        extra = input.extra.as_ref().map(Table::len),
        "ingestion complete"
    );

    Ok(input)
}
