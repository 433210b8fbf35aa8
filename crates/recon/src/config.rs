use chrono::NaiveDate;
use serde::Deserialize;

use crate::anomaly::DEFAULT_DROP_THRESHOLD;
use crate::error::InsightError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub report: ReportSection,
    pub data_sources: DataSources,
    #[serde(default)]
    pub anomaly: AnomalyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportSection {
    pub client_name: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<OutputFormat>,
}

fn default_output_dir() -> String {
    "out".into()
}

fn default_output_formats() -> Vec<OutputFormat> {
    vec![OutputFormat::Json]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "txt",
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// CSV paths, relative to the config file's directory unless absolute.
#[derive(Debug, Clone, Deserialize)]
pub struct DataSources {
    pub traffic_csv: String,
    pub clicks_csv: String,
    pub weather_csv: String,
    /// Optional pass-through dataset, previewed but never processed.
    #[serde(default)]
    pub extra_csv: Option<String>,
}

// ---------------------------------------------------------------------------
// Anomaly scan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AnomalyConfig {
    #[serde(default = "default_drop_threshold")]
    pub drop_threshold: f64,
}

fn default_drop_threshold() -> f64 {
    DEFAULT_DROP_THRESHOLD
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            drop_threshold: DEFAULT_DROP_THRESHOLD,
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing + validation
// ---------------------------------------------------------------------------

impl ReportConfig {
    pub fn from_toml(s: &str) -> Result<Self, InsightError> {
        let config: Self = toml::from_str(s).map_err(|e| InsightError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), InsightError> {
        let r = &self.report;
        if r.client_name.trim().is_empty() {
            return Err(InsightError::ConfigValidation("report.client_name is empty".into()));
        }
        if r.week_start > r.week_end {
            return Err(InsightError::ConfigValidation(format!(
                "report.week_start ({}) is after report.week_end ({})",
                r.week_start, r.week_end
            )));
        }
        if r.output_formats.is_empty() {
            return Err(InsightError::ConfigValidation(
                "report.output_formats must list at least one format".into(),
            ));
        }
        check_threshold(self.anomaly.drop_threshold)?;

        let ds = &self.data_sources;
        let paths = [
            ("traffic_csv", Some(&ds.traffic_csv)),
            ("clicks_csv", Some(&ds.clicks_csv)),
            ("weather_csv", Some(&ds.weather_csv)),
            ("extra_csv", ds.extra_csv.as_ref()),
        ];
        for (key, path) in paths {
            if path.is_some_and(|p| p.trim().is_empty()) {
                return Err(InsightError::ConfigValidation(format!(
                    "data_sources.{key} is empty"
                )));
            }
        }
        Ok(())
    }

    /// `<client_name>_<week_start>_to_<week_end>` with spaces as underscores.
    pub fn base_filename(&self) -> String {
        format!(
            "{}_{}_to_{}",
            self.report.client_name.replace(' ', "_"),
            self.report.week_start,
            self.report.week_end
        )
    }
}

/// Drop thresholds are fractions in (0, 1].
pub fn check_threshold(threshold: f64) -> Result<(), InsightError> {
    if threshold.is_finite() && threshold > 0.0 && threshold <= 1.0 {
        Ok(())
    } else {
        Err(InsightError::ConfigValidation(format!(
            "anomaly.drop_threshold must be in (0, 1], got {threshold}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[report]
client_name = "Acme Retail"
week_start = "2025-01-01"
week_end = "2025-01-07"

[data_sources]
traffic_csv = "traffic.csv"
clicks_csv = "clicks.csv"
weather_csv = "weather.csv"
"#;

    #[test]
    fn parses_with_defaults() {
        let config = ReportConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.report.output_dir, "out");
        assert_eq!(config.report.output_formats, vec![OutputFormat::Json]);
        assert_eq!(config.anomaly.drop_threshold, 0.30);
        assert!(config.data_sources.extra_csv.is_none());
        assert_eq!(config.base_filename(), "Acme_Retail_2025-01-01_to_2025-01-07");
    }

    #[test]
    fn parses_full_config() {
        let toml = format!(
            "{MINIMAL}extra_csv = \"orders.csv\"\n\n[anomaly]\ndrop_threshold = 0.5\n"
        );
        let config = ReportConfig::from_toml(&toml).unwrap();
        assert_eq!(config.data_sources.extra_csv.as_deref(), Some("orders.csv"));
        assert_eq!(config.anomaly.drop_threshold, 0.5);
    }

    #[test]
    fn rejects_inverted_week() {
        let toml = MINIMAL.replace("2025-01-07", "2024-12-31");
        let err = ReportConfig::from_toml(&toml).unwrap_err();
        assert!(matches!(err, InsightError::ConfigValidation(_)));
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        for bad in ["0.0", "1.5", "-0.3"] {
            let toml = format!("{MINIMAL}\n[anomaly]\ndrop_threshold = {bad}\n");
            assert!(ReportConfig::from_toml(&toml).is_err(), "threshold {bad} accepted");
        }
    }

    #[test]
    fn rejects_unknown_output_format() {
        let toml = MINIMAL.replace(
            "week_end = \"2025-01-07\"",
            "week_end = \"2025-01-07\"\noutput_formats = [\"pdf\"]",
        );
        let err = ReportConfig::from_toml(&toml).unwrap_err();
        assert!(matches!(err, InsightError::ConfigParse(_)));
    }

    #[test]
    fn rejects_empty_path() {
        let toml = MINIMAL.replace("\"clicks.csv\"", "\"  \"");
        let err = ReportConfig::from_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("data_sources.clicks_csv"));
    }
}
