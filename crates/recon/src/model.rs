use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Unified dataset
// ---------------------------------------------------------------------------

/// Columns of the unified dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnifiedColumn {
    Date,
    CampaignId,
    Location,
    Impressions,
    Clicks,
    Conversions,
    Spend,
    TemperatureC,
    RainfallMm,
    Ctr,
    Cpc,
    ConversionRate,
    Cpa,
}

impl UnifiedColumn {
    pub const ALL: [UnifiedColumn; 13] = [
        Self::Date,
        Self::CampaignId,
        Self::Location,
        Self::Impressions,
        Self::Clicks,
        Self::Conversions,
        Self::Spend,
        Self::TemperatureC,
        Self::RainfallMm,
        Self::Ctr,
        Self::Cpc,
        Self::ConversionRate,
        Self::Cpa,
    ];
}

/// One reconciled row at grain (date, campaign_id, location).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedRecord {
    pub date: Option<NaiveDate>,
    pub campaign_id: Option<String>,
    pub location: Option<String>,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
    pub conversions: Option<i64>,
    pub spend: Option<f64>,
    pub temperature_c: Option<f64>,
    pub rainfall_mm: Option<f64>,
    pub ctr: Option<f64>,
    pub cpc: Option<f64>,
    pub conversion_rate: Option<f64>,
    pub cpa: Option<f64>,
}

/// Reconciled records, ordered by (date, campaign_id, location), plus the
/// set of columns actually backed by input data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedDataset {
    pub columns: BTreeSet<UnifiedColumn>,
    /// Expected input columns that were absent, keyed by dataset name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub missing_columns: BTreeMap<String, Vec<String>>,
    pub records: Vec<UnifiedRecord>,
}

impl UnifiedDataset {
    /// Dataset over already-reconciled records with every column present.
    pub fn from_records(records: Vec<UnifiedRecord>) -> Self {
        Self {
            columns: UnifiedColumn::ALL.into_iter().collect(),
            missing_columns: BTreeMap::new(),
            records,
        }
    }

    pub fn has(&self, column: UnifiedColumn) -> bool {
        self.columns.contains(&column)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Totals across the whole unified dataset.
///
/// Ratios are 0.0 (never null) when their denominator total is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallSummary {
    pub total_impressions: i64,
    pub total_clicks: i64,
    pub total_conversions: i64,
    pub total_spend: f64,
    pub overall_ctr: f64,
    pub overall_cpc: f64,
    pub overall_cvr: f64,
    pub overall_cpa: f64,
}

/// Per-campaign totals. Ratios are null when their denominator is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignSummary {
    pub campaign_id: Option<String>,
    pub impressions: i64,
    pub clicks: i64,
    pub conversions: i64,
    pub spend: f64,
    pub ctr: Option<f64>,
    pub cpc: Option<f64>,
    pub cvr: Option<f64>,
    pub cpa: Option<f64>,
}

impl CampaignSummary {
    /// Campaign id for display; rows without one are grouped as "unassigned".
    pub fn label(&self) -> &str {
        self.campaign_id.as_deref().unwrap_or("unassigned")
    }
}

// ---------------------------------------------------------------------------
// Anomalies
// ---------------------------------------------------------------------------

/// A day-over-day impression drop for one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyFinding {
    pub location: String,
    pub date: NaiveDate,
    pub drop_pct: f64,
    pub impressions_current: i64,
    pub impressions_previous: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rainfall_mm: Option<f64>,
}

// ---------------------------------------------------------------------------
// Report digest
// ---------------------------------------------------------------------------

/// Plain-text talking points derived from the summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDigest {
    pub key_highlights: Vec<String>,
    pub top_wins: Vec<String>,
    pub key_concerns: Vec<String>,
    pub recommendations: Vec<String>,
    pub campaign_insights: String,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct InsightMeta {
    pub client_name: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub engine_version: String,
    pub drop_threshold: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightResult {
    pub meta: InsightMeta,
    pub overall: OverallSummary,
    pub campaigns: Vec<CampaignSummary>,
    pub anomalies: Vec<AnomalyFinding>,
    pub digest: ReportDigest,
    /// First rows of the optional pass-through dataset, untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_preview: Option<Vec<serde_json::Map<String, serde_json::Value>>>,
    pub unified: UnifiedDataset,
}
