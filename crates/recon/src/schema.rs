//! Typed schema boundary.
//!
//! Each input table is validated once against a closed set of named columns
//! and converted into a typed frame. Absent columns become an explicit absent
//! state (`None` fields plus the frame's `missing` list) instead of runtime
//! name lookups further down the pipeline.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::InsightError;
use crate::table::{Table, Value};

/// Date layouts accepted for `date` columns, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// A typed record with a fixed column set.
pub trait Record: Sized {
    /// Dataset name used in logs and errors.
    const DATASET: &'static str;
    /// Columns the dataset is expected to carry.
    const COLUMNS: &'static [&'static str];

    /// Build the record at zero-based `row`.
    fn from_row(cells: &Cells<'_>, row: usize) -> Result<Self, InsightError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrafficRecord {
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub campaign_id: Option<String>,
    pub impressions: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClickRecord {
    pub date: Option<NaiveDate>,
    pub campaign_id: Option<String>,
    pub clicks: Option<i64>,
    pub conversions: Option<i64>,
    pub spend: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub temperature_c: Option<f64>,
    pub rainfall_mm: Option<f64>,
}

impl Record for TrafficRecord {
    const DATASET: &'static str = "traffic";
    const COLUMNS: &'static [&'static str] = &["date", "location", "campaign_id", "impressions"];

    fn from_row(cells: &Cells<'_>, row: usize) -> Result<Self, InsightError> {
        Ok(Self {
            date: cells.date(row, "date")?,
            location: cells.text(row, "location"),
            campaign_id: cells.text(row, "campaign_id"),
            impressions: cells.int(row, "impressions")?,
        })
    }
}

impl Record for ClickRecord {
    const DATASET: &'static str = "clicks";
    const COLUMNS: &'static [&'static str] = &["date", "campaign_id", "clicks", "conversions", "spend"];

    fn from_row(cells: &Cells<'_>, row: usize) -> Result<Self, InsightError> {
        Ok(Self {
            date: cells.date(row, "date")?,
            campaign_id: cells.text(row, "campaign_id"),
            clicks: cells.int(row, "clicks")?,
            conversions: cells.int(row, "conversions")?,
            spend: cells.float(row, "spend")?,
        })
    }
}

impl Record for WeatherRecord {
    const DATASET: &'static str = "weather";
    const COLUMNS: &'static [&'static str] = &["date", "location", "temperature_c", "rainfall_mm"];

    fn from_row(cells: &Cells<'_>, row: usize) -> Result<Self, InsightError> {
        Ok(Self {
            date: cells.date(row, "date")?,
            location: cells.text(row, "location"),
            temperature_c: cells.float(row, "temperature_c")?,
            rainfall_mm: cells.float(row, "rainfall_mm")?,
        })
    }
}

/// Typed records of one dataset plus the expected columns it lacked.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<R> {
    pub missing: Vec<&'static str>,
    pub records: Vec<R>,
}

pub type TrafficFrame = Frame<TrafficRecord>;
pub type ClickFrame = Frame<ClickRecord>;
pub type WeatherFrame = Frame<WeatherRecord>;

impl<R: Record> Frame<R> {
    /// Frame over already-typed records; every column counts as present.
    pub fn from_records(records: Vec<R>) -> Self {
        Self {
            missing: Vec::new(),
            records,
        }
    }

    /// Validate `table` against `R::COLUMNS` and convert every row.
    ///
    /// Missing columns are recorded, not fatal. Unparseable dates and type
    /// mismatches abort with an error naming the row.
    pub fn from_table(table: &Table) -> Result<Self, InsightError> {
        let cells = Cells::new(R::DATASET, table);
        let missing: Vec<&'static str> = R::COLUMNS
            .iter()
            .copied()
            .filter(|c| !table.has_column(c))
            .collect();

        let records = (0..table.len())
            .map(|row| R::from_row(&cells, row))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            dataset = R::DATASET,
            rows = records.len(),
            missing = missing.len(),
            "validated dataset"
        );

        Ok(Self { missing, records })
    }

    pub fn dataset(&self) -> &'static str {
        R::DATASET
    }

    pub fn has(&self, column: &str) -> bool {
        R::COLUMNS.contains(&column) && !self.missing.contains(&column)
    }
}

/// Column-name lookups over one table, resolved once.
pub struct Cells<'a> {
    dataset: &'static str,
    table: &'a Table,
}

impl<'a> Cells<'a> {
    fn new(dataset: &'static str, table: &'a Table) -> Self {
        Self { dataset, table }
    }

    fn cell(&self, row: usize, column: &str) -> Option<&'a Value> {
        let idx = self.table.column_index(column)?;
        self.table.rows.get(row).and_then(|r| r.get(idx))
    }

    fn mismatch(&self, row: usize, column: &str, expected: &'static str, value: &Value) -> InsightError {
        InsightError::TypeMismatch {
            dataset: self.dataset.to_string(),
            row: row + 1,
            column: column.to_string(),
            expected,
            value: value.display(),
        }
    }

    /// A present `date` column must hold a parseable date in every row.
    pub fn date(&self, row: usize, column: &str) -> Result<Option<NaiveDate>, InsightError> {
        let Some(value) = self.cell(row, column) else {
            return Ok(None);
        };
        let parsed = match value {
            Value::Date(d) => Some(*d),
            Value::Str(s) => parse_date(s),
            _ => None,
        };
        parsed.map(Some).ok_or_else(|| InsightError::DateParse {
            dataset: self.dataset.to_string(),
            row: row + 1,
            value: value.display(),
        })
    }

    /// Key columns are text: numeric-looking cells keep their source form.
    pub fn text(&self, row: usize, column: &str) -> Option<String> {
        let idx = self.table.column_index(column)?;
        match self.table.rows.get(row)?.get(idx)? {
            Value::Null => None,
            Value::Str(s) => Some(s.clone()),
            other => Some(
                self.table
                    .source_text(row, idx)
                    .map_or_else(|| other.display(), str::to_string),
            ),
        }
    }

    pub fn int(&self, row: usize, column: &str) -> Result<Option<i64>, InsightError> {
        let Some(value) = self.cell(row, column) else {
            return Ok(None);
        };
        match value {
            Value::Null => Ok(None),
            Value::Int(i) => Ok(Some(*i)),
            Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(*f as i64)),
            Value::Str(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| self.mismatch(row, column, "an integer", value)),
            _ => Err(self.mismatch(row, column, "an integer", value)),
        }
    }

    pub fn float(&self, row: usize, column: &str) -> Result<Option<f64>, InsightError> {
        let Some(value) = self.cell(row, column) else {
            return Ok(None);
        };
        match value {
            Value::Null => Ok(None),
            Value::Int(i) => Ok(Some(*i as f64)),
            Value::Float(f) => Ok(Some(*f)),
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Some)
                .ok_or_else(|| self.mismatch(row, column, "a number", value)),
            Value::Date(_) => Err(self.mismatch(row, column, "a number", value)),
        }
    }
}

/// Normalize a date or timestamp string to a calendar date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}
