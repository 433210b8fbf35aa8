//! Typed tabular dataset: ordered rows of named, homogeneously typed columns.
//!
//! This is the shape every input arrives in before the schema boundary turns
//! it into typed frames. Column types are inferred once at load time so that
//! a column is either all-integer, all-float or all-string (plus nulls).
//! The source text of every cell is kept alongside, so identifiers that
//! happen to look numeric (`007`) survive unchanged as text.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::InsightError;

/// Cell text treated as a missing value.
const NULL_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// A single typed cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Human-readable form used in error messages.
    pub fn display(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Date(d) => d.to_string(),
            Self::Null => String::new(),
        }
    }
}

pub type Row = Vec<Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnType {
    Int,
    Float,
    Str,
}

/// A named table. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Cell text as read, parallel to `rows`.
    source: Vec<Vec<String>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
            source: Vec::new(),
        }
    }

    /// Append a row, padding with nulls or truncating to the column count.
    pub fn push_row(&mut self, mut row: Row) {
        row.resize(self.columns.len(), Value::Null);
        self.source.push(row.iter().map(Value::display).collect());
        self.rows.push(row);
    }

    pub fn with_row(mut self, row: Row) -> Self {
        self.push_row(row);
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Text of a cell as it appeared in the input.
    pub fn source_text(&self, row: usize, col: usize) -> Option<&str> {
        self.source.get(row)?.get(col).map(String::as_str)
    }

    /// Parse headered CSV text, inferring one scalar type per column.
    pub fn from_csv(name: &str, data: &str) -> Result<Self, InsightError> {
        let csv_err = |e: csv::Error| InsightError::Csv {
            dataset: name.to_string(),
            message: e.to_string(),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes());

        let columns: Vec<String> = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut raw: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            raw.push(
                (0..columns.len())
                    .map(|i| record.get(i).unwrap_or("").to_string())
                    .collect(),
            );
        }

        let types: Vec<ColumnType> = (0..columns.len())
            .map(|i| infer_column_type(raw.iter().map(|r| r[i].as_str())))
            .collect();

        let rows = raw
            .iter()
            .map(|cells| {
                cells
                    .iter()
                    .zip(&types)
                    .map(|(cell, ty)| typed_cell(cell, *ty))
                    .collect()
            })
            .collect::<Vec<Row>>();

        tracing::info!(dataset = name, rows = rows.len(), columns = columns.len(), "loaded table");

        Ok(Self {
            name: name.to_string(),
            columns,
            rows,
            source: raw,
        })
    }

    /// First `n` rows as ordered JSON objects.
    pub fn head(&self, n: usize) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .take(n)
            .enumerate()
            .map(|(r, row)| {
                self.columns
                    .iter()
                    .zip(row)
                    .enumerate()
                    .map(|(c, (col, value))| {
                        let json = match (value, self.source_text(r, c)) {
                            // Integers whose text is not canonical ("007", "+5") stay text.
                            (Value::Int(i), Some(text)) if text != i.to_string() => {
                                serde_json::Value::String(text.to_string())
                            }
                            _ => serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
                        };
                        (col.clone(), json)
                    })
                    .collect()
            })
            .collect()
    }
}

fn is_null_marker(cell: &str) -> bool {
    NULL_MARKERS.contains(&cell)
}

fn parse_finite(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn infer_column_type<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut ty = ColumnType::Int;
    for cell in cells.filter(|c| !is_null_marker(c)) {
        if cell.parse::<i64>().is_ok() {
            continue;
        }
        if parse_finite(cell).is_some() {
            ty = ColumnType::Float;
            continue;
        }
        return ColumnType::Str;
    }
    ty
}

fn typed_cell(cell: &str, ty: ColumnType) -> Value {
    if is_null_marker(cell) {
        return Value::Null;
    }
    match ty {
        ColumnType::Int => cell.parse().map(Value::Int).unwrap_or(Value::Null),
        ColumnType::Float => parse_finite(cell).map(Value::Float).unwrap_or(Value::Null),
        ColumnType::Str => Value::Str(cell.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_column_types() {
        let csv = "\
date,campaign_id,impressions,spend
2025-01-04,CAMP01,1000,100.5
2025-01-05,CAMP01,600,60
";
        let table = Table::from_csv("t", csv).unwrap();
        assert_eq!(table.columns, vec!["date", "campaign_id", "impressions", "spend"]);
        assert_eq!(table.rows[0][0], Value::Str("2025-01-04".into()));
        assert_eq!(table.rows[0][2], Value::Int(1000));
        // Mixed int/float column is promoted to float.
        assert_eq!(table.rows[1][3], Value::Float(60.0));
    }

    #[test]
    fn empty_and_marker_cells_are_null() {
        let csv = "\
a,b
1,
NaN,x
";
        let table = Table::from_csv("t", csv).unwrap();
        assert_eq!(table.rows[0][1], Value::Null);
        assert_eq!(table.rows[1][0], Value::Null);
        assert_eq!(table.rows[1][1], Value::Str("x".into()));
    }

    #[test]
    fn string_wins_over_numbers() {
        let csv = "\
id
7
CAMP02
";
        let table = Table::from_csv("t", csv).unwrap();
        assert_eq!(table.rows[0][0], Value::Str("7".into()));
    }

    #[test]
    fn numeric_looking_text_keeps_its_source() {
        let csv = "\
campaign_id,amount
007,1.50
42,2
";
        let table = Table::from_csv("t", csv).unwrap();
        assert_eq!(table.rows[0][0], Value::Int(7));
        assert_eq!(table.source_text(0, 0), Some("007"));
        assert_eq!(table.source_text(0, 1), Some("1.50"));

        let preview = table.head(2);
        assert_eq!(preview[0]["campaign_id"], serde_json::json!("007"));
        assert_eq!(preview[1]["campaign_id"], serde_json::json!(42));
        assert_eq!(preview[0]["amount"], serde_json::json!(1.5));
    }

    #[test]
    fn short_rows_are_padded() {
        let mut table = Table::new("t", &["a", "b"]);
        table.push_row(vec![Value::Int(1)]);
        assert_eq!(table.rows[0], vec![Value::Int(1), Value::Null]);
        assert_eq!(table.source_text(0, 0), Some("1"));
        assert_eq!(table.source_text(0, 1), Some(""));
    }

    #[test]
    fn head_preserves_column_order() {
        let table = Table::new("orders", &["order_id", "amount", "note"])
            .with_row(vec![Value::Int(1), Value::Float(9.5), Value::Null])
            .with_row(vec![Value::Int(2), Value::Float(3.0), Value::Str("gift".into())]);
        let preview = table.head(1);
        assert_eq!(preview.len(), 1);
        let keys: Vec<&String> = preview[0].keys().collect();
        assert_eq!(keys, vec!["order_id", "amount", "note"]);
        assert_eq!(preview[0]["amount"], serde_json::json!(9.5));
        assert_eq!(preview[0]["note"], serde_json::Value::Null);
    }
}
