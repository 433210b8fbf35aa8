use thiserror::Error;

#[derive(Debug, Error)]
pub enum InsightError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (bad threshold, empty path, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Malformed CSV input.
    #[error("dataset '{dataset}': {message}")]
    Csv { dataset: String, message: String },
    /// Date cell that cannot be normalized to a calendar date.
    #[error("dataset '{dataset}', row {row}: cannot parse date '{value}'")]
    DateParse { dataset: String, row: usize, value: String },
    /// Cell whose value does not fit the column's declared type.
    #[error("dataset '{dataset}', row {row}: column '{column}' expects {expected}, found '{value}'")]
    TypeMismatch {
        dataset: String,
        row: usize,
        column: String,
        expected: &'static str,
        value: String,
    },
    /// IO error (file read, etc.).
    #[error("IO error: {0}")]
    Io(String),
}

impl InsightError {
    /// True for errors caused by the content of an input dataset.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::Csv { .. } | Self::DateParse { .. } | Self::TypeMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_parse_message_names_dataset_and_row() {
        let err = InsightError::DateParse {
            dataset: "traffic".into(),
            row: 3,
            value: "yesterday".into(),
        };
        assert_eq!(
            err.to_string(),
            "dataset 'traffic', row 3: cannot parse date 'yesterday'"
        );
        assert!(err.is_data_error());
    }

    #[test]
    fn config_errors_are_not_data_errors() {
        assert!(!InsightError::ConfigValidation("x".into()).is_data_error());
        assert!(!InsightError::Io("x".into()).is_data_error());
    }
}
