//! Error types for the directory analyzer.

use thiserror::Error;

/// Result type alias using [`AnalyzerError`].
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Every way a run can fail. A run aborts on the first one.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// A landing page could not be parsed as an absolute URL.
    #[error("cannot parse URL '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// A required column is missing after header normalization.
    #[error("missing required column '{column}' (found headers: {found:?})")]
    Schema { column: String, found: Vec<String> },

    /// Clicks or impressions held something other than a non-negative integer.
    #[error("row {row}: column '{column}' has non-numeric value '{value}'")]
    TypeCoercion {
        row: usize,
        column: String,
        value: String,
    },

    /// A sum over a numeric column does not fit in 64 bits.
    #[error("sum of column '{column}' overflows")]
    Overflow { column: String },

    /// Nothing left to aggregate after the join.
    #[error("no rows to analyze after joining URLs with metrics")]
    EmptyInput,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalyzerError {
    pub fn parse(input: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            input: input.into(),
            reason: reason.to_string(),
        }
    }

    /// Short stable name of the error kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse_error",
            Self::Schema { .. } => "schema_error",
            Self::TypeCoercion { .. } => "type_coercion_error",
            Self::Overflow { .. } => "overflow_error",
            Self::EmptyInput => "empty_input_error",
            Self::Csv(_) => "csv_error",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }
}
