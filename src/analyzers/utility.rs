use crate::error::{AnalyzerError, Result};

/// Adds `values`, failing with [`AnalyzerError::Overflow`] naming `column`
/// instead of wrapping.
pub fn checked_sum(values: impl IntoIterator<Item = u64>, column: &str) -> Result<u64> {
    values
        .into_iter()
        .try_fold(0u64, |acc, v| acc.checked_add(v))
        .ok_or_else(|| overflow(column))
}

/// Overflow error for `column`.
pub fn overflow(column: &str) -> AnalyzerError {
    AnalyzerError::Overflow {
        column: column.to_string(),
    }
}

/// Rounds to `decimals` places, ties to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// `part / total`, or `None` when `total` is zero.
pub fn ratio(part: u64, total: u64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(part as f64 / total as f64)
    }
}
