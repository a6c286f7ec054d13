use serde::Serialize;

/// Position of a directory's CTR relative to the average CTR of its level.
///
/// | CTR vs. average | Highlight |
/// |-----------------|-----------|
/// | greater         | Above     |
/// | equal           | Average   |
/// | less            | Below     |
/// | either missing  | none      |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CtrHighlight {
    Above,
    Average,
    Below,
}

impl CtrHighlight {
    pub fn classify(ctr: Option<f64>, average: Option<f64>) -> Option<Self> {
        let (ctr, average) = (ctr?, average?);
        if ctr.is_nan() || average.is_nan() {
            return None;
        }
        Some(match ctr {
            c if c > average => Self::Above,
            c if c < average => Self::Below,
            _ => Self::Average,
        })
    }
}
