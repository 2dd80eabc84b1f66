use serde::{Serialize, Serializer};
use std::fmt;

/// Value written into reports for a day without any scored content. Day scores
/// are means of item scores in `0..=100`, so it never collides with a real one.
pub const NO_DATA_SENTINEL: f64 = -1.0;

/// Sentiment of one day bucket.
///
/// `NoData` means the day had no scorable content, which is different from a
/// computed neutral score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DaySentiment {
    Score(f64),
    NoData,
}

impl DaySentiment {
    pub fn score(&self) -> Option<f64> {
        match self {
            Self::Score(v) => Some(*v),
            Self::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }

    /// Flattens to the number the report consumers expect.
    pub fn report_value(&self) -> f64 {
        self.score().unwrap_or(NO_DATA_SENTINEL)
    }
}

impl From<Option<f64>> for DaySentiment {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Self::Score(v),
            _ => Self::NoData,
        }
    }
}

impl Serialize for DaySentiment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.report_value())
    }
}

impl fmt::Display for DaySentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Score(v) => write!(f, "{v:.2}"),
            Self::NoData => write!(f, "no data"),
        }
    }
}
