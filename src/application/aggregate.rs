use crate::domain::values::day_sentiment::DaySentiment;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// How item scores of one day collapse into a single value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregatePolicy {
    #[default]
    Mean,
    Median,
}

impl AggregatePolicy {
    /// Non-finite scores are ignored. No remaining scores gives `NoData`.
    pub fn aggregate(&self, scores: &[f64]) -> DaySentiment {
        let mut values: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
        if values.is_empty() {
            return DaySentiment::NoData;
        }
        let value = match self {
            Self::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Self::Median => {
                values.sort_by(f64::total_cmp);
                let mid = values.len() / 2;
                if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) / 2.0
                } else {
                    values[mid]
                }
            }
        };
        DaySentiment::Score(value)
    }
}

impl fmt::Display for AggregatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mean => write!(f, "mean"),
            Self::Median => write!(f, "median"),
        }
    }
}

impl FromStr for AggregatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" | "avg" | "average" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            _ => Err(format!("Unknown aggregate policy: {s}")),
        }
    }
}
