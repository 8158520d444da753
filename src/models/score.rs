use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
    Trader,
    Explorer,
    Optimizer,
    Passive,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Trader => "Trader",
            UserType::Explorer => "Explorer",
            UserType::Optimizer => "Optimizer",
            UserType::Passive => "Passive",
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse confidence in a report, from how many upstream sources were available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    High,
    Medium,
    Low,
}

impl DataQuality {
    pub fn from_ratio(ratio: f64) -> Self {
        match ratio {
            r if r >= 0.8 => DataQuality::High,
            r if r >= 0.4 => DataQuality::Medium,
            _ => DataQuality::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataQuality::High => "high",
            DataQuality::Medium => "medium",
            DataQuality::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub risk_score: f64,
    pub health_score: f64,
    pub user_type: UserType,
    pub data_quality: DataQuality,
    pub analyzed_metrics: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Rounds half away from zero to two decimal places.
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}
