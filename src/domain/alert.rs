//! Price alerts.
//!
//! An alert fires at most once: the Active -> Triggered transition is
//! terminal and never reverts, even if the price re-crosses the threshold.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Direction of a price-threshold crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCondition {
    /// Fires when the current percentage exceeds the threshold.
    Above,
    /// Fires when the current percentage is below the threshold.
    Below,
}

impl AlertCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Above => ">",
            Self::Below => "<",
        }
    }

    /// Whether the condition holds for `current` (a 0-100 percentage).
    pub fn is_met(self, current: f64, threshold: f64) -> bool {
        match self {
            Self::Above => current > threshold,
            Self::Below => current < threshold,
        }
    }
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(Self::Above),
            "<" => Ok(Self::Below),
            other => Err(format!("invalid condition `{other}` (use > or <)")),
        }
    }
}

/// A persisted price alert.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceAlert {
    pub id: i64,
    pub event_slug: String,
    pub condition: AlertCondition,
    /// Threshold percentage in [0, 100].
    pub threshold: f64,
    pub outcome_index: usize,
    pub is_triggered: bool,
    pub created_at: DateTime<Utc>,
    pub triggered_at: Option<DateTime<Utc>>,
}

/// Parameters for creating a new alert.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub event_slug: String,
    pub condition: AlertCondition,
    pub threshold: f64,
    pub outcome_index: usize,
}
