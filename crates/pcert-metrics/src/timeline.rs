//! # Rolling Timeline Averages
//!
//! `{count, total, average}` tuples updated incrementally — a simple
//! arithmetic mean over everything observed, not a windowed or percentile
//! statistic.

use serde::{Deserialize, Serialize};

/// An incrementally maintained arithmetic mean.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingAverage {
    /// Number of observations.
    pub count: u64,
    /// Sum of all observations.
    pub total: f64,
    /// `total / count`, or 0 when empty.
    pub average: f64,
}

impl RollingAverage {
    /// Fold one observation into the mean.
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.total += value;
        self.average = self.total / self.count as f64;
    }
}
