//! Data frequency and period type definitions.
//!
//! This module defines [`DataFrequency`] for the granularity of price history
//! requests and [`PeriodType`] for financial statement periods.

use serde::{Deserialize, Serialize};

/// Frequency/granularity of price history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataFrequency {
    /// Hourly bars.
    Hourly,
    /// Daily bars.
    Daily,
    /// Weekly bars.
    Weekly,
    /// Monthly bars.
    Monthly,
}

/// Period type for financial statements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodType {
    /// Annual reporting period.
    Annual,
    /// Quarterly reporting period.
    #[default]
    Quarterly,
}

impl PeriodType {
    /// Number of periods that make up a trailing twelve month window.
    #[must_use]
    pub const fn periods_per_year(&self) -> usize {
        match self {
            Self::Annual => 1,
            Self::Quarterly => 4,
        }
    }
}
