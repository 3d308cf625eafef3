//! Visual indicator for interest coverage.

use std::fmt;

use crate::metrics::CreditMetric;

/// Health bucket of an interest coverage ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoverageLabel {
    /// Coverage of 6x or more.
    Healthy,
    /// Coverage of at least 3x.
    Adequate,
    /// Coverage of at least 1.5x.
    Weak,
    /// Anything below 1.5x.
    Critical,
}

impl CoverageLabel {
    /// Buckets a coverage ratio.
    #[must_use]
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 6.0 {
            Self::Healthy
        } else if ratio >= 3.0 {
            Self::Adequate
        } else if ratio >= 1.5 {
            Self::Weak
        } else {
            Self::Critical
        }
    }

    /// Buckets a metric; unavailable metrics get no label.
    #[must_use]
    pub fn for_metric(metric: CreditMetric) -> Option<Self> {
        metric.value().map(Self::from_ratio)
    }

    /// Traffic-light marker used in chat reports.
    #[must_use]
    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::Healthy => "🟢",
            Self::Adequate => "🟡",
            Self::Weak => "🟠",
            Self::Critical => "🔴",
        }
    }

    /// Lowercase name of the bucket.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Adequate => "adequate",
            Self::Weak => "weak",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for CoverageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(CoverageLabel::from_ratio(6.0), CoverageLabel::Healthy);
        assert_eq!(CoverageLabel::from_ratio(5.99), CoverageLabel::Adequate);
        assert_eq!(CoverageLabel::from_ratio(3.0), CoverageLabel::Adequate);
        assert_eq!(CoverageLabel::from_ratio(1.5), CoverageLabel::Weak);
        assert_eq!(CoverageLabel::from_ratio(1.49), CoverageLabel::Critical);
        assert_eq!(CoverageLabel::from_ratio(-2.0), CoverageLabel::Critical);
    }

    #[test]
    fn test_only_definite_metrics_are_labeled() {
        assert_eq!(
            CoverageLabel::for_metric(CreditMetric::Value(4.0)),
            Some(CoverageLabel::Adequate)
        );
        assert_eq!(CoverageLabel::for_metric(CreditMetric::Unavailable), None);
        assert_eq!(CoverageLabel::Healthy.emoji(), "🟢");
        assert_eq!(CoverageLabel::Weak.to_string(), "weak");
    }
}
