//! Number formatting for chat reports. Missing values print as `N/A`.

/// Placeholder for a value that could not be computed.
pub const NOT_AVAILABLE: &str = "N/A";

/// Fixed-point number with a suffix, or `N/A` (without the suffix).
#[must_use]
pub fn fmt_num(value: Option<f64>, decimals: usize, suffix: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}{suffix}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Percentage such as `4.20%`.
#[must_use]
pub fn fmt_pct(value: Option<f64>, decimals: usize) -> String {
    fmt_num(value, decimals, "%")
}

/// Signed percentage such as `+5.2%`.
#[must_use]
pub fn fmt_signed_pct(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:+.decimals$}%"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// `(curr - prev) / prev` in percent; `None` when `prev` is zero.
#[must_use]
pub fn pct_change(curr: f64, prev: f64) -> Option<f64> {
    if prev == 0.0 {
        None
    } else {
        Some((curr - prev) / prev * 100.0)
    }
}

/// Change of a yield quoted in percent, in basis points.
#[must_use]
pub fn bp_change(curr: f64, prev: f64) -> f64 {
    (curr - prev) * 100.0
}
