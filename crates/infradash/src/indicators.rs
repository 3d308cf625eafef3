//! Price-based indicators.
//!
//! Every function takes the price frames produced by the providers (a `date`
//! column and a `close` column) and returns `None` when there is not enough
//! data, so the report can print N/A.

use polars::prelude::*;
use tracing::debug;

/// RSI lookback.
pub const RSI_PERIOD: usize = 14;

/// Fewest aligned daily returns accepted for beta and correlation.
pub const MIN_RETURN_OBSERVATIONS: usize = 20;

/// Non-null closes in frame order.
#[must_use]
pub fn closes(df: &DataFrame) -> Vec<f64> {
    df.column("close")
        .ok()
        .and_then(|c| c.f64().ok())
        .map(|ca| ca.into_iter().flatten().collect())
        .unwrap_or_default()
}

/// Most recent non-null close.
#[must_use]
pub fn last_close(df: &DataFrame) -> Option<f64> {
    closes(df).last().copied()
}

/// Last two non-null closes as `(current, previous)`.
#[must_use]
pub fn last_two_closes(df: &DataFrame) -> Option<(f64, f64)> {
    match closes(df).as_slice() {
        [.., prev, curr] => Some((*curr, *prev)),
        _ => None,
    }
}

/// Relative Strength Index with Wilder smoothing.
///
/// The first average gain and loss are simple means over `period` changes;
/// each later change is folded in as `(avg * (period - 1) + x) / period`.
/// Needs at least `period + 1` prices. A series with no losses reads 100.
#[must_use]
pub fn rsi(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period + 1 {
        return None;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for w in prices[..=period].windows(2) {
        let change = w[1] - w[0];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let n = period as f64;
    let mut avg_gain = gains / n;
    let mut avg_loss = losses / n;

    for w in prices[period..].windows(2) {
        let change = w[1] - w[0];
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };
        avg_gain = (avg_gain * (n - 1.0) + gain) / n;
        avg_loss = (avg_loss * (n - 1.0) + loss) / n;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// Beta and correlation of an asset against a benchmark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketSensitivity {
    /// cov(asset, benchmark) / var(benchmark).
    pub beta: f64,
    /// Pearson correlation of daily returns.
    pub correlation: f64,
}

/// Inner-joins two price frames on `date` and returns aligned closes.
///
/// # Errors
/// Propagates polars errors for frames without `date`/`close` columns.
pub fn align_closes(
    asset: &DataFrame,
    benchmark: &DataFrame,
) -> PolarsResult<(Vec<f64>, Vec<f64>)> {
    let left = asset
        .clone()
        .lazy()
        .select([col("date"), col("close").cast(DataType::Float64).alias("asset")]);
    let right = benchmark
        .clone()
        .lazy()
        .select([col("date"), col("close").cast(DataType::Float64).alias("benchmark")]);

    let joined = left
        .join(
            right,
            [col("date")],
            [col("date")],
            JoinArgs::new(JoinType::Inner),
        )
        .filter(col("asset").is_not_null().and(col("benchmark").is_not_null()))
        .sort(["date"], Default::default())
        .collect()?;

    let a = joined.column("asset")?.f64()?.into_no_null_iter().collect();
    let b = joined
        .column("benchmark")?
        .f64()?
        .into_no_null_iter()
        .collect();
    Ok((a, b))
}

/// Beta and correlation from two equally long return series.
#[must_use]
pub fn sensitivity_from_returns(asset: &[f64], benchmark: &[f64]) -> Option<MarketSensitivity> {
    let n = asset.len().min(benchmark.len());
    if n < MIN_RETURN_OBSERVATIONS {
        return None;
    }
    let asset = &asset[asset.len() - n..];
    let benchmark = &benchmark[benchmark.len() - n..];

    let mean_a = asset.iter().sum::<f64>() / n as f64;
    let mean_b = benchmark.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (a, b) in asset.iter().zip(benchmark) {
        let da = a - mean_a;
        let db = b - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }

    Some(MarketSensitivity {
        beta: cov / var_b,
        correlation: cov / (var_a.sqrt() * var_b.sqrt()),
    })
}

/// Beta and correlation of daily returns on date-aligned closes.
#[must_use]
pub fn market_sensitivity(asset: &DataFrame, benchmark: &DataFrame) -> Option<MarketSensitivity> {
    let (a, b) = match align_closes(asset, benchmark) {
        Ok(aligned) => aligned,
        Err(e) => {
            debug!(error = %e, "Could not align price histories");
            return None;
        }
    };

    // Returns are taken on the aligned series so both cover the same days
    let pairs: Vec<(f64, f64)> = a
        .windows(2)
        .zip(b.windows(2))
        .filter(|(wa, wb)| wa[0] != 0.0 && wb[0] != 0.0)
        .map(|(wa, wb)| (wa[1] / wa[0] - 1.0, wb[1] / wb[0] - 1.0))
        .collect();
    let (ra, rb): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();

    sensitivity_from_returns(&ra, &rb)
}

/// Indicators shown on a company's technical line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TechnicalSummary {
    /// RSI over [`RSI_PERIOD`] days.
    pub rsi: Option<f64>,
    /// Beta versus the benchmark.
    pub beta: Option<f64>,
    /// Correlation versus the benchmark.
    pub correlation: Option<f64>,
}

impl TechnicalSummary {
    /// Computes every indicator; the benchmark is optional.
    #[must_use]
    pub fn compute(prices: &DataFrame, benchmark: Option<&DataFrame>) -> Self {
        let sensitivity = benchmark.and_then(|b| market_sensitivity(prices, b));
        Self {
            rsi: rsi(&closes(prices), RSI_PERIOD),
            beta: sensitivity.map(|s| s.beta),
            correlation: sensitivity.map(|s| s.correlation),
        }
    }
}
