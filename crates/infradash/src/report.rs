//! Credit dashboard report.
//!
//! The report is built from whatever the registry can fetch. A macro
//! instrument or company that fails gets a placeholder line and the rest of
//! the report is still produced, so [`build_credit_report`] never fails.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use polars::prelude::DataFrame;
use tracing::{debug, info, warn};

use infradash_core::{CompanySnapshot, DataError, DataFrequency, Result, Symbol};
use infradash_credit::{CoverageLabel, CreditProfile};
use infradash_telegram::escape_html;

use crate::config::{ChangeStyle, MacroInstrument, TrackedCompany, Watchlist};
use crate::format::{bp_change, fmt_num, fmt_pct, fmt_signed_pct, pct_change};
use crate::indicators::{RSI_PERIOD, TechnicalSummary, last_close, last_two_closes};
use crate::registry::DataProviderRegistry;

/// Calendar days of history fetched for macro instruments.
pub const MACRO_LOOKBACK_DAYS: i64 = 10;

/// Calendar days of history fetched for companies and the benchmark.
pub const HISTORY_DAYS: i64 = 365;

const RULE_WIDTH: usize = 40;

const TITLE: &str = "🏛️ Energy Infrastructure Credit Dashboard";

const FOOTER: &str = "Note: N/A means the source data was missing or labelled differently. \
                      No estimates are used.";

/// Everything shown for one company.
#[derive(Debug, Clone)]
pub struct CompanyAnalysis {
    /// Latest close.
    pub price: f64,
    /// Summary snapshot.
    pub snapshot: CompanySnapshot,
    /// Derived credit metrics.
    pub credit: CreditProfile,
    /// RSI, beta and correlation.
    pub technical: TechnicalSummary,
}

impl CompanyAnalysis {
    /// Upside to the mean analyst target, in percent.
    #[must_use]
    pub fn target_upside_pct(&self) -> Option<f64> {
        self.snapshot
            .target_mean_price
            .and_then(|target| pct_change(target, self.price))
    }

    /// Renders the company block, without the trailing rule.
    #[must_use]
    pub fn render(&self, company: &TrackedCompany) -> Vec<String> {
        let snap = &self.snapshot;
        let credit = &self.credit;

        let interest_coverage = match (
            credit.interest_coverage.value(),
            CoverageLabel::for_metric(credit.interest_coverage),
        ) {
            (Some(v), Some(label)) => format!("{v:.1}x {}", label.emoji()),
            _ => fmt_num(None, 1, ""),
        };

        let t = &self.technical;

        vec![
            format!(
                "<b>📊 {}</b> (S&amp;P Rating: <b>{}</b>)",
                escape_html(company.symbol.as_str()),
                escape_html(&company.rating)
            ),
            format!(
                "<b>  [PRICE]</b> ${:.2} (vs target {})",
                self.price,
                fmt_signed_pct(self.target_upside_pct(), 1)
            ),
            format!(
                "<b>  [VALUE]</b> EV/EBITDA: {} | ROE: {}",
                fmt_num(snap.enterprise_to_ebitda, 3, "x"),
                fmt_pct(snap.return_on_equity.map(|r| r * 100.0), 1)
            ),
            format!(
                "<b>  [CASH ]</b> Dividend Yield: {} | Dividend Coverage(TTM): {}",
                fmt_pct(credit.dividend_yield.value(), 2),
                fmt_num(credit.dividend_coverage.value(), 2, "x")
            ),
            format!(
                "<b>  [RISK ]</b> Interest Coverage(TTM): {interest_coverage} | Net Debt/EBITDA: {}",
                fmt_num(credit.net_debt_to_ebitda.value(), 1, "x")
            ),
            format!(
                "<b>  [TECH ]</b> RSI({RSI_PERIOD}): {} | Beta: {} | Corr: {}",
                fmt_num(t.rsi, 1, ""),
                fmt_num(t.beta, 2, ""),
                fmt_num(t.correlation, 2, "")
            ),
        ]
    }
}

/// Fetches and computes everything for one company.
///
/// # Errors
/// Fails if the price history, snapshot or statements cannot be fetched, or
/// if there is neither a close nor a quoted price. The snapshot's quoted
/// price stands in when the history holds no close.
pub async fn analyze_company(
    registry: &DataProviderRegistry,
    symbol: &Symbol,
    benchmark: Option<&DataFrame>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<CompanyAnalysis> {
    let prices = registry
        .fetch_ohlcv(symbol, start, end, DataFrequency::Daily)
        .await?;
    let snapshot = registry.fetch_snapshot(symbol).await?;
    let price = last_close(&prices)
        .or(snapshot.current_price)
        .ok_or_else(|| DataError::not_available(symbol, "closes"))?;

    let financials = registry.fetch_quarterly_financials(symbol).await?;

    let credit = CreditProfile::resolve(&financials, &snapshot);
    debug!(symbol = %symbol, ?credit, "Resolved credit metrics");

    Ok(CompanyAnalysis {
        price,
        snapshot,
        credit,
        technical: TechnicalSummary::compute(&prices, benchmark),
    })
}

async fn macro_line(
    registry: &DataProviderRegistry,
    instrument: &MacroInstrument,
    start: NaiveDate,
    end: NaiveDate,
) -> String {
    let name = escape_html(&instrument.name);

    let closes = match registry
        .fetch_ohlcv(&instrument.symbol, start, end, DataFrequency::Daily)
        .await
    {
        Ok(df) => last_two_closes(&df),
        Err(e) => {
            warn!(symbol = %instrument.symbol, error = %e, "Macro instrument failed");
            None
        }
    };

    let Some((curr, prev)) = closes else {
        return format!("📍 {name}: N/A");
    };

    let change = match instrument.style {
        ChangeStyle::BasisPoints => format!("{:+.1}bp", bp_change(curr, prev)),
        ChangeStyle::Percent => fmt_signed_pct(pct_change(curr, prev), 2),
    };
    format!("📍 {name}: {curr:.2} ({change})")
}

/// Builds the HTML report for the whole watchlist.
///
/// Macro instruments use a short lookback; companies and the benchmark use
/// one year of history ending at `now`.
pub async fn build_credit_report(
    registry: &DataProviderRegistry,
    watchlist: &Watchlist,
    now: NaiveDateTime,
) -> String {
    let end = now.date();
    let macro_start = end - Duration::days(MACRO_LOOKBACK_DAYS);
    let history_start = end - Duration::days(HISTORY_DAYS);
    let rule = "-".repeat(RULE_WIDTH);

    let mut lines = vec![
        format!("<b>{TITLE}</b>"),
        format!("As of: {}", now.format("%Y-%m-%d %H:%M")),
        "=".repeat(RULE_WIDTH),
        "<b>🌐 [MACRO TREND]</b>".to_string(),
    ];

    for instrument in &watchlist.macro_instruments {
        lines.push(macro_line(registry, instrument, macro_start, end).await);
    }
    lines.push(rule.clone());

    let benchmark = match registry
        .fetch_ohlcv(
            &watchlist.benchmark,
            history_start,
            end,
            DataFrequency::Daily,
        )
        .await
    {
        Ok(df) => Some(df),
        Err(e) => {
            warn!(symbol = %watchlist.benchmark, error = %e, "Benchmark history unavailable");
            None
        }
    };

    let mut analysed = 0;
    for company in &watchlist.companies {
        match analyze_company(
            registry,
            &company.symbol,
            benchmark.as_ref(),
            history_start,
            end,
        )
        .await
        {
            Ok(analysis) => {
                analysed += 1;
                lines.extend(analysis.render(company));
            }
            Err(e) => {
                warn!(symbol = %company.symbol, error = %e, "Company analysis failed");
                lines.push(format!(
                    "⚠️ {} analysis unavailable",
                    escape_html(company.symbol.as_str())
                ));
            }
        }
        lines.push(rule.clone());
    }

    lines.push(format!("<i>{FOOTER}</i>"));

    info!(
        companies = watchlist.companies.len(),
        analysed, "Built credit report"
    );

    let mut report = lines.join("\n");
    report.push('\n');
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use infradash_core::{PeriodType, QuarterlyFinancials, Statement, StatementRow};

    use crate::testing::StaticProvider;

    const QUARTERS: [&str; 4] = ["2024-03-31", "2023-12-31", "2023-09-30", "2023-06-30"];

    fn row(label: &str, value: f64) -> StatementRow {
        QUARTERS
            .iter()
            .fold(StatementRow::new(label), |r, p| r.with_value(*p, value))
    }

    fn financials(symbol: &str) -> QuarterlyFinancials {
        QuarterlyFinancials {
            symbol: Symbol::new(symbol),
            income: Statement::from_rows(
                PeriodType::Quarterly,
                vec![row("EBIT", 200.0), row("Interest Expense", -50.0)],
            ),
            cash_flow: Statement::from_rows(
                PeriodType::Quarterly,
                vec![
                    row("Operating Cash Flow", 300.0),
                    row("Cash Dividends Paid", -150.0),
                ],
            ),
        }
    }

    fn snapshot(symbol: &str) -> CompanySnapshot {
        CompanySnapshot {
            enterprise_to_ebitda: Some(12.3456),
            return_on_equity: Some(0.081),
            target_mean_price: Some(110.0),
            net_debt: Some(400.0),
            ebitda: Some(100.0),
            dividend_yield: Some(0.042),
            ..CompanySnapshot::new(Symbol::new(symbol))
        }
    }

    fn closes(n: usize, last: f64) -> Vec<f64> {
        let mut v: Vec<f64> = (0..n)
            .map(|i| 90.0 + ((i as f64) * 0.9).sin() * 3.0 + i as f64 * 0.05)
            .collect();
        if let Some(l) = v.last_mut() {
            *l = last;
        }
        v
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn registry(provider: StaticProvider) -> DataProviderRegistry {
        let provider = Arc::new(provider);
        let mut registry = DataProviderRegistry::new();
        registry.register_price(provider.clone());
        registry.register_fundamental(provider);
        registry
    }

    #[tokio::test]
    async fn test_report_with_one_company_missing_statements() {
        let provider = StaticProvider::default()
            .with_closes("KMI", 19_000, &closes(60, 100.0))
            .with_closes("WMB", 19_000, &closes(60, 50.0))
            .with_closes("LNG", 19_000, &closes(60, 150.0))
            .with_closes("^GSPC", 19_000, &closes(60, 5000.0))
            .with_closes("^TNX", 19_050, &[4.20, 4.25])
            .with_financials(financials("KMI"))
            .with_financials(financials("WMB"))
            .with_snapshot(snapshot("KMI"))
            .with_snapshot(snapshot("WMB"))
            .with_snapshot(snapshot("LNG"));

        let report = build_credit_report(&registry(provider), &Watchlist::default(), now()).await;

        assert!(report.starts_with("<b>🏛️ Energy Infrastructure Credit Dashboard</b>\n"));
        assert!(report.contains("As of: 2025-03-07 09:30"));

        assert_eq!(report.matches("<b>📊 ").count(), 2);
        assert!(report.contains("<b>📊 KMI</b> (S&amp;P Rating: <b>BBB</b>)"));
        assert!(report.contains("<b>📊 WMB</b>"));
        assert!(report.contains("⚠️ LNG analysis unavailable"));
        assert!(!report.contains("<b>📊 LNG</b>"));

        assert!(report.contains("<b>  [PRICE]</b> $100.00 (vs target +10.0%)"));
        assert!(report.contains("EV/EBITDA: 12.346x | ROE: 8.1%"));
        assert!(report.contains("Dividend Yield: 4.20% | Dividend Coverage(TTM): 2.00x"));
        assert!(report.contains("Interest Coverage(TTM): 4.0x 🟡 | Net Debt/EBITDA: 4.0x"));

        assert!(report.contains("📍 US 10Y Yield: 4.25 (+5.0bp)"));
        assert!(report.contains("📍 Natural Gas: N/A"));
        assert!(report.contains("📍 S&amp;P 500: 5000.00"));

        assert!(report.trim_end().ends_with("</i>"));
    }

    #[tokio::test]
    async fn test_company_sections_keep_watchlist_order() {
        let provider = StaticProvider::default()
            .with_closes("KMI", 19_000, &closes(30, 20.0))
            .with_closes("WMB", 19_000, &closes(30, 30.0))
            .with_closes("LNG", 19_000, &closes(30, 40.0))
            .with_financials(financials("KMI"))
            .with_financials(financials("WMB"))
            .with_financials(financials("LNG"));

        let report = build_credit_report(&registry(provider), &Watchlist::default(), now()).await;

        let kmi = report.find("📊 KMI").unwrap();
        let wmb = report.find("📊 WMB").unwrap();
        let lng = report.find("📊 LNG").unwrap();
        assert!(kmi < wmb && wmb < lng);

        // No benchmark history, so beta and correlation are N/A
        assert!(report.contains("| Beta: N/A | Corr: N/A"));
        // Empty snapshots leave every snapshot-based figure unavailable
        assert!(report.contains("EV/EBITDA: N/A | ROE: N/A"));
        assert!(report.contains("(vs target N/A)"));
    }

    #[tokio::test]
    async fn test_analyze_company_without_prices() {
        let registry = registry(StaticProvider::default().with_financials(financials("KMI")));
        let day = now().date();

        let err = analyze_company(&registry, &Symbol::new("KMI"), None, day, day)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound(_)));
    }

    #[tokio::test]
    async fn test_quoted_price_without_closes() {
        let quoted = CompanySnapshot {
            current_price: Some(27.5),
            ..snapshot("KMI")
        };
        let registry = registry(
            StaticProvider::default()
                .with_closes("KMI", 19_000, &[])
                .with_financials(financials("KMI"))
                .with_snapshot(quoted),
        );
        let day = now().date();

        let analysis = analyze_company(&registry, &Symbol::new("KMI"), None, day, day)
            .await
            .unwrap();
        assert_eq!(analysis.price, 27.5);
        assert_eq!(analysis.technical.rsi, None);

        let registry = registry_without_quote();
        let err = analyze_company(&registry, &Symbol::new("KMI"), None, day, day)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::DataNotAvailable { .. }));
    }

    fn registry_without_quote() -> DataProviderRegistry {
        registry(
            StaticProvider::default()
                .with_closes("KMI", 19_000, &[])
                .with_financials(financials("KMI"))
                .with_snapshot(snapshot("KMI")),
        )
    }

    #[test]
    fn test_render_without_interest_coverage() {
        let analysis = CompanyAnalysis {
            price: 25.0,
            snapshot: CompanySnapshot::new(Symbol::new("KMI")),
            credit: CreditProfile::default(),
            technical: TechnicalSummary::default(),
        };
        let lines = analysis.render(&TrackedCompany::new("KMI", "BBB"));

        assert_eq!(lines.len(), 6);
        assert_eq!(
            lines[4],
            "<b>  [RISK ]</b> Interest Coverage(TTM): N/A | Net Debt/EBITDA: N/A"
        );
        assert_eq!(
            lines[5],
            "<b>  [TECH ]</b> RSI(14): N/A | Beta: N/A | Corr: N/A"
        );
    }
}
