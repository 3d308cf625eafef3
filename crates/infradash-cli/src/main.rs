//! `infradash` command-line tool.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use infradash::tender::prepare_tender_alert;
use infradash::{
    AppConfig, DataProviderRegistry, FileSeenStore, SamClient, SeenStore, SqliteSeenStore,
    TelegramSender, TenderFilter, Watchlist, build_credit_report, run_tender_alert,
};
use infradash::{NotificationSender, TelegramConfig};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "infradash", version)]
#[command(about = "Energy infrastructure credit dashboard and tender alerts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the credit dashboard and send it to Telegram
    CreditReport {
        /// Print the report instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Forward today's new SAM.gov tenders to Telegram
    TenderAlert {
        /// Print the alert instead of sending it; the seen store is left untouched
        #[arg(long)]
        dry_run: bool,

        /// Seen-ID file (defaults to INFRADASH_SEEN_FILE or last_seen_tenders.txt)
        #[arg(long)]
        seen_file: Option<PathBuf>,

        /// Seen-ID store backend
        #[arg(long, value_enum, default_value_t = StoreKind::File)]
        store: StoreKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    /// One ID per line in a text file
    File,
    /// SQLite database
    Sqlite,
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Telegram settings unless this is a dry run; checked before any request.
fn telegram_for(config: &AppConfig, dry_run: bool) -> Result<Option<TelegramConfig>> {
    if dry_run {
        return Ok(None);
    }
    config
        .require_telegram()
        .map(Some)
        .context("Telegram is not configured")
}

async fn credit_report(config: &AppConfig, dry_run: bool) -> Result<()> {
    let telegram = telegram_for(config, dry_run)?;

    let mut registry = DataProviderRegistry::new().with_yahoo();
    if let Some(key) = &config.fmp_api_key {
        registry = registry.with_fmp(key);
    }
    debug!(?registry, "Providers registered");

    let now = chrono::Local::now().naive_local();
    let report = build_credit_report(&registry, &Watchlist::default(), now).await;
    println!("{report}");

    if let Some(telegram) = telegram {
        TelegramSender::new(telegram)
            .send_text(&report)
            .await
            .context("Failed to send credit report")?;
        info!("Credit report sent");
    }
    Ok(())
}

fn open_store(
    kind: StoreKind,
    seen_file: Option<PathBuf>,
    config: &AppConfig,
) -> Result<Box<dyn SeenStore>> {
    Ok(match kind {
        StoreKind::File => Box::new(FileSeenStore::new(
            seen_file.unwrap_or_else(|| config.seen_file.clone()),
        )),
        StoreKind::Sqlite => {
            let path = seen_file.unwrap_or_else(|| config.seen_file.with_extension("db"));
            let store = SqliteSeenStore::new(&path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Box::new(store)
        }
    })
}

async fn tender_alert(
    config: &AppConfig,
    dry_run: bool,
    seen_file: Option<PathBuf>,
    kind: StoreKind,
) -> Result<()> {
    let api_key = config
        .require_sam_api_key()
        .context("SAM.gov is not configured")?;
    let telegram = telegram_for(config, dry_run)?;

    let sam = SamClient::new(api_key);
    let store = open_store(kind, seen_file, config)?;
    let filter = TenderFilter::default();
    let today = chrono::Utc::now().date_naive();

    match telegram {
        Some(telegram) => {
            let sender = TelegramSender::new(telegram);
            let sent = run_tender_alert(&sam, store.as_ref(), &sender, &filter, today)
                .await
                .context("Tender alert failed")?;
            info!(sent, "Tender alert finished");
        }
        None => {
            match prepare_tender_alert(&sam, store.as_ref(), &filter, today)
                .await
                .context("Tender lookup failed")?
            {
                Some(batch) => println!("{}", batch.message),
                None => println!("No new tenders"),
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = AppConfig::from_env();

    match cli.command {
        Command::CreditReport { dry_run } => credit_report(&config, dry_run).await,
        Command::TenderAlert {
            dry_run,
            seen_file,
            store,
        } => tender_alert(&config, dry_run, seen_file, store).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_tender_alert() {
        let cli = Cli::parse_from([
            "infradash",
            "tender-alert",
            "--store",
            "sqlite",
            "--seen-file",
            "seen.db",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Command::TenderAlert {
                dry_run,
                seen_file,
                store,
            } => {
                assert!(!dry_run);
                assert_eq!(seen_file, Some(PathBuf::from("seen.db")));
                assert_eq!(store, StoreKind::Sqlite);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_missing_telegram_fails_before_sending() {
        let config = AppConfig::from_lookup(|_| None);
        assert!(telegram_for(&config, true).unwrap().is_none());
        assert!(telegram_for(&config, false).is_err());
    }
}
