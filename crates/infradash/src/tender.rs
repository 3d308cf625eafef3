//! Government tender alert.
//!
//! A run loads the seen IDs, fetches the day's SAM.gov postings, keeps the
//! ones the [`TenderFilter`] accepts and sends them as one message. The
//! forwarded IDs are appended to the store only after the send succeeds, so a
//! failed delivery is retried on the next run.

use chrono::NaiveDate;
use tracing::{debug, info};

use infradash_core::{Result, SeenStore};
use infradash_sam::{DEFAULT_LIMIT, Opportunity, SamClient, TenderFilter};
use infradash_telegram::{NotificationSender, escape_html};

const HEADER_TITLE: &str = "🔔 [NEW] Large US Government Tender Alert";

const HEADER_RULE_WIDTH: usize = 25;

/// Postings ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenderBatch {
    /// Notice IDs in message order.
    pub ids: Vec<String>,
    /// HTML message body.
    pub message: String,
}

impl TenderBatch {
    /// Number of postings in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if the batch holds no posting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

fn format_posting(opp: &Opportunity) -> String {
    let link = match opp.link.as_deref().filter(|l| !l.is_empty()) {
        Some(url) => format!("🔗 <a href=\"{}\">View posting</a>", escape_html(url)),
        None => "🔗 No link".to_string(),
    };
    format!(
        "🏛 <b>Agency:</b> {}\n🚀 <b>Title:</b> {}\n{link}",
        escape_html(&opp.agency),
        escape_html(&opp.title)
    )
}

/// Formats the alert message: a header naming the target agencies, then one
/// block per posting separated by blank lines.
#[must_use]
pub fn format_tender_message(filter: &TenderFilter, opps: &[&Opportunity]) -> String {
    let agencies = escape_html(&filter.target_agencies().join(", "));
    let postings: Vec<String> = opps.iter().map(|o| format_posting(o)).collect();

    format!(
        "<b>{HEADER_TITLE}</b>\nAgencies: {agencies}\n{}\n\n{}",
        "=".repeat(HEADER_RULE_WIDTH),
        postings.join("\n\n")
    )
}

/// Fetches `today`'s postings and builds the batch of new matches.
///
/// Returns `None` when nothing new matches. Nothing is written to `store`.
///
/// # Errors
/// Fails if the store cannot be read or the SAM request fails.
pub async fn prepare_tender_alert(
    sam: &SamClient,
    store: &dyn SeenStore,
    filter: &TenderFilter,
    today: NaiveDate,
) -> Result<Option<TenderBatch>> {
    let seen = store.load().await?;
    let opps = sam.fetch_day(today, DEFAULT_LIMIT).await?;
    let selected = filter.select(&opps, &seen);

    info!(
        %today,
        fetched = opps.len(),
        seen = seen.len(),
        selected = selected.len(),
        store = store.name(),
        "Filtered tenders"
    );

    if selected.is_empty() {
        return Ok(None);
    }

    Ok(Some(TenderBatch {
        ids: selected.iter().map(|o| o.notice_id.clone()).collect(),
        message: format_tender_message(filter, &selected),
    }))
}

/// Sends the batch, then records its IDs as seen.
///
/// # Errors
/// A failed send is returned before anything is appended to `store`.
pub async fn deliver_tender_alert(
    batch: &TenderBatch,
    notifier: &dyn NotificationSender,
    store: &dyn SeenStore,
) -> Result<()> {
    debug!(notifier = notifier.name(), count = batch.len(), "Sending tenders");
    notifier.send_text(&batch.message).await?;
    store.append(&batch.ids).await?;
    info!(count = batch.len(), "Tender alert delivered");
    Ok(())
}

/// Runs the whole alert and returns how many postings were forwarded.
///
/// # Errors
/// See [`prepare_tender_alert`] and [`deliver_tender_alert`].
pub async fn run_tender_alert(
    sam: &SamClient,
    store: &dyn SeenStore,
    notifier: &dyn NotificationSender,
    filter: &TenderFilter,
    today: NaiveDate,
) -> Result<usize> {
    match prepare_tender_alert(sam, store, filter, today).await? {
        Some(batch) => {
            deliver_tender_alert(&batch, notifier, store).await?;
            Ok(batch.len())
        }
        None => {
            info!("No new tenders");
            Ok(0)
        }
    }
}
