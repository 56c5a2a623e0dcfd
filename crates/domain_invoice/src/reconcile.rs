//! Bulk Upsert Reconciler
//!
//! Sends a validated batch as one request and folds the response back into
//! the edit session: success closes it, a rejection attaches each server
//! issue to the row it names, anything unattributable becomes a banner.

use core_kernel::{PortError, ServerIssue};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::editor::BatchEditSession;
use crate::error::InvoiceError;
use crate::field::FieldKey;
use crate::ports::InvoicePort;
use crate::record::InvoiceRecord;

/// Banner shown when the save failed without any server detail
pub const GENERIC_SAVE_FAILURE: &str = "Có lỗi xảy ra khi lưu batch!";

/// One bulk save: every row of the batch plus the persisted rows removed from it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound = "R: InvoiceRecord")]
pub struct BulkUpsertRequest<R> {
    pub records: Vec<R>,
    pub removed_ids: Vec<i64>,
}

impl<R: InvoiceRecord> BulkUpsertRequest<R> {
    pub fn new_rows(&self) -> usize {
        self.records.iter().filter(|r| r.is_new()).count()
    }
}

/// How a save attempt ended, from the operator's point of view
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome<R> {
    /// The backend accepted the batch
    Saved { records: Vec<R> },
    /// The backend rejected the batch; edits are kept
    Rejected {
        row_messages: BTreeMap<usize, Vec<String>>,
        banner: Vec<String>,
    },
    /// The response belongs to a session that is no longer current
    Stale,
}

impl<R> SaveOutcome<R> {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }
}

/// Operator-facing text for one server issue.
///
/// Issues naming a field get the field's label when the family knows it.
pub fn describe_issue<F: FieldKey>(issue: &ServerIssue) -> String {
    let label = issue
        .field
        .as_deref()
        .map(|name| F::from_wire(name).map(|f| f.label()).unwrap_or(name));
    match (issue.index, label) {
        (Some(i), Some(label)) => format!("Hóa đơn số {}: {}: {}", i + 1, label, issue.message),
        (Some(i), None) => format!("Hóa đơn số {}: {}", i + 1, issue.message),
        (None, Some(label)) => format!("{}: {}", label, issue.message),
        (None, None) => issue.message.clone(),
    }
}

/// Splits a failed save into per-row messages and banner lines.
///
/// An issue is attached to a row only when its index falls inside the
/// submitted batch; anything else goes to the banner.
pub fn interpret_failure<R: InvoiceRecord>(
    submitted: usize,
    error: &PortError,
) -> (BTreeMap<usize, Vec<String>>, Vec<String>) {
    let mut rows: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    let mut banner = Vec::new();

    let issues = error.issues();
    if issues.is_empty() {
        banner.push(GENERIC_SAVE_FAILURE.to_string());
        banner.push(error.to_string());
    }
    for issue in issues {
        let text = describe_issue::<R::Field>(issue);
        match issue.index {
            Some(i) if i < submitted => rows.entry(i).or_default().push(text),
            _ => banner.push(text),
        }
    }

    (rows, banner)
}

/// Sends bulk saves through a port with a deadline
pub struct BulkUpsertReconciler<R: InvoiceRecord> {
    port: Arc<dyn InvoicePort<R>>,
    timeout: Duration,
}

impl<R: InvoiceRecord> BulkUpsertReconciler<R> {
    pub fn new(port: Arc<dyn InvoicePort<R>>, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    /// Sends one request; a missed deadline becomes [`PortError::Timeout`]
    #[instrument(skip(self, request), fields(family = R::FAMILY.label(), rows = request.records.len(), removed = request.removed_ids.len()))]
    pub async fn send(&self, request: BulkUpsertRequest<R>) -> Result<Vec<R>, PortError> {
        match tokio::time::timeout(self.timeout, self.port.bulk_upsert(request)).await {
            Ok(result) => result,
            Err(_) => Err(PortError::Timeout {
                operation: "bulk_upsert".to_string(),
                duration_ms: self.timeout.as_millis() as u64,
            }),
        }
    }

    /// Validates, sends and applies the response to the session.
    ///
    /// Local validation failures are returned as [`InvoiceError::Invalid`]
    /// and nothing is sent.
    pub async fn save(&self, session: &mut BatchEditSession<R>) -> Result<SaveOutcome<R>, InvoiceError> {
        let request = session.begin_save()?;
        let ticket = session.ticket();
        let result = self.send(request).await;
        match &result {
            Ok(records) => info!(batch = %session.batch_id(), saved = records.len(), "Batch saved"),
            Err(e) => warn!(batch = %session.batch_id(), error = %e, "Batch save rejected"),
        }
        Ok(session.finish_save(ticket, result))
    }
}
