//! Invoice dashboards
//!
//! One [`InvoiceDashboard`] per record family: the filter form, the current
//! page of batches, the totals strip, single-record CRUD, export, and at most
//! one open batch editor.
//!
//! Every mutation is followed by a reload so the table never shows rows the
//! backend has not confirmed.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use core_kernel::{BatchId, PageRequest};
use domain_invoice::{
    aggregate, render_field, Batch, BatchAggregate, BatchEditSession, BulkUpsertReconciler, CardInvoice,
    DashboardStats, EditorState, ExportFile, FieldKey, InvoiceError, InvoicePort, InvoiceRecord, MomoInvoice, OffsetInvoice,
    SaveOutcome,
};

use crate::error::DashboardError;

pub type CardDashboard = InvoiceDashboard<CardInvoice>;
pub type MomoDashboard = InvoiceDashboard<MomoInvoice>;
pub type OffsetDashboard = InvoiceDashboard<OffsetInvoice>;

/// One table line per batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub batch_id: BatchId,
    pub totals: BatchAggregate,
}

pub struct InvoiceDashboard<R: InvoiceRecord> {
    port: Arc<dyn InvoicePort<R>>,
    reconciler: BulkUpsertReconciler<R>,
    filter: R::Filter,
    page: PageRequest,
    batches: Vec<Batch<R>>,
    total: u64,
    stats: DashboardStats,
    editor: Option<BatchEditSession<R>>,
    banner: Vec<String>,
}

impl<R: InvoiceRecord> InvoiceDashboard<R> {
    pub fn new(port: Arc<dyn InvoicePort<R>>, page_size: u32, bulk_timeout: Duration) -> Self {
        Self {
            reconciler: BulkUpsertReconciler::new(port.clone(), bulk_timeout),
            port,
            filter: R::Filter::default(),
            page: PageRequest::first(page_size),
            batches: Vec::new(),
            total: 0,
            stats: DashboardStats::default(),
            editor: None,
            banner: Vec::new(),
        }
    }

    pub fn filter(&self) -> &R::Filter {
        &self.filter
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    pub fn batches(&self) -> &[Batch<R>] {
        &self.batches
    }

    /// Total rows the backend reports across all pages
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn stats(&self) -> &DashboardStats {
        &self.stats
    }

    /// Totals over the batches on the current page only
    pub fn page_stats(&self) -> DashboardStats {
        DashboardStats::from_batches(&self.batches)
    }

    pub fn banner(&self) -> &[String] {
        &self.banner
    }

    pub fn page_count(&self) -> u32 {
        let size = u64::from(self.page.page_size);
        (self.total.div_ceil(size).max(1)).min(u64::from(u32::MAX)) as u32
    }

    /// Replaces the filter form; any change goes back to page 1.
    ///
    /// Returns whether the filter changed.
    pub fn set_filter(&mut self, filter: R::Filter) -> bool {
        if filter == self.filter {
            return false;
        }
        self.filter = filter;
        self.page = self.page.with_page(1);
        debug!(family = R::FAMILY.label(), "Filter changed, back to page 1");
        true
    }

    /// Applies a filter and fetches its first page
    pub async fn apply_filter(&mut self, filter: R::Filter) -> Result<(), DashboardError> {
        self.set_filter(filter);
        self.refresh().await
    }

    pub async fn go_to_page(&mut self, page: u32) -> Result<(), DashboardError> {
        self.page = self.page.with_page(page.min(self.page_count()));
        self.refresh().await
    }

    /// Fetches the current page and the totals together
    #[instrument(skip(self), fields(family = R::FAMILY.label(), page = self.page.page))]
    pub async fn refresh(&mut self) -> Result<(), DashboardError> {
        let (listed, stats) = tokio::join!(self.port.list(&self.filter, self.page), self.port.stats(&self.filter));
        match (listed, stats) {
            (Ok(listed), Ok(stats)) => {
                self.total = listed.total;
                self.batches = listed.items;
                self.stats = stats;
                self.banner.clear();
                debug!(batches = self.batches.len(), total = self.total, "Dashboard refreshed");
                Ok(())
            }
            (Err(e), _) | (_, Err(e)) => {
                let error = DashboardError::Port(e);
                warn!(error = %error, "Dashboard refresh failed");
                self.banner = error.user_message();
                Err(error)
            }
        }
    }

    #[instrument(skip(self, record), fields(family = R::FAMILY.label()))]
    pub async fn create(&mut self, record: R) -> Result<R, DashboardError> {
        let created = self.port.create(record).await?;
        info!(id = %created.id(), "Record created");
        self.refresh().await?;
        Ok(created)
    }

    #[instrument(skip(self, record), fields(family = R::FAMILY.label()))]
    pub async fn update(&mut self, id: i64, record: R) -> Result<R, DashboardError> {
        let updated = self.port.update(id, record).await?;
        self.refresh().await?;
        Ok(updated)
    }

    #[instrument(skip(self), fields(family = R::FAMILY.label()))]
    pub async fn delete(&mut self, id: i64) -> Result<(), DashboardError> {
        self.port.delete(id).await?;
        info!(id, "Record deleted");
        self.refresh().await
    }

    #[instrument(skip(self), fields(family = R::FAMILY.label(), batch_id = %batch_id))]
    pub async fn delete_batch(&mut self, batch_id: &BatchId) -> Result<(), DashboardError> {
        self.port.delete_batch(batch_id).await?;
        if self.editor.as_ref().is_some_and(|e| e.batch_id() == batch_id) {
            self.close_editor();
        }
        self.refresh().await
    }

    /// Spreadsheet of everything matching the current filter
    pub async fn export(&self) -> Result<ExportFile, DashboardError> {
        Ok(self.port.export(&self.filter).await?)
    }

    /// One line per loaded batch
    pub fn summaries(&self) -> Vec<BatchSummary> {
        self.batches
            .iter()
            .map(|b| BatchSummary {
                batch_id: b.batch_id.clone(),
                totals: aggregate(&b.records),
            })
            .collect()
    }

    /// Read-only cells of a loaded batch, sensitive numbers masked
    pub fn rendered_batch(&self, batch_id: &BatchId) -> Option<Vec<Vec<String>>> {
        let batch = self.batches.iter().find(|b| &b.batch_id == batch_id)?;
        Some(
            batch
                .records
                .iter()
                .map(|r| R::Field::all().iter().map(|f| render_field(r, *f)).collect())
                .collect(),
        )
    }

    pub fn editor(&self) -> Option<&BatchEditSession<R>> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut BatchEditSession<R>> {
        self.editor.as_mut()
    }

    pub fn is_saving(&self) -> bool {
        self.editor.as_ref().is_some_and(|e| e.state() == EditorState::Submitting)
    }

    /// Opens the editor on a batch from the current page
    pub fn open_batch(&mut self, batch_id: &BatchId) -> Result<&mut BatchEditSession<R>, DashboardError> {
        if self.is_saving() {
            return Err(DashboardError::Busy("Saving the batch"));
        }
        let batch = self
            .batches
            .iter()
            .find(|b| &b.batch_id == batch_id)
            .cloned()
            .ok_or_else(|| DashboardError::UnknownBatch(batch_id.to_string()))?;
        Ok(self.editor.insert(BatchEditSession::open(batch)))
    }

    /// Opens the editor on a new, empty batch named by the operator
    pub fn new_batch(&mut self, batch_id: &str) -> Result<&mut BatchEditSession<R>, DashboardError> {
        if self.is_saving() {
            return Err(DashboardError::Busy("Saving the batch"));
        }
        let batch_id = BatchId::parse(batch_id).map_err(InvoiceError::from)?;
        Ok(self.editor.insert(BatchEditSession::create(batch_id)))
    }

    /// Closes the editor; a save still in flight will be ignored when it lands
    pub fn close_editor(&mut self) {
        if let Some(mut editor) = self.editor.take() {
            editor.close();
        }
    }

    /// Validates and sends the open batch.
    ///
    /// A saved batch closes the editor. A rejected one stays open with its
    /// messages. Either way the page is reloaded from the backend.
    #[instrument(skip(self), fields(family = R::FAMILY.label()))]
    pub async fn save_batch(&mut self) -> Result<SaveOutcome<R>, DashboardError> {
        let session = self.editor.as_mut().ok_or(DashboardError::NoEditSession)?;
        if session.state() == EditorState::Submitting {
            return Err(DashboardError::Busy("Saving the batch"));
        }

        let outcome = self.reconciler.save(session).await?;
        match &outcome {
            SaveOutcome::Saved { records } => {
                info!(saved = records.len(), "Batch saved");
                self.editor = None;
            }
            SaveOutcome::Rejected { banner, .. } => {
                warn!(banner = banner.len(), "Batch rejected");
            }
            SaveOutcome::Stale => return Ok(outcome),
        }

        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Reload after save failed");
        }
        Ok(outcome)
    }
}
