//! Invoice Ports
//!
//! The backend operations the dashboard needs for one invoice family. The HTTP
//! adapter lives in `infra_http`; an in-memory implementation is available
//! for tests behind the `mock` feature.
//!
//! ```rust,ignore
//! let port: Arc<dyn InvoicePort<CardInvoice>> = Arc::new(HttpInvoiceAdapter::card(client));
//! let page = port.list(&CardFilter::default(), PageRequest::default()).await?;
//! ```

use async_trait::async_trait;
use core_kernel::{BatchId, DomainPort, Page, PageRequest, PortError};
use serde::{Deserialize, Serialize};

use crate::batch::{Batch, DashboardStats};
use crate::reconcile::BulkUpsertRequest;
use crate::record::InvoiceRecord;

/// A spreadsheet produced by the export endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Backend operations for one invoice family
#[async_trait]
pub trait InvoicePort<R: InvoiceRecord>: DomainPort {
    /// One page of batches matching the filter
    async fn list(&self, filter: &R::Filter, page: PageRequest) -> Result<Page<Batch<R>>, PortError>;

    /// Totals over everything matching the filter
    async fn stats(&self, filter: &R::Filter) -> Result<DashboardStats, PortError>;

    async fn create(&self, record: R) -> Result<R, PortError>;

    async fn update(&self, id: i64, record: R) -> Result<R, PortError>;

    async fn delete(&self, id: i64) -> Result<(), PortError>;

    /// Deletes every record of a batch
    async fn delete_batch(&self, batch_id: &BatchId) -> Result<(), PortError>;

    /// Creates, updates and removes a batch's rows in one call.
    ///
    /// Rejections carry issues indexed into `request.records`.
    async fn bulk_upsert(&self, request: BulkUpsertRequest<R>) -> Result<Vec<R>, PortError>;

    /// Spreadsheet of everything matching the filter, unpaged
    async fn export(&self, filter: &R::Filter) -> Result<ExportFile, PortError>;
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use crate::batch::group_by_batch;
    use crate::filter::InvoiceFilter;
    use core_kernel::{RecordId, ServerIssue};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory mock implementation of InvoicePort
    #[derive(Debug)]
    pub struct MockInvoicePort<R: InvoiceRecord> {
        records: Arc<RwLock<Vec<R>>>,
        next_id: Arc<RwLock<i64>>,
        rejection: Arc<RwLock<Option<Vec<ServerIssue>>>>,
        bulk_calls: Arc<AtomicUsize>,
    }

    impl<R: InvoiceRecord> Default for MockInvoicePort<R> {
        fn default() -> Self {
            Self {
                records: Arc::new(RwLock::new(Vec::new())),
                next_id: Arc::new(RwLock::new(1)),
                rejection: Arc::new(RwLock::new(None)),
                bulk_calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl<R: InvoiceRecord> MockInvoicePort<R> {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with records; new ones get ids after the highest given
        pub async fn with_records(records: Vec<R>) -> Self {
            let port = Self::new();
            let max = records.iter().filter_map(|r| r.id().persisted()).max().unwrap_or(0);
            *port.next_id.write().await = max + 1;
            *port.records.write().await = records;
            port
        }

        /// Makes the next bulk upsert fail with these issues
        pub async fn reject_next_bulk(&self, issues: Vec<ServerIssue>) {
            *self.rejection.write().await = Some(issues);
        }

        pub fn bulk_calls(&self) -> usize {
            self.bulk_calls.load(Ordering::SeqCst)
        }

        pub async fn snapshot(&self) -> Vec<R> {
            self.records.read().await.clone()
        }

        async fn assign_id(&self, record: &mut R) {
            let mut next = self.next_id.write().await;
            record.set_id(RecordId::Persisted(*next));
            *next += 1;
        }

        async fn matching(&self, filter: &R::Filter) -> Vec<R> {
            self.records
                .read()
                .await
                .iter()
                .filter(|r| filter.matches(r))
                .cloned()
                .collect()
        }
    }

    impl<R: InvoiceRecord> DomainPort for MockInvoicePort<R> {}

    #[async_trait]
    impl<R: InvoiceRecord> InvoicePort<R> for MockInvoicePort<R> {
        async fn list(&self, filter: &R::Filter, page: PageRequest) -> Result<Page<Batch<R>>, PortError> {
            let batches = group_by_batch(self.matching(filter).await);
            let total = batches.len() as u64;
            let items = batches
                .into_iter()
                .skip(page.offset())
                .take(page.page_size as usize)
                .collect();
            Ok(Page::new(total, items))
        }

        async fn stats(&self, filter: &R::Filter) -> Result<DashboardStats, PortError> {
            let batches = group_by_batch(self.matching(filter).await);
            Ok(DashboardStats::from_batches(&batches))
        }

        async fn create(&self, mut record: R) -> Result<R, PortError> {
            self.assign_id(&mut record).await;
            self.records.write().await.push(record.clone());
            Ok(record)
        }

        async fn update(&self, id: i64, mut record: R) -> Result<R, PortError> {
            let mut records = self.records.write().await;
            let slot = records
                .iter_mut()
                .find(|r| r.id().persisted() == Some(id))
                .ok_or_else(|| PortError::not_found(R::FAMILY.label(), id))?;
            record.set_id(RecordId::Persisted(id));
            *slot = record.clone();
            Ok(record)
        }

        async fn delete(&self, id: i64) -> Result<(), PortError> {
            let mut records = self.records.write().await;
            let before = records.len();
            records.retain(|r| r.id().persisted() != Some(id));
            if records.len() == before {
                return Err(PortError::not_found(R::FAMILY.label(), id));
            }
            Ok(())
        }

        async fn delete_batch(&self, batch_id: &BatchId) -> Result<(), PortError> {
            self.records.write().await.retain(|r| r.batch_id() != batch_id);
            Ok(())
        }

        async fn bulk_upsert(&self, request: BulkUpsertRequest<R>) -> Result<Vec<R>, PortError> {
            self.bulk_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(issues) = self.rejection.write().await.take() {
                return Err(PortError::unprocessable(issues));
            }

            let known: Vec<i64> = {
                let records = self.records.read().await;
                records.iter().filter_map(|r| r.id().persisted()).collect()
            };
            let missing: Vec<ServerIssue> = request
                .records
                .iter()
                .enumerate()
                .filter_map(|(i, r)| match r.id().persisted() {
                    Some(id) if !known.contains(&id) => Some(ServerIssue::at_row(i, format!("không tìm thấy id {}", id))),
                    _ => None,
                })
                .collect();
            if !missing.is_empty() {
                return Err(PortError::unprocessable(missing));
            }

            let mut saved = Vec::with_capacity(request.records.len());
            for mut record in request.records {
                if record.is_new() {
                    self.assign_id(&mut record).await;
                }
                saved.push(record);
            }

            let mut records = self.records.write().await;
            records.retain(|r| match r.id().persisted() {
                Some(id) => !request.removed_ids.contains(&id),
                None => true,
            });
            for record in &saved {
                match records.iter_mut().find(|r| r.id() == record.id()) {
                    Some(slot) => *slot = record.clone(),
                    None => records.push(record.clone()),
                }
            }
            Ok(saved)
        }

        async fn export(&self, filter: &R::Filter) -> Result<ExportFile, PortError> {
            let rows = self.matching(filter).await;
            let bytes = serde_json::to_vec(&rows).map_err(|e| PortError::Transformation {
                message: e.to_string(),
            })?;
            Ok(ExportFile {
                filename: R::FAMILY.export_filename().to_string(),
                content_type: XLSX_CONTENT_TYPE.to_string(),
                bytes,
            })
        }
    }
}
