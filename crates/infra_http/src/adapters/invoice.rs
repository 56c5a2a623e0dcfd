//! HTTP Invoice Adapter
//!
//! Implements [`InvoicePort`] for each record family against the `/hoa-don`
//! endpoints. The three families share one adapter; only the paths differ.
//!
//! # Endpoints
//!
//! | operation    | card                       | MoMo                         | offset                          |
//! |--------------|----------------------------|------------------------------|---------------------------------|
//! | list         | `GET /hoa-don/`            | `GET /hoa-don/momo/`         | `GET /hoa-don/doi-ung`          |
//! | stats        | `GET /hoa-don/stats-hoadon`| `GET /hoa-don/stats-hoa-don-dien` | `GET /hoa-don/stats-doi-ung` |
//! | bulk upsert  | `POST /hoa-don/batch-update` | `POST /hoa-don/batch-momo` | `POST /hoa-don/doi-ung/batch-update` |
//!
//! Create, update, delete, batch delete and export hang off each family's
//! base path (`/{id}`, `/batch/{batch_id}`, `/export-excel`).
//!
//! Card and MoMo lists arrive grouped as `{batch_id, records}`; the offset
//! list is flat and is grouped here.

use async_trait::async_trait;
use reqwest::Method;
use std::marker::PhantomData;
use tracing::{debug, info, instrument};

use core_kernel::{BatchId, DomainPort, Page, PageRequest, PortError};
use domain_invoice::ports::XLSX_CONTENT_TYPE;
use domain_invoice::{
    group_by_batch, Batch, BulkUpsertRequest, DashboardStats, ExportFile, InvoiceFamily,
    InvoiceFilter, InvoicePort, InvoiceRecord,
};

use crate::client::ApiClient;

/// Paths of one invoice family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceEndpoints {
    pub base: &'static str,
    pub list: &'static str,
    pub stats: &'static str,
    pub bulk: &'static str,
}

impl InvoiceEndpoints {
    pub fn for_family(family: InvoiceFamily) -> Self {
        match family {
            InvoiceFamily::Card => Self {
                base: "/hoa-don",
                list: "/hoa-don/",
                stats: "/hoa-don/stats-hoadon",
                bulk: "/hoa-don/batch-update",
            },
            InvoiceFamily::Momo => Self {
                base: "/hoa-don/momo",
                list: "/hoa-don/momo/",
                stats: "/hoa-don/stats-hoa-don-dien",
                bulk: "/hoa-don/batch-momo",
            },
            InvoiceFamily::Offset => Self {
                base: "/hoa-don/doi-ung",
                list: "/hoa-don/doi-ung",
                stats: "/hoa-don/stats-doi-ung",
                bulk: "/hoa-don/doi-ung/batch-update",
            },
        }
    }

    pub fn record(&self, id: i64) -> String {
        format!("{}/{}", self.base, id)
    }

    pub fn batch(&self, batch_id: &BatchId) -> String {
        format!("{}/batch/{}", self.base, batch_id)
    }

    pub fn export(&self) -> String {
        format!("{}/export-excel", self.base)
    }
}

/// REST implementation of [`InvoicePort`] for the family `R`
#[derive(Debug, Clone)]
pub struct HttpInvoiceAdapter<R> {
    client: ApiClient,
    endpoints: InvoiceEndpoints,
    _family: PhantomData<fn() -> R>,
}

impl<R: InvoiceRecord> HttpInvoiceAdapter<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            endpoints: InvoiceEndpoints::for_family(R::FAMILY),
            _family: PhantomData,
        }
    }

    pub fn endpoints(&self) -> &InvoiceEndpoints {
        &self.endpoints
    }
}

impl<R: InvoiceRecord> DomainPort for HttpInvoiceAdapter<R> {}

#[async_trait]
impl<R: InvoiceRecord> InvoicePort<R> for HttpInvoiceAdapter<R> {
    #[instrument(skip(self, filter), fields(family = R::FAMILY.label(), page = page.page))]
    async fn list(&self, filter: &R::Filter, page: PageRequest) -> Result<Page<Batch<R>>, PortError> {
        let mut query = filter.to_query();
        query.extend(page.to_query());

        if R::FAMILY.is_grouped_by_backend() {
            let page: Page<Batch<R>> = self.client.get_json("list", self.endpoints.list, &query).await?;
            debug!(batches = page.items.len(), total = page.total, "Listed batches");
            Ok(page)
        } else {
            let flat: Page<R> = self.client.get_json("list", self.endpoints.list, &query).await?;
            let batches = group_by_batch(flat.items);
            debug!(batches = batches.len(), total = flat.total, "Listed and grouped records");
            Ok(Page::new(flat.total, batches))
        }
    }

    #[instrument(skip(self, filter), fields(family = R::FAMILY.label()))]
    async fn stats(&self, filter: &R::Filter) -> Result<DashboardStats, PortError> {
        self.client.get_json("stats", self.endpoints.stats, &filter.to_query()).await
    }

    #[instrument(skip(self, record), fields(family = R::FAMILY.label()))]
    async fn create(&self, record: R) -> Result<R, PortError> {
        let created: R = self
            .client
            .send_json("create", Method::POST, self.endpoints.base, &record)
            .await?;
        info!(id = %created.id(), "Created record");
        Ok(created)
    }

    #[instrument(skip(self, record), fields(family = R::FAMILY.label()))]
    async fn update(&self, id: i64, record: R) -> Result<R, PortError> {
        self.client
            .send_json("update", Method::PUT, &self.endpoints.record(id), &record)
            .await
    }

    #[instrument(skip(self), fields(family = R::FAMILY.label()))]
    async fn delete(&self, id: i64) -> Result<(), PortError> {
        self.client
            .send_empty("delete", Method::DELETE, &self.endpoints.record(id))
            .await?;
        info!(id, "Deleted record");
        Ok(())
    }

    #[instrument(skip(self), fields(family = R::FAMILY.label(), batch_id = %batch_id))]
    async fn delete_batch(&self, batch_id: &BatchId) -> Result<(), PortError> {
        self.client
            .send_empty("delete_batch", Method::DELETE, &self.endpoints.batch(batch_id))
            .await?;
        info!("Deleted batch");
        Ok(())
    }

    #[instrument(skip(self, request), fields(family = R::FAMILY.label(), rows = request.records.len()))]
    async fn bulk_upsert(&self, request: BulkUpsertRequest<R>) -> Result<Vec<R>, PortError> {
        let timeout = self.client.config().bulk_timeout;
        self.client
            .send_json_within("bulk_upsert", Method::POST, self.endpoints.bulk, &request, timeout)
            .await
    }

    #[instrument(skip(self, filter), fields(family = R::FAMILY.label()))]
    async fn export(&self, filter: &R::Filter) -> Result<ExportFile, PortError> {
        let download = self
            .client
            .download("export", &self.endpoints.export(), &filter.to_query())
            .await?;
        info!(bytes = download.bytes.len(), "Exported spreadsheet");
        Ok(ExportFile {
            filename: R::FAMILY.export_filename().to_string(),
            content_type: download
                .content_type
                .unwrap_or_else(|| XLSX_CONTENT_TYPE.to_string()),
            bytes: download.bytes,
        })
    }
}
