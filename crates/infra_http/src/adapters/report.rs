//! HTTP Report Adapter

use async_trait::async_trait;
use tracing::instrument;

use core_kernel::{DateRange, DomainPort, PortError};
use domain_report::{CommissionRow, DueInvoice, Granularity, ReportPort, SummaryRow};

use crate::client::ApiClient;

const SUMMARY: &str = "/report/summary";
const COMMISSION: &str = "/report/commission-by-sender";
const DUE: &str = "/report/den-han-ket-toan";

fn range_query(range: &DateRange) -> Vec<(&'static str, String)> {
    let (from, to) = range.to_query();
    vec![("from", from), ("to", to)]
}

#[derive(Debug, Clone)]
pub struct HttpReportAdapter {
    client: ApiClient,
}

impl HttpReportAdapter {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl DomainPort for HttpReportAdapter {}

#[async_trait]
impl ReportPort for HttpReportAdapter {
    #[instrument(skip(self), fields(granularity = %granularity))]
    async fn summary(
        &self,
        granularity: Granularity,
        range: &DateRange,
        include: Option<&str>,
    ) -> Result<Vec<SummaryRow>, PortError> {
        let mut query = vec![("type", granularity.as_str().to_string())];
        query.extend(range_query(range));
        if let Some(include) = include.filter(|s| !s.trim().is_empty()) {
            query.push(("include", include.to_string()));
        }
        self.client.get_json("summary", SUMMARY, &query).await
    }

    #[instrument(skip(self))]
    async fn commission_by_sender(&self, range: &DateRange) -> Result<Vec<CommissionRow>, PortError> {
        self.client.get_json("commission_by_sender", COMMISSION, &range_query(range)).await
    }

    #[instrument(skip(self))]
    async fn due_for_settlement(&self, range: &DateRange) -> Result<Vec<DueInvoice>, PortError> {
        self.client.get_json("due_for_settlement", DUE, &range_query(range)).await
    }
}
