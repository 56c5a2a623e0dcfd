//! Report Ports

use async_trait::async_trait;
use core_kernel::{DateRange, DomainPort, PortError};

use crate::commission::CommissionRow;
use crate::period::Granularity;
use crate::settlement::DueInvoice;
use crate::summary::SummaryRow;

#[async_trait]
pub trait ReportPort: DomainPort {
    /// Buckets in `range`; `include` narrows the backend's source tables
    async fn summary(
        &self,
        granularity: Granularity,
        range: &DateRange,
        include: Option<&str>,
    ) -> Result<Vec<SummaryRow>, PortError>;

    async fn commission_by_sender(&self, range: &DateRange) -> Result<Vec<CommissionRow>, PortError>;

    async fn due_for_settlement(&self, range: &DateRange) -> Result<Vec<DueInvoice>, PortError>;
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory mock implementation of ReportPort
    ///
    /// Rows are filtered by the date prefix of their period or due date.
    #[derive(Debug, Default, Clone)]
    pub struct MockReportPort {
        summary: Arc<RwLock<Vec<SummaryRow>>>,
        commission: Arc<RwLock<Vec<CommissionRow>>>,
        due: Arc<RwLock<Vec<DueInvoice>>>,
        calls: Arc<RwLock<Vec<String>>>,
    }

    impl MockReportPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn set_summary(&self, rows: Vec<SummaryRow>) {
            *self.summary.write().await = rows;
        }

        pub async fn set_commission(&self, rows: Vec<CommissionRow>) {
            *self.commission.write().await = rows;
        }

        pub async fn set_due(&self, rows: Vec<DueInvoice>) {
            *self.due.write().await = rows;
        }

        /// Query strings received so far, e.g. `summary?type=day&from=..&to=..`
        pub async fn calls(&self) -> Vec<String> {
            self.calls.read().await.clone()
        }

        async fn record(&self, call: String) {
            self.calls.write().await.push(call);
        }
    }

    fn in_range(period: &str, range: &DateRange) -> bool {
        let (from, to) = range.to_query();
        let day: String = period.chars().take(10).collect();
        day >= from && day <= to
    }

    impl DomainPort for MockReportPort {}

    #[async_trait]
    impl ReportPort for MockReportPort {
        async fn summary(
            &self,
            granularity: Granularity,
            range: &DateRange,
            include: Option<&str>,
        ) -> Result<Vec<SummaryRow>, PortError> {
            let (from, to) = range.to_query();
            let mut call = format!("summary?type={}&from={}&to={}", granularity, from, to);
            if let Some(include) = include {
                call.push_str(&format!("&include={}", include));
            }
            self.record(call).await;
            Ok(self
                .summary
                .read()
                .await
                .iter()
                .filter(|row| in_range(&row.period, range))
                .cloned()
                .collect())
        }

        async fn commission_by_sender(&self, range: &DateRange) -> Result<Vec<CommissionRow>, PortError> {
            let (from, to) = range.to_query();
            self.record(format!("commission-by-sender?from={}&to={}", from, to)).await;
            Ok(self.commission.read().await.clone())
        }

        async fn due_for_settlement(&self, range: &DateRange) -> Result<Vec<DueInvoice>, PortError> {
            let (from, to) = range.to_query();
            self.record(format!("den-han-ket-toan?from={}&to={}", from, to)).await;
            Ok(self
                .due
                .read()
                .await
                .iter()
                .filter(|invoice| range.contains(invoice.start))
                .cloned()
                .collect())
        }
    }
}
