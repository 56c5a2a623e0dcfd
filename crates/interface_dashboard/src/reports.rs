//! Report screens
//!
//! The period summary with its growth figures, the commission ranking by
//! sender, and the monthly calendar of invoices due for settlement.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use core_kernel::{DateRange, Vnd};
use domain_report::{
    counts_by_date, group_by_due_date, month_of, top_by_commission, CommissionRow, DueCalendar, Granularity,
    RangePreset, ReportPort, SummaryReport, TOP_SENDERS,
};

use crate::error::DashboardError;

pub struct ReportScreen {
    port: Arc<dyn ReportPort>,
    granularity: Granularity,
    range: DateRange,
    include: Option<String>,
    summary: SummaryReport,
    commission: Vec<CommissionRow>,
    calendar: DueCalendar,
}

impl ReportScreen {
    /// Opens on the current month, bucketed by day
    pub fn new(port: Arc<dyn ReportPort>, today: NaiveDate) -> Result<Self, DashboardError> {
        Ok(Self {
            port,
            granularity: Granularity::default(),
            range: RangePreset::ThisMonth.resolve(today)?,
            include: None,
            summary: SummaryReport::default(),
            commission: Vec::new(),
            calendar: DueCalendar::new(),
        })
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn include(&self) -> Option<&str> {
        self.include.as_deref()
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.granularity = granularity;
    }

    pub fn select_preset(&mut self, preset: RangePreset, today: NaiveDate) -> Result<(), DashboardError> {
        self.range = preset.resolve(today)?;
        debug!(preset = preset.label(), range = ?self.range, "Report range changed");
        Ok(())
    }

    pub fn set_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<(), DashboardError> {
        self.range = DateRange::new(start, end).map_err(domain_report::ReportError::from)?;
        Ok(())
    }

    /// Narrows the summary's source tables; blank clears it
    pub fn set_include(&mut self, include: Option<&str>) {
        self.include = include.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
    }

    #[instrument(skip(self), fields(granularity = %self.granularity))]
    pub async fn load_summary(&mut self) -> Result<&SummaryReport, DashboardError> {
        let rows = self
            .port
            .summary(self.granularity, &self.range, self.include.as_deref())
            .await?;
        debug!(rows = rows.len(), "Summary loaded");
        self.summary = SummaryReport::from_rows(rows);
        Ok(&self.summary)
    }

    pub fn summary(&self) -> &SummaryReport {
        &self.summary
    }

    /// Loads the senders with the highest commission
    #[instrument(skip(self))]
    pub async fn load_commission(&mut self) -> Result<&[CommissionRow], DashboardError> {
        let rows = self.port.commission_by_sender(&self.range).await?;
        self.commission = top_by_commission(&rows, TOP_SENDERS);
        Ok(&self.commission)
    }

    pub fn commission(&self) -> &[CommissionRow] {
        &self.commission
    }

    /// Sender and final payout for each ranked row
    pub fn payouts(&self) -> Result<Vec<(String, Vnd)>, DashboardError> {
        self.commission
            .iter()
            .map(|row| Ok((row.sender.clone(), row.final_commission()?)))
            .collect()
    }

    /// Loads the settlement calendar for the month containing `day`
    #[instrument(skip(self))]
    pub async fn load_calendar(&mut self, day: NaiveDate) -> Result<&DueCalendar, DashboardError> {
        let month = month_of(day)?;
        let due = self.port.due_for_settlement(&month).await?;
        debug!(invoices = due.len(), "Settlement calendar loaded");
        self.calendar = group_by_due_date(due);
        Ok(&self.calendar)
    }

    pub fn calendar(&self) -> &DueCalendar {
        &self.calendar
    }

    /// Badge counts for the calendar cells
    pub fn due_counts(&self) -> BTreeMap<NaiveDate, usize> {
        counts_by_date(&self.calendar)
    }
}
