//! Pre-built Test Fixtures
//!
//! Ready-to-use records, accounts and report rows. Values are fixed so tests
//! stay predictable.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{BatchId, UserId, Vnd};
use domain_access::{PermissionSet, Role, User};
use domain_report::{CommissionRow, SummaryRow};
use once_cell::sync::Lazy;

/// The instant every fixture record was sent at (09:30 in Hanoi)
pub static REFERENCE_TIME: Lazy<DateTime<Utc>> =
    Lazy::new(|| Utc.with_ymd_and_hms(2024, 3, 15, 2, 30, 0).single().unwrap_or_default());

/// Fixture for batch ids and wire amounts
pub struct InvoiceFixtures;

impl InvoiceFixtures {
    pub fn batch_id() -> BatchId {
        BatchId::new("BATCH-2024-03-15-001")
    }

    pub fn other_batch_id() -> BatchId {
        BatchId::new("BATCH-2024-03-15-002")
    }

    /// A 16-digit card number, rendered as `**** 3456`
    pub fn card_number() -> &'static str {
        "1234567890123456"
    }

    pub fn sender() -> &'static str {
        "Lan"
    }

    pub fn customer() -> &'static str {
        "Nguyễn Văn A"
    }

    pub fn phone() -> &'static str {
        "0901234567"
    }
}

/// Fixture for accounts
pub struct UserFixtures;

impl UserFixtures {
    pub const PASSWORD: &'static str = "matkhau123";

    pub fn admin() -> User {
        Self::with_role(1, "admin", Role::Admin)
    }

    pub fn viewer() -> User {
        Self::with_role(2, "viewer", Role::Viewer)
    }

    pub fn with_role(id: i64, username: &str, role: Role) -> User {
        User {
            id: UserId::new(id),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            role: Some(role.as_str().to_string()),
            is_active: true,
            created_at: Some(*REFERENCE_TIME),
            updated_at: Some(*REFERENCE_TIME),
        }
    }

    pub fn permissions_of(role: Role) -> PermissionSet {
        PermissionSet::for_roles(&[role])
    }
}

/// Fixture for report rows
pub struct ReportFixtures;

impl ReportFixtures {
    pub fn day(date: NaiveDate, amount: i64) -> SummaryRow {
        SummaryRow {
            period: date.format("%Y-%m-%d").to_string(),
            total_invoices: 3,
            total_batches: 1,
            total_amount: Vnd::new(amount),
            total_fee: Vnd::new(amount / 10),
            total_new_customers: 1,
        }
    }

    /// One row per day of March 2024 with a rising amount
    pub fn march_2024() -> Vec<SummaryRow> {
        (1..=31)
            .filter_map(|d| NaiveDate::from_ymd_opt(2024, 3, d))
            .enumerate()
            .map(|(i, date)| Self::day(date, 1_000_000 * (i as i64 + 1)))
            .collect()
    }

    pub fn commission(sender: &str, amount: i64, commission: i64) -> CommissionRow {
        CommissionRow {
            sender: sender.to_string(),
            total_transactions: 1,
            total_amount: Vnd::new(amount),
            total_commission: Vnd::new(commission),
            ..Default::default()
        }
    }
}
