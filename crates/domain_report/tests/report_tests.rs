//! Tests for domain_report

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{DateRange, Vnd};
use domain_report::ports::mock::MockReportPort;
use domain_report::{
    group_by_due_date, growth, Granularity, RangePreset, ReportPort, SummaryReport, SummaryRow,
    SummaryTotals, UNKNOWN_SENDER,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn row(period: &str, amount: i64, fee: i64) -> SummaryRow {
    SummaryRow {
        period: period.into(),
        total_invoices: 2,
        total_batches: 1,
        total_amount: Vnd::new(amount),
        total_fee: Vnd::new(fee),
        total_new_customers: 1,
    }
}

// ============================================================================
// Summary totals
// ============================================================================

mod summary_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_totals_ignore_row_order(amounts in prop::collection::vec(0i64..10_000_000, 0..20)) {
            let rows: Vec<SummaryRow> = amounts
                .iter()
                .enumerate()
                .map(|(i, a)| row(&format!("2024-01-{:02}", i % 28 + 1), *a, a / 10))
                .collect();
            let mut reversed = rows.clone();
            reversed.reverse();
            prop_assert_eq!(SummaryTotals::of(&rows), SummaryTotals::of(&reversed));
            prop_assert_eq!(SummaryTotals::of(&rows).amount, Vnd::new(amounts.iter().sum()));
        }

        #[test]
        fn test_growth_sign_follows_change(current in 0i64..1_000_000, previous in 1i64..1_000_000) {
            let g = growth(Vnd::new(current), Vnd::new(previous)).unwrap();
            if current >= previous {
                prop_assert!(g >= Decimal::ZERO);
            } else {
                prop_assert!(g <= Decimal::ZERO);
            }
        }
    }

    #[test]
    fn test_report_without_rows_has_no_growth() {
        let report = SummaryReport::from_rows(Vec::new());
        assert!(report.is_empty());
        assert_eq!(report.by_bucket.amount, None);
        assert_eq!(report.totals.amount, Vnd::ZERO);
    }
}

// ============================================================================
// Port round trip
// ============================================================================

mod port_tests {
    use super::*;

    #[tokio::test]
    async fn test_summary_filtered_by_range_and_query_recorded() {
        let port = MockReportPort::new();
        port.set_summary(vec![
            row("2024-02-28", 100, 10),
            row("2024-03-01", 200, 20),
            row("2024-03-31 23:00", 300, 30),
        ])
        .await;

        let range = RangePreset::LastMonth.resolve(d(2024, 4, 5)).unwrap();
        let rows = port.summary(Granularity::Hour, &range, Some("momo")).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            port.calls().await,
            vec!["summary?type=hour&from=2024-03-01&to=2024-03-31&include=momo".to_string()]
        );
    }

    #[tokio::test]
    async fn test_due_calendar_from_port() {
        let port = MockReportPort::new();
        let due = serde_json::from_str(
            r#"[{"id":1,"title":"A","start":"2024-06-03"},{"id":2,"title":"B","start":"2024-07-01","nguoi_gui":"Hà"}]"#,
        )
        .unwrap();
        port.set_due(due).await;

        let june = DateRange::new(d(2024, 6, 1), d(2024, 6, 30)).unwrap();
        let calendar = group_by_due_date(port.due_for_settlement(&june).await.unwrap());
        assert_eq!(calendar.len(), 1);
        assert_eq!(calendar[&d(2024, 6, 3)][UNKNOWN_SENDER].len(), 1);
    }
}
