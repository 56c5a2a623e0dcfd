//! Tests for domain_invoice

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use core_kernel::{AmountText, BatchId, PageRequest, RecordId, ServerIssue, Vnd};

use domain_invoice::batch::{aggregate, group_by_batch, Batch};
use domain_invoice::card::{CardField, CardInvoice};
use domain_invoice::editor::{BatchEditSession, EditorState};
use domain_invoice::fee::derive_fee;
use domain_invoice::field::FieldValue;
use domain_invoice::filter::{CardFilter, MomoFilter};
use domain_invoice::momo::{MomoField, MomoInvoice};
use domain_invoice::ports::mock::MockInvoicePort;
use domain_invoice::ports::InvoicePort;
use domain_invoice::projection::project_common;
use domain_invoice::reconcile::{BulkUpsertReconciler, SaveOutcome};
use domain_invoice::record::InvoiceRecord;
use domain_invoice::InvoiceError;

fn momo(id: i64, batch: &str, amount: &str) -> MomoInvoice {
    MomoInvoice {
        id: RecordId::Persisted(id),
        batch_id: BatchId::new(batch),
        amount: AmountText::new(amount),
        ..Default::default()
    }
}

// ============================================================================
// Grouping
// ============================================================================

mod grouping_tests {
    use super::*;

    fn arb_rows() -> impl Strategy<Value = Vec<MomoInvoice>> {
        prop::collection::vec((0..4usize, 0..1_000_000i64), 0..30).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (b, amount))| momo(i as i64 + 1, ["A", "B", "C", "D"][b], &amount.to_string()))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn test_grouping_partitions_records(rows in arb_rows()) {
            let batches = group_by_batch(rows.clone());
            let total: usize = batches.iter().map(|b| b.len()).sum();
            prop_assert_eq!(total, rows.len());
            for batch in &batches {
                prop_assert!(batch.records.iter().all(|r| r.batch_id == batch.batch_id));
            }
        }

        #[test]
        fn test_grouping_is_idempotent(rows in arb_rows()) {
            let once = group_by_batch(rows);
            let flattened: Vec<MomoInvoice> = once.iter().flat_map(|b| b.records.clone()).collect();
            prop_assert_eq!(group_by_batch(flattened), once);
        }

        #[test]
        fn test_aggregate_ignores_order(mut rows in arb_rows()) {
            let forward = aggregate(&rows);
            rows.reverse();
            prop_assert_eq!(aggregate(&rows), forward);
        }
    }

    #[test]
    fn test_empty_input_gives_no_batches() {
        assert!(group_by_batch(Vec::<MomoInvoice>::new()).is_empty());
    }
}

// ============================================================================
// Projection
// ============================================================================

mod projection_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_projection_is_unanimous_or_empty(notes in prop::collection::vec(prop::sample::select(vec!["a", "b"]), 1..8)) {
            let rows: Vec<MomoInvoice> = notes
                .iter()
                .enumerate()
                .map(|(i, n)| MomoInvoice { note: Some(n.to_string()), ..momo(i as i64, "A", "1") })
                .collect();
            let common = project_common(&rows, &[MomoField::Note]);
            let unanimous = notes.iter().all(|n| *n == notes[0]);
            if unanimous {
                prop_assert_eq!(common.get(MomoField::Note), &FieldValue::text(notes[0]));
            } else {
                prop_assert!(common.get(MomoField::Note).is_empty());
            }
        }
    }
}

// ============================================================================
// Fee
// ============================================================================

mod fee_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_fee_is_floor_of_tenth(amount in 0i64..10_000_000_000) {
            let fee = derive_fee(&AmountText::from(Vnd::new(amount))).unwrap();
            prop_assert_eq!(fee.parse().unwrap(), Some(Vnd::new(amount / 10)));
        }

        #[test]
        fn test_fee_never_exceeds_amount(amount in 0i64..10_000_000_000) {
            let fee = derive_fee(&AmountText::from(Vnd::new(amount))).unwrap().lenient();
            prop_assert!(fee.amount() <= amount);
        }
    }

    #[test]
    fn test_fee_examples() {
        assert_eq!(derive_fee(&"100000".into()).unwrap().as_str(), "10000");
        assert_eq!(derive_fee(&"99".into()).unwrap().as_str(), "9");
        assert_eq!(derive_fee(&"0".into()).unwrap().as_str(), "0");
    }

    #[test]
    fn test_decimal_string_amount_gives_tenth_fee() {
        let row: MomoInvoice = serde_json::from_str(r#"{"so_tien": "100000.00", "phi_cong_ty_thu": null}"#).unwrap();
        assert_eq!(derive_fee(row.gross_amount()).unwrap().as_str(), "10000");
    }
}

// ============================================================================
// Edit and save flow against the in-memory port
// ============================================================================

mod save_flow_tests {
    use super::*;

    async fn setup() -> (Arc<MockInvoicePort<MomoInvoice>>, BulkUpsertReconciler<MomoInvoice>) {
        let port = Arc::new(
            MockInvoicePort::with_records(vec![momo(1, "M1", "100000"), momo(2, "M1", "200000")]).await,
        );
        let reconciler = BulkUpsertReconciler::new(port.clone(), Duration::from_secs(5));
        (port, reconciler)
    }

    async fn open(port: &MockInvoicePort<MomoInvoice>) -> BatchEditSession<MomoInvoice> {
        let page = port.list(&MomoFilter::default(), PageRequest::default()).await.unwrap();
        BatchEditSession::open(page.items.into_iter().next().unwrap())
    }

    #[tokio::test]
    async fn test_save_recomputes_transfer_out_and_persists() {
        let (port, reconciler) = setup().await;
        let mut session = open(&port).await;

        let outcome = reconciler.save(&mut session).await.unwrap();

        assert!(outcome.is_saved());
        assert_eq!(session.state(), EditorState::Saved);
        let stored = port.snapshot().await;
        assert!(stored.iter().all(|r| r.transfer_out.as_str() == "270000"));
    }

    #[tokio::test]
    async fn test_invalid_new_row_never_reaches_backend() {
        let (port, reconciler) = setup().await;
        let mut session = open(&port).await;
        session.add_row().unwrap();

        let err = reconciler.save(&mut session).await.unwrap_err();

        assert!(matches!(err, InvoiceError::Invalid(_)));
        assert_eq!(port.bulk_calls(), 0);
        assert_eq!(session.state(), EditorState::Error);
        assert!(!session.row_messages(2).is_empty());
    }

    #[tokio::test]
    async fn test_complete_new_row_is_created_with_the_batch() {
        let (port, reconciler) = setup().await;
        let mut session = open(&port).await;
        let row = session.add_row().unwrap();
        for (field, raw) in [
            (MomoField::CustomerName, "Nguyễn Văn A"),
            (MomoField::CustomerCode, "PE01"),
            (MomoField::Address, "Hà Nội"),
            (MomoField::SentAt, "06/05/2024 14:00:00"),
            (MomoField::TransactionCode, "GD-9"),
            (MomoField::Amount, "50000"),
        ] {
            session.apply_row_input(row, field, raw).unwrap();
        }

        let outcome = reconciler.save(&mut session).await.unwrap();

        match outcome {
            SaveOutcome::Saved { records } => {
                assert_eq!(records.len(), 3);
                assert_eq!(records[2].id, RecordId::Persisted(3));
                assert_eq!(records[2].company_fee.as_str(), "5000");
            }
            other => panic!("expected save, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_rejection_maps_to_rows() {
        let (port, reconciler) = setup().await;
        port.reject_next_bulk(vec![
            ServerIssue::at_row(0, "mã giao dịch trùng"),
            ServerIssue::general("batch bị khóa"),
        ])
        .await;
        let mut session = open(&port).await;

        let outcome = reconciler.save(&mut session).await.unwrap();

        assert_eq!(session.state(), EditorState::SubmitError);
        assert_eq!(session.row_messages(0), vec!["Hóa đơn số 1: mã giao dịch trùng".to_string()]);
        assert_eq!(session.banner(), &["batch bị khóa".to_string()]);
        assert!(!outcome.is_saved());

        // edits survive and a retry goes through
        assert!(reconciler.save(&mut session).await.unwrap().is_saved());
        assert_eq!(port.bulk_calls(), 2);
    }

    fn backend_rows(json: &str) -> Vec<MomoInvoice> {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_decimal_amounts_from_backend_save_with_tenth_fee() {
        let rows = backend_rows(
            r#"[
                {"id": 1, "batch_id": "M9", "so_tien": "100000.00", "phi_cong_ty_thu": null},
                {"id": 2, "batch_id": "M9", "so_tien": "200000.00", "phi_cong_ty_thu": null}
            ]"#,
        );
        let port = Arc::new(MockInvoicePort::with_records(rows).await);
        let reconciler = BulkUpsertReconciler::new(port.clone(), Duration::from_secs(5));
        let mut session = open(&port).await;

        let outcome = reconciler.save(&mut session).await.unwrap();

        assert!(outcome.is_saved());
        let stored = port.snapshot().await;
        assert_eq!(stored[0].company_fee.as_str(), "10000");
        assert_eq!(stored[1].company_fee.as_str(), "20000");
        assert!(stored.iter().all(|r| r.transfer_out.as_str() == "270000"));
    }

    #[tokio::test]
    async fn test_stored_fees_above_amounts_are_explained_and_fixable() {
        let rows = backend_rows(
            r#"[
                {"id": 1, "batch_id": "M9", "so_tien": 1000, "phi_cong_ty_thu": "50000"},
                {"id": 2, "batch_id": "M9", "so_tien": "2000.00", "phi_cong_ty_thu": null}
            ]"#,
        );
        let port = Arc::new(MockInvoicePort::with_records(rows).await);
        let reconciler = BulkUpsertReconciler::new(port.clone(), Duration::from_secs(5));
        let mut session = open(&port).await;

        let err = reconciler.save(&mut session).await.unwrap_err();

        assert!(matches!(err, InvoiceError::NegativeTransferOut { .. }));
        assert_eq!(port.bulk_calls(), 0);
        assert_eq!(session.banner().len(), 1);

        session.apply_row_input(0, MomoField::Amount, "500000").unwrap();
        let outcome = reconciler.save(&mut session).await.unwrap();

        assert!(outcome.is_saved());
        let stored = port.snapshot().await;
        assert_eq!(stored[0].company_fee.as_str(), "50000");
        assert!(stored.iter().all(|r| r.transfer_out.as_str() == "451800"));
    }

    #[tokio::test]
    async fn test_removed_row_is_deleted_on_save() {
        let (port, reconciler) = setup().await;
        let mut session = open(&port).await;
        session.remove_row(0).unwrap();
        assert_eq!(port.snapshot().await.len(), 2);

        reconciler.save(&mut session).await.unwrap();

        let stored = port.snapshot().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, RecordId::Persisted(2));
    }
}

// ============================================================================
// Card batches
// ============================================================================

mod card_batch_tests {
    use super::*;

    fn card(id: i64, phone: &str) -> CardInvoice {
        CardInvoice {
            id: RecordId::Persisted(id),
            batch_id: BatchId::new("C1"),
            phone: Some(phone.to_string()),
            gross_amount: "100000".into(),
            transfer_out: "90000".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_common_phone_edit_is_validated_on_every_row() {
        let mut session = BatchEditSession::open(Batch::new(BatchId::new("C1"), vec![card(1, "09"), card(2, "08")]));
        session.apply_common_input(CardField::Phone, "09x").unwrap();

        let err = session.begin_save().unwrap_err();

        match err {
            InvoiceError::Invalid(report) => assert_eq!(report.invalid_rows().len(), 2),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_card_transfer_out_follows_common_field() {
        let mut session = BatchEditSession::open(Batch::new(BatchId::new("C1"), vec![card(1, "09"), card(2, "09")]));
        session.apply_common_input(CardField::TransferOut, "150000").unwrap();

        let request = session.begin_save().unwrap();

        assert!(request.records.iter().all(|r| r.transfer_out.as_str() == "150000"));
    }

    #[tokio::test]
    async fn test_card_filter_reaches_mock() {
        let port = MockInvoicePort::with_records(vec![card(1, "0901"), card(2, "0802")]).await;
        let filter = CardFilter {
            phone: Some("0901".into()),
            ..Default::default()
        };
        let stats = port.stats(&filter).await.unwrap();
        assert_eq!(stats.total_records, 1);
        assert_eq!(stats.total_amount, Vnd::new(100_000));
    }
}
