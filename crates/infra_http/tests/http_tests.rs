//! Tests for infra_http against the in-process fake backend

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::StatusCode;
use serde_json::json;

use core_kernel::{BatchId, DateRange, PageRequest, PortError, RecordId, ServerIssue, UserId};
use domain_access::{permission, AccessPort, NewUser, Role, UserUpdate};
use domain_invoice::{
    BatchEditSession, BulkUpsertReconciler, BulkUpsertRequest, CardFilter, CardInvoice, InvoiceFamily,
    InvoicePort, MomoFilter, MomoInvoice, OffsetFilter, OffsetInvoice,
};
use domain_report::{Granularity, ReportPort};
use infra_http::{
    ApiClient, HttpAccessAdapter, HttpConfig, HttpInvoiceAdapter, HttpReportAdapter, SessionEvent,
};
use test_utils::{
    assert_issues, assert_row_rejected, assert_saved, momo_batch, CardInvoiceBuilder, FakeBackend,
    MomoInvoiceBuilder, OffsetInvoiceBuilder, ReportFixtures, UserFixtures, XLSX_BYTES,
};

async fn signed_in(backend: &FakeBackend) -> ApiClient {
    let client = ApiClient::new(HttpConfig::new(backend.base_url())).unwrap();
    client.login("admin", UserFixtures::PASSWORD).await.unwrap();
    client
}

// ============================================================================
// Session Tests
// ============================================================================

mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_sets_cookie_for_later_calls() {
        let backend = FakeBackend::spawn().await;
        let client = signed_in(&backend).await;
        let access = HttpAccessAdapter::new(client);

        let me = access.me().await.unwrap();
        assert_eq!(me.username, "admin");
        assert!(me.has_permission(permission::USER_CREATE));
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let backend = FakeBackend::spawn().await;
        let client = ApiClient::new(HttpConfig::new(backend.base_url())).unwrap();

        let error = client.login("admin", "sai").await.unwrap_err();
        assert!(error.is_unauthorized());
    }

    #[tokio::test]
    async fn test_expired_session_broadcasts_login_required() {
        let backend = FakeBackend::spawn().await;
        let client = signed_in(&backend).await;
        let mut events = client.subscribe();
        let port = HttpInvoiceAdapter::<MomoInvoice>::new(client);

        backend.expire_session().await;
        let error = port.list(&MomoFilter::default(), PageRequest::default()).await.unwrap_err();

        assert!(error.is_unauthorized());
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::LoginRequired {
                path: "/hoa-don/momo/".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_logout_ends_the_session() {
        let backend = FakeBackend::spawn().await;
        let client = signed_in(&backend).await;
        client.logout().await.unwrap();

        let access = HttpAccessAdapter::new(client);
        assert!(access.me().await.unwrap_err().is_unauthorized());
    }
}

// ============================================================================
// Invoice Tests
// ============================================================================

mod invoice_tests {
    use super::*;

    #[tokio::test]
    async fn test_momo_list_arrives_grouped() {
        let backend = FakeBackend::spawn().await;
        backend.seed_records(momo_batch("A", 1, &["100", "200"])).await;
        backend.seed_records(momo_batch("B", 3, &["300"])).await;
        let port = HttpInvoiceAdapter::<MomoInvoice>::new(signed_in(&backend).await);

        let page = port.list(&MomoFilter::default(), PageRequest::new(1, 10)).await.unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].batch_id, BatchId::new("A"));
        assert_eq!(page.items[0].records.len(), 2);
        assert_eq!(page.items[1].records[0].id, RecordId::Persisted(3));
    }

    #[tokio::test]
    async fn test_offset_list_is_grouped_client_side() {
        let backend = FakeBackend::spawn().await;
        backend
            .seed_records(vec![
                OffsetInvoiceBuilder::new().in_batch("X").build(),
                OffsetInvoiceBuilder::new().in_batch("Y").build(),
                OffsetInvoiceBuilder::new().in_batch("X").build(),
            ])
            .await;
        let port = HttpInvoiceAdapter::<OffsetInvoice>::new(signed_in(&backend).await);

        let page = port.list(&OffsetFilter::default(), PageRequest::default()).await.unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].records.len(), 2);
    }

    #[tokio::test]
    async fn test_filter_and_page_travel_in_query() {
        let backend = FakeBackend::spawn().await;
        let port = HttpInvoiceAdapter::<CardInvoice>::new(signed_in(&backend).await);
        let filter = CardFilter {
            customer_name: Some("An".into()),
            ..Default::default()
        };

        port.list(&filter, PageRequest::new(2, 20)).await.unwrap();

        let request = backend.last_request_to("/hoa-don/").await.unwrap();
        let pairs = request.query_pairs();
        assert!(pairs.contains(&("ten_khach".to_string(), "An".to_string())));
        assert!(pairs.contains(&("page".to_string(), "2".to_string())));
        assert!(pairs.contains(&("page_size".to_string(), "20".to_string())));
    }

    #[tokio::test]
    async fn test_stats_decode() {
        let backend = FakeBackend::spawn().await;
        backend
            .seed_records(vec![
                MomoInvoiceBuilder::new().with_amount("100000").with_fee("1000").build(),
                MomoInvoiceBuilder::new().in_batch("Z").with_amount("50000").with_fee("500").build(),
            ])
            .await;
        let port = HttpInvoiceAdapter::<MomoInvoice>::new(signed_in(&backend).await);

        let stats = port.stats(&MomoFilter::default()).await.unwrap();

        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.total_batches, 2);
        assert_eq!(stats.total_amount.amount(), 150_000);
        assert_eq!(stats.total_fee.amount(), 1_500);
    }

    #[tokio::test]
    async fn test_create_missing_name_maps_to_field_issue() {
        let backend = FakeBackend::spawn().await;
        let port = HttpInvoiceAdapter::<CardInvoice>::new(signed_in(&backend).await);

        let error = port
            .create(CardInvoiceBuilder::new().with_customer(None).build())
            .await
            .unwrap_err();

        assert_issues(
            &error,
            &[ServerIssue::general("Field required").with_field("ten_khach")],
        );
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let backend = FakeBackend::spawn().await;
        let port = HttpInvoiceAdapter::<CardInvoice>::new(signed_in(&backend).await);

        let created = port.create(CardInvoiceBuilder::new().build()).await.unwrap();
        let id = created.id.persisted().unwrap();

        let mut changed = created.clone();
        changed.phone = Some("0912000111".into());
        let updated = port.update(id, changed).await.unwrap();
        assert_eq!(updated.phone.as_deref(), Some("0912000111"));

        port.delete(id).await.unwrap();
        assert!(port.delete(id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_batch_removes_every_row() {
        let backend = FakeBackend::spawn().await;
        backend.seed_records(momo_batch("A", 1, &["1", "2", "3"])).await;
        backend.seed_records(momo_batch("B", 4, &["4"])).await;
        let port = HttpInvoiceAdapter::<MomoInvoice>::new(signed_in(&backend).await);

        port.delete_batch(&BatchId::new("A")).await.unwrap();

        assert_eq!(backend.records(InvoiceFamily::Momo).await.len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_upsert_sends_removed_ids() {
        let backend = FakeBackend::spawn().await;
        backend.seed_records(momo_batch("A", 1, &["100", "200"])).await;
        let port = HttpInvoiceAdapter::<MomoInvoice>::new(signed_in(&backend).await);

        let kept = MomoInvoiceBuilder::new().with_id(1).in_batch("A").with_amount("150").build();
        let added = MomoInvoiceBuilder::new().in_batch("A").with_amount("50").build();
        let saved = port
            .bulk_upsert(BulkUpsertRequest {
                records: vec![kept, added],
                removed_ids: vec![2],
            })
            .await
            .unwrap();

        assert_eq!(saved.len(), 2);
        assert!(saved.iter().all(|r| !r.id.is_new()));
        let stored = backend.records(InvoiceFamily::Momo).await;
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|r| r["id"] != json!(2)));
    }

    #[tokio::test]
    async fn test_bulk_rejection_lands_on_rows() {
        let backend = FakeBackend::spawn().await;
        let records = momo_batch("A", 1, &["100", "200"]);
        backend.seed_records(records.clone()).await;
        let port: Arc<dyn InvoicePort<MomoInvoice>> =
            Arc::new(HttpInvoiceAdapter::<MomoInvoice>::new(signed_in(&backend).await));
        backend
            .reject_next_bulk(
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "detail": [{ "loc": ["body", "records", 1, "so_tien"], "msg": "không hợp lệ" }] }),
            )
            .await;

        let reconciler = BulkUpsertReconciler::new(port, Duration::from_secs(5));
        let mut session = BatchEditSession::open(domain_invoice::Batch::new(BatchId::new("A"), records));
        let outcome = reconciler.save(&mut session).await.unwrap();

        assert_row_rejected(&outcome, 1, "không hợp lệ");
    }

    #[tokio::test]
    async fn test_unknown_id_in_bulk_is_reported_by_index() {
        let backend = FakeBackend::spawn().await;
        let port = HttpInvoiceAdapter::<MomoInvoice>::new(signed_in(&backend).await);

        let error = port
            .bulk_upsert(BulkUpsertRequest {
                records: vec![MomoInvoiceBuilder::new().with_id(77).build()],
                removed_ids: vec![],
            })
            .await
            .unwrap_err();

        assert_eq!(error.issues()[0].index, Some(0));
    }

    #[tokio::test]
    async fn test_bulk_save_through_reconciler() {
        let backend = FakeBackend::spawn().await;
        let records = momo_batch("A", 1, &["100"]);
        backend.seed_records(records.clone()).await;
        let port: Arc<dyn InvoicePort<MomoInvoice>> =
            Arc::new(HttpInvoiceAdapter::<MomoInvoice>::new(signed_in(&backend).await));

        let reconciler = BulkUpsertReconciler::new(port, Duration::from_secs(5));
        let mut session = BatchEditSession::open(domain_invoice::Batch::new(BatchId::new("A"), records));
        let saved = assert_saved(reconciler.save(&mut session).await.unwrap());

        assert_eq!(saved.len(), 1);
    }

    #[tokio::test]
    async fn test_export_uses_family_filename() {
        let backend = FakeBackend::spawn().await;
        let port = HttpInvoiceAdapter::<OffsetInvoice>::new(signed_in(&backend).await);

        let file = port.export(&OffsetFilter::default()).await.unwrap();

        assert_eq!(file.filename, "doi-ung.xlsx");
        assert_eq!(file.bytes, XLSX_BYTES);
        assert!(backend.last_request_to("/hoa-don/doi-ung/export-excel").await.is_some());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_connection_error() {
        let client = ApiClient::new(HttpConfig::new("http://127.0.0.1:1").request_timeout(Duration::from_secs(2))).unwrap();
        let port = HttpInvoiceAdapter::<MomoInvoice>::new(client);

        let error = port.stats(&MomoFilter::default()).await.unwrap_err();
        assert!(error.is_transient(), "unexpected {:?}", error);
    }
}

// ============================================================================
// Access Tests
// ============================================================================

mod access_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_list_users() {
        let backend = FakeBackend::spawn().await;
        let access = HttpAccessAdapter::new(signed_in(&backend).await);

        let created = access
            .create_user(NewUser {
                username: "thu".into(),
                email: "thu@example.com".into(),
                name: "Thu".into(),
                password: "matkhau".into(),
                role: Role::Manager,
            })
            .await
            .unwrap();

        assert_eq!(created.role(), Some(Role::Manager));
        let users = access.list_users().await.unwrap();
        assert!(users.iter().any(|u| u.username == "thu"));
    }

    #[tokio::test]
    async fn test_update_and_delete_user() {
        let backend = FakeBackend::spawn().await;
        let access = HttpAccessAdapter::new(signed_in(&backend).await);
        let viewer = UserFixtures::viewer().id;

        let updated = access
            .update_user(
                viewer,
                UserUpdate {
                    email: Some("moi@example.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email, "moi@example.com");

        access.delete_user(viewer).await.unwrap();
        assert!(access.get_user(viewer).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_grant_and_revoke_permission() {
        let backend = FakeBackend::spawn().await;
        let access = HttpAccessAdapter::new(signed_in(&backend).await);
        let viewer = UserFixtures::viewer().id;

        access.add_permission(viewer, permission::BILL_EXPORT).await.unwrap();
        assert!(access
            .user_permissions(viewer)
            .await
            .unwrap()
            .contains(&permission::BILL_EXPORT.to_string()));

        access.remove_permission(viewer, permission::BILL_EXPORT).await.unwrap();
        let remaining = backend.permissions_of(viewer.value()).await.unwrap();
        assert!(!remaining.has(permission::BILL_EXPORT));
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let backend = FakeBackend::spawn().await;
        let access = HttpAccessAdapter::new(signed_in(&backend).await);

        let error = access.get_user(UserId::new(404)).await.unwrap_err();
        assert!(matches!(error, PortError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_permission_catalogue() {
        let backend = FakeBackend::spawn().await;
        let access = HttpAccessAdapter::new(signed_in(&backend).await);

        let listed = access.list_permissions().await.unwrap();
        assert_eq!(listed.len(), permission::ALL.len());
    }
}

// ============================================================================
// Report Tests
// ============================================================================

mod report_tests {
    use super::*;

    fn march() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_summary_query_and_rows() {
        let backend = FakeBackend::spawn().await;
        backend.set_summary(ReportFixtures::march_2024()).await;
        let reports = HttpReportAdapter::new(signed_in(&backend).await);

        let rows = reports.summary(Granularity::Day, &march(), Some("momo")).await.unwrap();

        assert_eq!(rows.len(), 10);
        let request = backend.last_request_to("/report/summary").await.unwrap();
        let pairs = request.query_pairs();
        assert!(pairs.contains(&("type".to_string(), "day".to_string())));
        assert!(pairs.contains(&("from".to_string(), "2024-03-01".to_string())));
        assert!(pairs.contains(&("include".to_string(), "momo".to_string())));
    }

    #[tokio::test]
    async fn test_blank_include_is_left_out() {
        let backend = FakeBackend::spawn().await;
        let reports = HttpReportAdapter::new(signed_in(&backend).await);

        reports.summary(Granularity::Month, &march(), Some("  ")).await.unwrap();

        let request = backend.last_request_to("/report/summary").await.unwrap();
        assert!(request.query_pairs().iter().all(|(k, _)| k != "include"));
    }

    #[tokio::test]
    async fn test_commission_rows() {
        let backend = FakeBackend::spawn().await;
        backend
            .set_commission(vec![ReportFixtures::commission("Lan", 10_000_000, 2_000)])
            .await;
        let reports = HttpReportAdapter::new(signed_in(&backend).await);

        let rows = reports.commission_by_sender(&march()).await.unwrap();

        assert_eq!(rows[0].sender, "Lan");
        assert_eq!(rows[0].final_commission().unwrap().amount(), 2_000);
    }
}
