//! Integration coverage for the monitoring store against a disposable Postgres.

use chrono::{Duration, Utc};
use healthtrack_core::model::{CheckOutcome, NewService};
use healthtrack_data::{DataError, MonitorStore};
use healthtrack_events::CheckStatus;
use healthtrack_test_support::start_postgres;

#[tokio::test]
async fn service_and_check_lifecycle() {
    let Ok(database) = start_postgres() else {
        eprintln!("skipping store integration test: no Postgres available");
        return;
    };

    let store = MonitorStore::connect(database.connection_string())
        .await
        .expect("store connects and migrates");
    store.ping().await.expect("database answers");

    let created = store
        .insert_service(&NewService {
            name: "checkout".to_string(),
            url: "https://checkout.internal/health".to_string(),
            interval_seconds: 30,
            timeout_seconds: 5,
        })
        .await
        .expect("service inserts");
    assert_eq!(created.interval_seconds, 30);

    let listed = store.list_services().await.expect("services list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], created);

    let fetched = store
        .fetch_service(created.id)
        .await
        .expect("fetch succeeds")
        .expect("service exists");
    assert_eq!(fetched.name, "checkout");

    let duplicate = store
        .insert_service(&NewService::with_defaults(
            "checkout",
            "https://elsewhere.internal/health",
        ))
        .await
        .expect_err("duplicate name must conflict");
    assert!(matches!(duplicate, DataError::DuplicateName { name } if name == "checkout"));

    store
        .record_check(
            created.id,
            &CheckOutcome::responded(CheckStatus::Ok, 120.0),
        )
        .await
        .expect("check persists");
    store
        .record_check(created.id, &CheckOutcome::down("connection refused"))
        .await
        .expect("down check persists");

    let recent = store
        .recent_checks(created.id, 50)
        .await
        .expect("recent checks load");
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].status, CheckStatus::Down);
    assert_eq!(recent[0].error.as_deref(), Some("connection refused"));
    assert_eq!(recent[1].status, CheckStatus::Ok);
    assert_eq!(recent[1].response_time_ms, Some(120.0));

    let windowed = store
        .checks_since(created.id, Utc::now() - Duration::hours(24))
        .await
        .expect("windowed checks load");
    assert_eq!(windowed.len(), 2);
    assert!(windowed[0].timestamp <= windowed[1].timestamp);

    assert!(
        store
            .delete_service(created.id)
            .await
            .expect("delete succeeds")
    );
    assert!(
        !store
            .delete_service(created.id)
            .await
            .expect("second delete succeeds")
    );
    let orphaned = store
        .recent_checks(created.id, 10)
        .await
        .expect("check query succeeds");
    assert!(orphaned.is_empty(), "cascade removes check history");
}
