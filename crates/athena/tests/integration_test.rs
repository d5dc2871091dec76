//! Integration tests for bidboard-athena crate.
//!
//! These tests exercise config, result handling and row conversion together
//! without AWS credentials. Tests marked with `#[ignore]` need a real Athena
//! workgroup and must be run explicitly.

use std::env;
use std::sync::Mutex;

use bidboard_athena::*;
use bidboard_core::Scalar;

// Env-based tests must run serially to avoid interfering with each other.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_athena_env() {
    let keys = [
        "BIDBOARD_PROFILE",
        "ATHENA_ENABLED",
        "ATHENA_REGION",
        "ATHENA_DATABASE",
        "ATHENA_WORKGROUP",
        "ATHENA_OUTPUT_LOCATION",
        "ATHENA_MAX_SCAN_BYTES",
        "ATHENA_TIMEOUT_SECONDS",
        "AWS_REGION",
        "PROD_ATHENA_DATABASE",
        "PROD_ATHENA_OUTPUT_LOCATION",
    ];
    for k in keys {
        env::remove_var(k);
    }
}

fn metadata() -> QueryMetadata {
    QueryMetadata {
        query_id: "q-123".into(),
        bytes_scanned: 0,
        execution_time_ms: 350,
        state: "SUCCEEDED".into(),
        output_location: Some("s3://results/q-123.csv".into()),
    }
}

// ── Config Tests ─────────────────────────────────────────────────────

#[test]
fn test_config_from_env_with_profile() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_athena_env();

    env::set_var("BIDBOARD_PROFILE", "prod");
    env::set_var("ATHENA_DATABASE", "bids_dev");
    env::set_var("PROD_ATHENA_DATABASE", "bids");
    env::set_var("PROD_ATHENA_OUTPUT_LOCATION", "s3://bids-prod/athena/");
    env::set_var("ATHENA_MAX_SCAN_BYTES", "0");

    let cfg = AthenaConfig::from_env();
    assert_eq!(cfg.database, "bids");
    assert_eq!(cfg.output_location, "s3://bids-prod/athena/");
    assert!(cfg.is_configured());
    assert_eq!(cfg.scan_limit(), None);

    clear_athena_env();
}

// ── Result → Rows ────────────────────────────────────────────────────

#[test]
fn test_result_to_rows_keeps_order_and_types() {
    let result = AthenaQueryResult {
        columns: vec![
            AthenaColumn { name: "evaluation_no".into(), data_type: "bigint".into() },
            AthenaColumn { name: "final_status".into(), data_type: "boolean".into() },
            AthenaColumn { name: "evaluated_at".into(), data_type: "timestamp".into() },
        ],
        rows: vec![
            vec![Some("2".into()), Some("false".into()), None],
            vec![Some("1".into()), Some("true".into()), Some("2025-05-01 09:00:00.000".into())],
        ],
        metadata: metadata(),
        pages: 2,
    };

    assert!(result.column_index("evaluation_no").is_some());

    let rows = result_to_rows(&result);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("evaluation_no"), &Scalar::Integer(2));
    assert_eq!(rows[0].get("final_status"), &Scalar::Boolean(false));
    assert!(rows[0].get("evaluated_at").is_null());
    assert_eq!(rows[1].text("evaluated_at").as_deref(), Some("2025-05-01 09:00:00.000"));
}

#[test]
fn test_empty_result() {
    let result = AthenaQueryResult {
        columns: vec![AthenaColumn { name: "company_no".into(), data_type: "bigint".into() }],
        rows: Vec::new(),
        metadata: metadata(),
        pages: 1,
    };
    assert!(result.is_empty());
    assert!(result_to_rows(&result).is_empty());
    assert_eq!(result.cost_estimate_usd(), 0.0);
}

// ── Live (requires AWS) ──────────────────────────────────────────────

#[tokio::test]
#[ignore]
async fn test_live_select_one() {
    let cfg = AthenaConfig::from_env();
    let client = AthenaClient::new(cfg).await.expect("client");
    let rows = client.fetch_rows("SELECT 1 AS one").await.expect("query");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("one"), &Scalar::Integer(1));
    assert_eq!(client.name(), "athena");
}

#[tokio::test]
async fn test_disabled_client_refuses_to_start() {
    let cfg = AthenaConfig {
        enabled: false,
        region: "ap-northeast-1".into(),
        database: "bids".into(),
        workgroup: "primary".into(),
        output_location: "s3://bids/athena/".into(),
        max_scan_bytes: 0,
        timeout_seconds: 5,
    };
    assert!(matches!(AthenaClient::new(cfg).await, Err(AthenaError::NotEnabled)));
}
