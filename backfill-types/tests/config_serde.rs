use std::io::Write;
use std::time::Duration;

use backfill_types::{
    BackfillConfig, BackfillError, Credentials, CredentialsFile, FetchFailurePolicy,
    MalformedRowPolicy,
};

#[test]
fn config_defaults() {
    let cfg = BackfillConfig::default();
    assert_eq!(cfg.fetch_failure, FetchFailurePolicy::Skip);
    assert_eq!(cfg.malformed_rows, MalformedRowPolicy::Skip);
    assert!(cfg.assemble.sort_by_open_time);
    assert!(!cfg.assemble.dedup_by_open_time);
    assert_eq!(cfg.max_in_flight, 1);
    assert_eq!(cfg.request_timeout, None);
}

#[test]
fn config_roundtrip() {
    let mut cfg = BackfillConfig::default();
    cfg.fetch_failure = FetchFailurePolicy::Abort;
    cfg.request_timeout = Some(Duration::from_secs(30));
    cfg.max_in_flight = 4;

    let json = serde_json::to_string(&cfg).expect("serialize config");
    assert!(json.contains("\"abort\""));
    let de: BackfillConfig = serde_json::from_str(&json).expect("deserialize config");
    assert_eq!(de, cfg);
}

#[test]
fn credentials_debug_redacts_secret() {
    let creds = Credentials::new("public-key", "very-secret");
    let dbg = format!("{creds:?}");
    assert!(dbg.contains("public-key"));
    assert!(!dbg.contains("very-secret"));
}

#[test]
fn credentials_file_loads_pairs() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"{{"binance_api_key":"bk","binance_api_secret":"bs","coinbase_key":"ck"}}"#
    )
    .expect("write creds");

    let loaded = CredentialsFile::load(file.path()).expect("load creds");
    let binance = loaded.binance().expect("binance pair");
    assert_eq!(binance.key, "bk");
    assert_eq!(binance.secret, "bs");

    let err = loaded.coinbase().unwrap_err();
    assert_eq!(
        err,
        BackfillError::ConfigMissing {
            what: "coinbase_secret".into()
        }
    );
}

#[test]
fn missing_credentials_file_is_config_missing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = CredentialsFile::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, BackfillError::ConfigMissing { .. }));
}

#[test]
fn env_credentials_report_first_missing_var() {
    let err = Credentials::from_env(
        "BACKFILL_TEST_UNSET_KEY_VAR",
        "BACKFILL_TEST_UNSET_SECRET_VAR",
    )
    .unwrap_err();
    assert!(err.to_string().contains("BACKFILL_TEST_UNSET_KEY_VAR"));
}
