use super::*;
use serial_test::serial;
use tempfile::tempdir;

fn clear_env() {
    for var in ["CIDX_SERVER_URL", "CIDX_TOKEN", "CIDX_TIMEOUT", "CIDX_LOG_LEVEL", "MCPB_SERVER_URL", "MCPB_TOKEN", "MCPB_TIMEOUT", "MCPB_LOG_LEVEL"]
    {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn env_beats_file_beats_legacy_beats_default() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"server_url":"https://file.example.com","timeout_secs":60,"log_level":"debug"}"#).unwrap();

    std::env::set_var("MCPB_SERVER_URL", "https://legacy.example.com");
    let resolved = resolve(&path).unwrap();
    assert_eq!(resolved.server_url.value, "https://file.example.com");
    assert_eq!(resolved.server_url.source, Source::File);

    std::env::set_var("CIDX_SERVER_URL", "https://env.example.com");
    let resolved = resolve(&path).unwrap();
    assert_eq!(resolved.server_url.value, "https://env.example.com");
    assert_eq!(resolved.server_url.source, Source::Env);

    clear_env();
    let resolved = resolve(&path).unwrap();
    assert_eq!(resolved.timeout_secs.value, 60);
    assert_eq!(resolved.timeout_secs.source, Source::File);
}

#[test]
#[serial]
fn legacy_env_used_when_no_file_or_modern_env() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.json");
    std::env::set_var("MCPB_LOG_LEVEL", "debug");

    let resolved = resolve(&path).unwrap();
    assert_eq!(resolved.log_level.value, "debug");
    assert_eq!(resolved.log_level.source, Source::LegacyEnv);
    clear_env();
}

#[test]
#[serial]
fn defaults_when_nothing_set() {
    clear_env();
    let dir = tempdir().unwrap();
    let resolved = resolve(&dir.path().join("missing.json")).unwrap();
    assert_eq!(resolved.server_url.value, DEFAULT_SERVER_URL);
    assert_eq!(resolved.server_url.source, Source::Default);
    assert_eq!(resolved.timeout_secs.value, DEFAULT_TIMEOUT_SECS);
}

#[test]
fn validate_rejects_non_https_remote_host() {
    let config = BridgeConfig { server_url: "http://example.com".to_string(), ..Default::default() };
    assert!(validate(&config).is_err());
}

#[test]
fn validate_allows_http_localhost() {
    let config = BridgeConfig { server_url: "http://localhost:8080".to_string(), ..Default::default() };
    assert!(validate(&config).is_ok());
}

#[test]
fn validate_rejects_out_of_range_timeout() {
    let mut config = BridgeConfig::default();
    config.timeout_secs = 0;
    assert!(validate(&config).is_err());
    config.timeout_secs = 301;
    assert!(validate(&config).is_err());
    config.timeout_secs = 300;
    assert!(validate(&config).is_ok());
}

#[test]
fn validate_rejects_unknown_log_level() {
    let mut config = BridgeConfig::default();
    config.log_level = "verbose".to_string();
    assert!(validate(&config).is_err());
}

#[test]
#[cfg(unix)]
fn save_sets_owner_only_permissions() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempdir().unwrap();
    std::env::set_var("HOME", dir.path());
    let config = BridgeConfig::default();
    save(&config).unwrap();
    let meta = std::fs::metadata(config_path()).unwrap();
    assert_eq!(meta.permissions().mode() & 0o777, 0o600);
}
