use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn from_lookup_defaults() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("HOME", "/home/nurse")])).unwrap();
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.auth_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.search_debounce, Duration::from_millis(500));
    assert_eq!(cfg.timeouts, HttpTimeouts::default());
    assert_eq!(cfg.token_path, PathBuf::from("/home/nurse/.medlink/session.json"));
    assert!(cfg.demo_login);
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("MEDLINK_API_BASE_URL", "https://records.example.test/"),
        ("MEDLINK_AUTH_BASE_URL", "https://auth.example.test"),
        ("MEDLINK_SEARCH_DEBOUNCE_MS", "250"),
        ("MEDLINK_REQUEST_TIMEOUT_SECS", "5"),
        ("MEDLINK_CONNECT_TIMEOUT_SECS", "2"),
        ("MEDLINK_TOKEN_PATH", "/tmp/medlink-token.json"),
        ("MEDLINK_DEMO_LOGIN", "off"),
    ]))
    .unwrap();
    assert_eq!(cfg.api_base_url, "https://records.example.test");
    assert_eq!(cfg.auth_base_url, "https://auth.example.test");
    assert_eq!(cfg.search_debounce, Duration::from_millis(250));
    assert_eq!(cfg.timeouts, HttpTimeouts { request_secs: 5, connect_secs: 2 });
    assert_eq!(cfg.token_path, PathBuf::from("/tmp/medlink-token.json"));
    assert!(!cfg.demo_login);
}

#[test]
fn unparseable_numbers_fall_back_to_defaults() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("MEDLINK_SEARCH_DEBOUNCE_MS", "soon")])).unwrap();
    assert_eq!(cfg.search_debounce, Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS));
}

#[test]
fn rejects_base_url_without_scheme() {
    let err = ClientConfig::from_lookup(lookup_from(&[("MEDLINK_API_BASE_URL", "records.example.test")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBaseUrl { var: "MEDLINK_API_BASE_URL", .. }));
}

#[test]
fn with_base_url_overrides_both_hosts() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("MEDLINK_AUTH_BASE_URL", "https://auth.example.test")]))
        .unwrap()
        .with_base_url("http://localhost:9000/")
        .unwrap();
    assert_eq!(cfg.api_base_url, "http://localhost:9000");
    assert_eq!(cfg.auth_base_url, "http://localhost:9000");
}

#[test]
fn parse_bool_variants() {
    for raw in ["1", "true", "YES", " on "] {
        assert_eq!(parse_bool(raw), Some(true), "expected true for {raw:?}");
    }
    for raw in ["0", "false", "No", "off"] {
        assert_eq!(parse_bool(raw), Some(false), "expected false for {raw:?}");
    }
    assert_eq!(parse_bool("maybe"), None);
}
