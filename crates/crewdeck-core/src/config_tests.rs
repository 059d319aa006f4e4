//! Config module tests

use std::time::Duration;

use crate::config::{CacheConfig, Config, StoreConfig};

#[test]
fn test_config_default() {
    let config = Config::default();

    // Store latencies mirror the dashboard's mock API
    assert_eq!(config.store.agents_latency_ms, 500);
    assert_eq!(config.store.configs_latency_ms, 500);
    assert_eq!(config.store.logs_latency_ms, 300);
    assert_eq!(config.store.write_latency_ms, 1000);
    assert_eq!(config.store.delete_latency_ms, 500);
    assert_eq!(config.store.jitter_ms, 0);

    assert_eq!(config.cache.agents_refetch_interval_ms, 5000);
    assert_eq!(config.cache.fetch_timeout_ms, 10_000);
    assert_eq!(config.mutation.timeout_ms, 10_000);
}

#[test]
fn test_refetch_interval_disabled_at_zero() {
    let cache = CacheConfig {
        agents_refetch_interval_ms: 0,
        ..CacheConfig::default()
    };
    assert_eq!(cache.agents_refetch_interval(), None);
    assert_eq!(
        CacheConfig::default().agents_refetch_interval(),
        Some(Duration::from_secs(5))
    );
}

#[test]
fn test_instant_store() {
    let store = StoreConfig::instant();
    assert_eq!(store.agents_latency_ms, 0);
    assert_eq!(store.write_latency_ms, 0);
}

#[test]
fn test_get_and_set() {
    let mut config = Config::default();
    config.set("store.jitter_ms", "25").unwrap();
    assert_eq!(config.get("store.jitter_ms").unwrap(), "25");

    config.set("mutation.timeout_ms", " 2500 ").unwrap();
    assert_eq!(config.mutation.timeout_ms, 2500);
}

#[test]
fn test_set_rejects_bad_values() {
    let mut config = Config::default();
    assert!(config.set("store.jitter_ms", "soon").is_err());
    assert!(config.set("cache.fetch_timeout_ms", "0").is_err());
    assert!(config.set("no.such.key", "1").is_err());
    assert!(config.set("config_path", "1").is_err());
    assert_eq!(config, Config::default());
}

#[test]
fn test_list_contains_every_key() {
    let config = Config::default();
    let listed = config.list().unwrap();
    assert_eq!(listed.len(), 9);
    assert!(listed.iter().any(|(k, v)| k == "store.agents_latency_ms" && v == "500"));
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.store.jitter_ms = 40;
    config.cache.agents_refetch_interval_ms = 0;
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = Config::load_from(dir.path().join("absent.toml")).unwrap();
    assert_eq!(loaded, Config::default());
}

#[test]
fn test_partial_file_fills_missing_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[mutation]\ntimeout_ms = 750\n").unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.mutation.timeout_ms, 750);
    assert_eq!(loaded.store, StoreConfig::default());
}

#[test]
fn test_load_rejects_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[mutation]\ntimeout_ms = 0\n").unwrap();
    assert!(Config::load_from(&path).is_err());
}
