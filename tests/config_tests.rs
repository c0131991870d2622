/// Integration tests for loading store configuration
use memento::{wrap, CacheStore, ConfiguredStore, EvictionPolicy, MemoOptions, StoreConfig};

#[derive(serde::Deserialize)]
struct AppConfig {
    name: String,
    cache: StoreConfig,
}

#[test]
fn test_wrapper_from_json_config() {
    let raw = r#"{ "name": "thumbnails", "cache": { "limit": 2, "policy": "LFU" } }"#;
    let config: AppConfig = serde_json::from_str(raw).unwrap();

    let thumbnail = wrap(
        |id: u32| format!("thumb-{id}.png"),
        MemoOptions::new()
            .name(config.name)
            .cache_factory(config.cache.factory()),
    );

    assert_eq!(thumbnail.name(), "thumbnails");
    for id in 0..10 {
        thumbnail.call(id);
    }
    assert_eq!(thumbnail.len(), 2);
    let policy = thumbnail.cache().with_store(|store| match store {
        ConfiguredStore::Bounded(bounded) => Some(bounded.policy()),
        ConfiguredStore::Unbounded(_) => None,
    });
    assert_eq!(policy, Some(EvictionPolicy::LFU));
}

#[test]
fn test_missing_cache_section_is_unbounded() {
    let config: StoreConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, StoreConfig::unbounded());

    let mut store = config.build::<u32, u32>();
    for n in 0..1_000 {
        store.insert(n, n);
    }
    assert_eq!(store.len(), 1_000);
}

#[test]
fn test_policy_names_are_case_insensitive() {
    for (raw, expected) in [
        ("fifo", EvictionPolicy::FIFO),
        ("Lru", EvictionPolicy::LRU),
        ("LFU", EvictionPolicy::LFU),
        ("random", EvictionPolicy::Random),
    ] {
        let json = format!(r#"{{ "limit": 1, "policy": "{raw}" }}"#);
        let config: StoreConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, StoreConfig::bounded(1, expected));
    }
}

#[test]
fn test_invalid_config_rejected() {
    let unknown_policy = serde_json::from_str::<StoreConfig>(r#"{ "policy": "mru" }"#);
    let err = unknown_policy.unwrap_err().to_string();
    assert!(err.contains("unknown eviction policy `mru`"), "{err}");

    assert!(serde_json::from_str::<StoreConfig>(r#"{ "limt": 3 }"#).is_err());
    assert!(serde_json::from_str::<StoreConfig>(r#"{ "limit": -1 }"#).is_err());
}

#[test]
fn test_lenient_policy_parsing_falls_back_to_lru() {
    assert_eq!(EvictionPolicy::from("lfu"), EvictionPolicy::LFU);
    assert_eq!(EvictionPolicy::from("something-else"), EvictionPolicy::LRU);
    assert_eq!("fifo".parse::<EvictionPolicy>(), Ok(EvictionPolicy::FIFO));
    assert!("something-else".parse::<EvictionPolicy>().is_err());
}
