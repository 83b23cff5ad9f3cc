//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::BTreeSet;

use autoconf::{CheckConfig, MemoryStore};

/// The store from the redis/broken scenario, rooted at `/templates`.
pub fn scenario_store() -> MemoryStore {
    MemoryStore::from_leaves([
        ("/templates/redis/instances", r#"[{"host":"localhost"}]"#),
        ("/templates/redis/check_names", "redisdb"),
        ("/templates/redis/init_configs", "[{}]"),
        ("/templates/broken/instances", "[{}]"),
        ("/templates/broken/check_names", "broken"),
    ])
}

/// Add a complete template named `name` under `/templates`.
pub async fn add_template(
    store: &MemoryStore,
    name: &str,
    check_names: &str,
    init_configs: &str,
    instances: &str,
) {
    store.insert(format!("/templates/{name}/check_names"), check_names).await;
    store.insert(format!("/templates/{name}/init_configs"), init_configs).await;
    store.insert(format!("/templates/{name}/instances"), instances).await;
}

/// Order-insensitive view of a result set.
pub fn as_set(configs: &[CheckConfig]) -> BTreeSet<String> {
    configs
        .iter()
        .map(|c| serde_json::to_string(c).expect("check config serializes"))
        .collect()
}
