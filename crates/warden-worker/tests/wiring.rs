//! End-to-end wiring test: builds the full dependency graph against
//! in-memory/temp-backed adapters and drives one empty-queue tick.

use warden_infrastructure::config::AppConfig;

#[path = "../src/wiring.rs"]
mod wiring;

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.persistence.database_url = "sqlite::memory:".to_string();
    config.persistence.max_connections = 1;
    config.watchdog.enabled = false;
    config
}

#[tokio::test]
async fn builds_full_dependency_graph() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config();

    let ctx = wiring::build(&config, dir.path().join("projects")).await.unwrap();

    // an empty queue processes nothing and still returns cleanly
    let processed = ctx.consumer.process_next(&ctx.working_directory_root, 30).await.unwrap();
    assert!(!processed);
}

#[tokio::test]
async fn working_directory_root_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("nested").join("projects");
    let config = test_config();

    wiring::build(&config, root.clone()).await.unwrap();

    assert!(root.is_dir());
}
