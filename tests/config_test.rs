//! 配置加载与工厂组装测试

mod common;

use std::sync::Arc;

use common::{FakeProxyFactory, FakeRemoteClient, RecordingListener, document, instance, order_service};
use flare_mesh_discovery::discovery::{
    InstancesChangedEvent, ReconcilerFactory, RemoteMetadataClient, StorageType,
};
use flare_mesh_discovery::{Config, ErrorCode, LoggingConfig, init_tracing};

const SAMPLE: &str = r#"
[discovery]
tracked_groups = ["orders", "payments"]

[metadata]
default_storage_type = "remote"
resolve_timeout_ms = 1500

[notify]
emit_removals = true

[logging]
level = "debug"
json = true
"#;

#[test]
fn parses_full_config() {
    let config = Config::from_toml_str(SAMPLE).unwrap();
    assert_eq!(config.discovery.tracked_groups.len(), 2);
    assert_eq!(config.metadata.default_storage_type, StorageType::Remote);
    assert_eq!(
        config.metadata.resolve_timeout(),
        Some(std::time::Duration::from_millis(1500))
    );
    assert!(config.notify.emit_removals);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
}

#[test]
fn empty_config_uses_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert!(config.discovery.tracked_groups.is_empty());
    assert_eq!(config.metadata.default_storage_type, StorageType::Local);
    assert_eq!(config.metadata.resolve_timeout(), None);
    assert!(!config.notify.emit_removals);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn invalid_config_is_a_configuration_error() {
    let err = Config::from_toml_str("[metadata]\ndefault_storage_type = \"etcd\"\n").unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::ConfigurationError));

    let missing = std::env::temp_dir().join(format!("flare-missing-{}.toml", uuid::Uuid::new_v4()));
    let err = Config::load_from_file(&missing).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::ConfigurationError));
}

#[test]
fn loads_config_from_file() {
    let path = std::env::temp_dir().join(format!("flare-discovery-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(&path, SAMPLE).unwrap();
    let config = Config::load_from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(config.discovery.tracked_groups.contains("payments"));
}

#[test]
fn factory_rejects_config_without_groups() {
    let err = ReconcilerFactory::create(&Config::default(), FakeProxyFactory::new(), None)
        .err()
        .unwrap();
    assert_eq!(err.code(), Some(ErrorCode::ConfigurationError));
}

#[tokio::test]
async fn factory_wires_storage_default_and_removals() {
    let config = Config::from_toml_str(SAMPLE).unwrap();
    let remote = FakeRemoteClient::new();
    remote.insert("orders-1", document("orders", "r1", &[order_service()]));
    let client: Arc<dyn RemoteMetadataClient> = remote.clone();
    let reconciler = ReconcilerFactory::create(&config, FakeProxyFactory::new(), Some(client)).unwrap();

    let listener = RecordingListener::new();
    reconciler.subscribe("OrderService", listener.clone()).await;
    reconciler
        .reconcile(&InstancesChangedEvent::new(
            "orders",
            vec![instance("orders", "10.0.0.1", 20880, "r1").with_id("orders-1")],
        ))
        .await
        .unwrap();
    reconciler
        .reconcile(&InstancesChangedEvent::new("orders", vec![]))
        .await
        .unwrap();

    // 默认走远程元数据中心
    assert_eq!(remote.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    // 第二轮端点消失，补发 Remove
    let batch = listener.last_batch().unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].action, flare_mesh_discovery::EventAction::Remove);
}

#[test]
fn tracing_init_is_repeatable() {
    let config = LoggingConfig::default();
    init_tracing(&config).unwrap();
    init_tracing(&config).unwrap();

    let bad = LoggingConfig {
        level: "not a level=??".to_string(),
        json: false,
    };
    // RUST_LOG 未设置时才会使用配置中的级别
    if std::env::var("RUST_LOG").is_err() {
        assert!(init_tracing(&bad).is_err());
    }
}
