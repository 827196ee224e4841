//! Flare Mesh Discovery
//!
//! 服务网格控制面的实例级服务发现归并引擎：接收发现分组的实例变更，按 revision
//! 解析导出服务元数据，归并出每个逻辑服务的端点列表，并推送给订阅者。

pub mod config;
pub mod discovery;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Re-exports
pub use config::{Config, DiscoveryConfig, LoggingConfig, MetadataConfig, NotifyConfig};
pub use error::{ErrorBuilder, ErrorCategory, ErrorCode, FlareError, Result};
pub use metrics::{MetricsCollector, ReconcileMetrics};
pub use telemetry::init_tracing;

pub use discovery::{
    DiscoveryEvent, Endpoint, EndpointProjector, EventAction, EventListener, EventType,
    InstanceChangeReconciler, InstancesChangedEvent, MetadataDocument, MetadataProxyFactory,
    MetadataResolver, MetadataServiceProxy, NotifyListener, PhysicalInstance, ReconcilerFactory,
    RemoteMetadataClient, RevisionSet, ServiceDescriptor, ServiceEvent, SnapshotReducer,
    StorageAwareResolver, StorageType,
};
