//! 实例级服务发现归并模块
//!
//! 接收发现分组的实例变更事件，按 revision 解析导出服务元数据，归并出每个
//! 逻辑服务的端点列表，并推送给订阅者。

pub mod endpoint;
pub mod event;
pub mod factory;
pub mod instance;
pub mod listener;
pub mod metadata;
pub mod projector;
pub mod reconciler;
pub mod reducer;
pub mod resolver;

pub use endpoint::{Endpoint, EventAction, ServiceEvent, REGISTRY_INSTANCE, REGISTRY_TYPE_KEY};
pub use event::{
    DiscoveryEvent, EventListener, EventType, HIGHEST_LISTENER_PRIORITY, InstancesChangedEvent,
};
pub use factory::ReconcilerFactory;
pub use instance::{PhysicalInstance, ProtocolPort, StorageType};
pub use listener::{ListenerRegistry, NotifyCallback, NotifyListener};
pub use metadata::{MetadataDocument, RevisionSet, ServiceDescriptor};
pub use projector::{EndpointProjector, Reachable};
pub use reconciler::InstanceChangeReconciler;
pub use reducer::{Reduction, ResolvedInstance, SnapshotReducer};
pub use resolver::{
    LocalMetadataResolver, MetadataProxyFactory, MetadataResolver, MetadataServiceProxy,
    ProxyGuard, RemoteMetadataClient, RemoteMetadataResolver, StorageAwareResolver,
};
