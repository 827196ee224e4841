//! 归并引擎工厂
//!
//! 从配置组装解析器与引擎

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::discovery::reconciler::InstanceChangeReconciler;
use crate::discovery::resolver::{MetadataProxyFactory, RemoteMetadataClient, StorageAwareResolver};
use crate::error::{FlareError, Result};

/// 归并引擎工厂
pub struct ReconcilerFactory;

impl ReconcilerFactory {
    /// 从配置创建按存储方式分派的解析器
    pub fn create_resolver(
        config: &Config,
        proxy_factory: Arc<dyn MetadataProxyFactory>,
        remote: Option<Arc<dyn RemoteMetadataClient>>,
    ) -> StorageAwareResolver {
        let mut resolver = StorageAwareResolver::new(proxy_factory)
            .with_default_storage(config.metadata.default_storage_type)
            .with_timeout(config.metadata.resolve_timeout());
        if let Some(remote) = remote {
            resolver = resolver.with_remote(remote);
        }
        resolver
    }

    /// 从配置创建归并引擎
    ///
    /// # 参数
    /// * `config` - 配置，`discovery.tracked_groups` 不能为空
    /// * `proxy_factory` - 本地元数据服务代理工厂
    /// * `remote` - 远程元数据中心客户端（可选）
    pub fn create(
        config: &Config,
        proxy_factory: Arc<dyn MetadataProxyFactory>,
        remote: Option<Arc<dyn RemoteMetadataClient>>,
    ) -> Result<Arc<InstanceChangeReconciler>> {
        if config.discovery.tracked_groups.is_empty() {
            return Err(FlareError::configuration_error(
                "discovery.tracked_groups 不能为空",
            ));
        }

        let resolver = Self::create_resolver(config, proxy_factory, remote);
        let reconciler = InstanceChangeReconciler::new(
            config.discovery.tracked_groups.iter().cloned(),
            Arc::new(resolver),
        )
        .with_emit_removals(config.notify.emit_removals);

        info!(
            groups = ?config.discovery.tracked_groups,
            default_storage = %config.metadata.default_storage_type,
            emit_removals = config.notify.emit_removals,
            "instance change reconciler created"
        );
        Ok(Arc::new(reconciler))
    }
}
