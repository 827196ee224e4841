//! revision 元数据解析
//!
//! 根据实例元数据中的 storage-type 选择获取方式：
//! - **local**: 通过实例自身暴露的元数据服务按 revision 查询
//! - **remote**: 通过元数据中心按实例查询
//!
//! 解析器本身不做重试，重试由传输层或重新投递事件的调用方负责。

pub mod local;
pub mod remote;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::discovery::instance::{PhysicalInstance, StorageType};
use crate::discovery::metadata::MetadataDocument;
use crate::error::{FlareError, Result};

pub use local::{LocalMetadataResolver, MetadataProxyFactory, MetadataServiceProxy, ProxyGuard};
pub use remote::{RemoteMetadataClient, RemoteMetadataResolver};

/// 元数据解析器 trait
///
/// 注意：由于需要动态分发（dyn），使用 async-trait
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// 解析实例在指定 revision 下导出的元数据文档
    async fn resolve(&self, instance: &PhysicalInstance, revision: &str) -> Result<MetadataDocument>;
}

/// 按实例声明的存储方式分派到本地或远程解析
pub struct StorageAwareResolver {
    local: LocalMetadataResolver,
    remote: RemoteMetadataResolver,
    default_storage: StorageType,
    timeout: Option<Duration>,
}

impl StorageAwareResolver {
    pub fn new(proxy_factory: Arc<dyn MetadataProxyFactory>) -> Self {
        Self {
            local: LocalMetadataResolver::new(proxy_factory),
            remote: RemoteMetadataResolver::new(None),
            default_storage: StorageType::Local,
            timeout: None,
        }
    }

    /// 设置远程元数据中心客户端
    pub fn with_remote(mut self, client: Arc<dyn RemoteMetadataClient>) -> Self {
        self.remote = RemoteMetadataResolver::new(Some(client));
        self
    }

    /// 设置实例未声明存储方式时的默认值
    pub fn with_default_storage(mut self, storage_type: StorageType) -> Self {
        self.default_storage = storage_type;
        self
    }

    /// 设置单次解析超时
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// 实例实际使用的存储方式
    pub fn storage_type_of(&self, instance: &PhysicalInstance) -> StorageType {
        instance.storage_type().unwrap_or(self.default_storage)
    }

    async fn resolve_with(
        &self,
        storage_type: StorageType,
        instance: &PhysicalInstance,
        revision: &str,
    ) -> Result<MetadataDocument> {
        let result = match storage_type {
            StorageType::Local => self.local.resolve(instance, revision).await,
            StorageType::Remote => self.remote.resolve(instance, revision).await,
        };
        // 传输层的 IO 错误没有错误代码，统一归为解析失败并带上 revision
        result.map_err(|e| match e {
            FlareError::Io(reason) => FlareError::metadata_resolve_failed(revision, reason),
            other => other,
        })
    }
}

#[async_trait]
impl MetadataResolver for StorageAwareResolver {
    async fn resolve(&self, instance: &PhysicalInstance, revision: &str) -> Result<MetadataDocument> {
        let storage_type = self.storage_type_of(instance);
        debug!(instance = %instance.id, revision, storage = %storage_type, "resolving revision metadata");

        let mut document = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.resolve_with(storage_type, instance, revision))
                .await
                .map_err(|_| {
                    FlareError::timeout(format!(
                        "解析 revision {} 超时 ({}ms)",
                        revision,
                        timeout.as_millis()
                    ))
                })??,
            None => self.resolve_with(storage_type, instance, revision).await?,
        };

        if document.revision.is_empty() {
            document.revision = revision.to_string();
        } else if document.revision != revision {
            warn!(
                instance = %instance.id,
                expected = revision,
                actual = %document.revision,
                "metadata document revision mismatch"
            );
        }
        Ok(document)
    }
}
