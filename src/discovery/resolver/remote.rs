//! 远程元数据获取：元数据中心按实例索引

use std::sync::Arc;

use async_trait::async_trait;

use super::MetadataResolver;
use crate::discovery::instance::PhysicalInstance;
use crate::discovery::metadata::MetadataDocument;
use crate::error::{FlareError, Result};

/// 元数据中心客户端（进程内共享）
#[async_trait]
pub trait RemoteMetadataClient: Send + Sync {
    /// 查询实例当前导出的元数据
    async fn get_metadata(&self, instance: &PhysicalInstance) -> Result<MetadataDocument>;
}

/// 远程解析器，未配置客户端时所有解析都失败
pub struct RemoteMetadataResolver {
    client: Option<Arc<dyn RemoteMetadataClient>>,
}

impl RemoteMetadataResolver {
    pub fn new(client: Option<Arc<dyn RemoteMetadataClient>>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetadataResolver for RemoteMetadataResolver {
    async fn resolve(&self, instance: &PhysicalInstance, _revision: &str) -> Result<MetadataDocument> {
        let client = self.client.as_ref().ok_or_else(|| {
            FlareError::remote_metadata_unavailable(format!(
                "实例 {} 要求远程元数据，但未配置元数据中心",
                instance.id
            ))
        })?;
        client.get_metadata(instance).await
    }
}
