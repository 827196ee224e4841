//! 本地元数据获取：调用实例自身的元数据服务

use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;

use super::MetadataResolver;
use crate::discovery::instance::PhysicalInstance;
use crate::discovery::metadata::MetadataDocument;
use crate::error::Result;

/// 实例元数据服务代理
#[async_trait]
pub trait MetadataServiceProxy: Send + Sync {
    /// 按 revision 查询元数据
    async fn get_metadata_info(&self, revision: &str) -> Result<MetadataDocument>;

    /// 释放底层通道
    fn destroy(&self);
}

/// 为实例创建元数据服务代理
#[async_trait]
pub trait MetadataProxyFactory: Send + Sync {
    async fn get_proxy(&self, instance: &PhysicalInstance) -> Result<Box<dyn MetadataServiceProxy>>;
}

/// 持有代理，drop 时释放底层通道
pub struct ProxyGuard {
    proxy: Box<dyn MetadataServiceProxy>,
}

impl ProxyGuard {
    pub fn new(proxy: Box<dyn MetadataServiceProxy>) -> Self {
        Self { proxy }
    }
}

impl Deref for ProxyGuard {
    type Target = dyn MetadataServiceProxy;

    fn deref(&self) -> &Self::Target {
        self.proxy.as_ref()
    }
}

impl Drop for ProxyGuard {
    fn drop(&mut self) {
        self.proxy.destroy();
    }
}

/// 本地解析器
pub struct LocalMetadataResolver {
    factory: Arc<dyn MetadataProxyFactory>,
}

impl LocalMetadataResolver {
    pub fn new(factory: Arc<dyn MetadataProxyFactory>) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl MetadataResolver for LocalMetadataResolver {
    async fn resolve(&self, instance: &PhysicalInstance, revision: &str) -> Result<MetadataDocument> {
        let proxy = ProxyGuard::new(self.factory.get_proxy(instance).await?);
        proxy.get_metadata_info(revision).await
    }
}
