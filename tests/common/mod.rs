//! 测试用的内存实现：元数据代理、远程元数据中心、订阅者

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use flare_mesh_discovery::discovery::{
    MetadataDocument, MetadataProxyFactory, MetadataServiceProxy, NotifyCallback, NotifyListener,
    PhysicalInstance, RemoteMetadataClient, ServiceDescriptor, ServiceEvent,
};
use flare_mesh_discovery::{FlareError, Result};

/// 按 revision 返回预置文档的本地元数据服务
#[derive(Default)]
pub struct FakeProxyFactory {
    documents: Mutex<HashMap<String, MetadataDocument>>,
    failing: Mutex<HashSet<String>>,
    io_failing: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
    pub proxies_created: Arc<AtomicUsize>,
    pub proxies_destroyed: Arc<AtomicUsize>,
    pub calls: Arc<AtomicUsize>,
    pub requested: Arc<Mutex<Vec<String>>>,
}

impl FakeProxyFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_document(self: Arc<Self>, document: MetadataDocument) -> Arc<Self> {
        self.insert(document);
        self
    }

    pub fn insert(&self, document: MetadataDocument) {
        self.documents
            .lock()
            .unwrap()
            .insert(document.revision.clone(), document);
    }

    pub fn fail_revision(&self, revision: &str) {
        self.failing.lock().unwrap().insert(revision.to_string());
    }

    /// 模拟连接层的 IO 错误
    pub fn fail_revision_with_io(&self, revision: &str) {
        self.io_failing.lock().unwrap().insert(revision.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_revisions(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

struct FakeProxy {
    documents: HashMap<String, MetadataDocument>,
    failing: HashSet<String>,
    io_failing: HashSet<String>,
    delay: Option<Duration>,
    destroyed: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
    requested: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl MetadataServiceProxy for FakeProxy {
    async fn get_metadata_info(&self, revision: &str) -> Result<MetadataDocument> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(revision.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(revision) {
            return Err(FlareError::metadata_service_unavailable(format!(
                "metadata service refused revision {}",
                revision
            )));
        }
        if self.io_failing.contains(revision) {
            return Err(FlareError::from(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            )));
        }
        self.documents
            .get(revision)
            .cloned()
            .ok_or_else(|| FlareError::revision_not_found(revision))
    }

    fn destroy(&self) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MetadataProxyFactory for FakeProxyFactory {
    async fn get_proxy(&self, _instance: &PhysicalInstance) -> Result<Box<dyn MetadataServiceProxy>> {
        self.proxies_created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeProxy {
            documents: self.documents.lock().unwrap().clone(),
            failing: self.failing.lock().unwrap().clone(),
            io_failing: self.io_failing.lock().unwrap().clone(),
            delay: *self.delay.lock().unwrap(),
            destroyed: self.proxies_destroyed.clone(),
            calls: self.calls.clone(),
            requested: self.requested.clone(),
        }))
    }
}

/// 按实例 ID 返回文档的元数据中心
#[derive(Default)]
pub struct FakeRemoteClient {
    documents: Mutex<HashMap<String, MetadataDocument>>,
    pub calls: AtomicUsize,
    pub requested_instances: Mutex<Vec<String>>,
}

impl FakeRemoteClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, instance_id: &str, document: MetadataDocument) {
        self.documents
            .lock()
            .unwrap()
            .insert(instance_id.to_string(), document);
    }
}

#[async_trait]
impl RemoteMetadataClient for FakeRemoteClient {
    async fn get_metadata(&self, instance: &PhysicalInstance) -> Result<MetadataDocument> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested_instances
            .lock()
            .unwrap()
            .push(instance.id.clone());
        self.documents
            .lock()
            .unwrap()
            .get(&instance.id)
            .cloned()
            .ok_or_else(|| FlareError::from(tonic::Status::not_found("instance not indexed")))
    }
}

/// 记录每批推送的订阅者
#[derive(Default)]
pub struct RecordingListener {
    batches: Mutex<Vec<Vec<ServiceEvent>>>,
    pub callbacks: Arc<AtomicUsize>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn batches(&self) -> Vec<Vec<ServiceEvent>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    pub fn last_batch(&self) -> Option<Vec<ServiceEvent>> {
        self.batches.lock().unwrap().last().cloned()
    }
}

impl NotifyListener for RecordingListener {
    fn notify(&self, event: ServiceEvent) {
        self.batches.lock().unwrap().push(vec![event]);
    }

    fn notify_all(&self, events: Vec<ServiceEvent>, callback: NotifyCallback) {
        self.batches.lock().unwrap().push(events);
        self.callbacks.fetch_add(1, Ordering::SeqCst);
        callback();
    }
}

pub fn instance(group: &str, host: &str, port: u16, revision: &str) -> PhysicalInstance {
    PhysicalInstance::new(group, host, port).with_revision(revision)
}

pub fn order_service() -> ServiceDescriptor {
    ServiceDescriptor::new("OrderService", "tri")
}

pub fn payment_service() -> ServiceDescriptor {
    ServiceDescriptor::new("PaymentService", "tri")
}

pub fn document(app: &str, revision: &str, services: &[ServiceDescriptor]) -> MetadataDocument {
    services
        .iter()
        .cloned()
        .fold(MetadataDocument::new(app, revision), |doc, s| doc.with_service(s))
}
