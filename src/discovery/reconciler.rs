//! 实例变更归并引擎
//!
//! 所有可变状态（实例表、revision 缓存、端点表、订阅者）都放在一把互斥锁后面，
//! 同一时刻只有一轮归并在执行；并发投递的事件按到达顺序串行处理。锁会在
//! 元数据解析期间一直持有，以此保证订阅者看到的永远是完整的一轮快照。
//!
//! 解析失败时整轮放弃：实例表、缓存和订阅者看到的端点都保持上一轮的状态。

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use crate::discovery::endpoint::Endpoint;
use crate::discovery::event::{
    DiscoveryEvent, EventListener, EventType, HIGHEST_LISTENER_PRIORITY, InstancesChangedEvent,
};
use crate::discovery::instance::PhysicalInstance;
use crate::discovery::listener::{ListenerRegistry, NotifyListener};
use crate::discovery::metadata::MetadataDocument;
use crate::discovery::projector::EndpointProjector;
use crate::discovery::reducer::SnapshotReducer;
use crate::discovery::resolver::MetadataResolver;
use crate::error::Result;
use crate::metrics::{MetricsCollector, PassStats, ReconcileMetrics};

#[derive(Default)]
struct ReconcilerState {
    /// 分组 -> 最近一次事件中的完整实例列表
    all_instances: BTreeMap<String, Vec<PhysicalInstance>>,
    /// 上一轮观察到的 revision -> 元数据
    revision_to_metadata: HashMap<String, Arc<MetadataDocument>>,
    /// 服务名 -> 端点列表
    service_endpoints: HashMap<String, Arc<Vec<Endpoint>>>,
    listeners: ListenerRegistry,
}

/// 实例变更监听器，负责归并快照并推送给订阅者
pub struct InstanceChangeReconciler {
    group_names: BTreeSet<String>,
    reducer: SnapshotReducer,
    state: Mutex<ReconcilerState>,
    metrics: MetricsCollector,
}

impl InstanceChangeReconciler {
    /// 创建引擎
    ///
    /// # 参数
    /// * `group_names` - 需要跟踪的发现分组
    /// * `resolver` - revision 元数据解析器
    pub fn new(
        group_names: impl IntoIterator<Item = impl Into<String>>,
        resolver: Arc<dyn MetadataResolver>,
    ) -> Self {
        Self {
            group_names: group_names.into_iter().map(Into::into).collect(),
            reducer: SnapshotReducer::new(resolver),
            state: Mutex::new(ReconcilerState::default()),
            metrics: MetricsCollector::new(),
        }
    }

    /// 开启 Remove 事件补发，不影响已注册的订阅者
    pub fn with_emit_removals(mut self, enabled: bool) -> Self {
        self.state.get_mut().listeners.set_emit_removals(enabled);
        self
    }

    /// 跟踪的分组名
    pub fn tracked_group_names(&self) -> &BTreeSet<String> {
        &self.group_names
    }

    /// 订阅服务名，已有端点时立即推送一批 Add 事件
    pub async fn subscribe(&self, service_name: impl Into<String>, listener: Arc<dyn NotifyListener>) {
        let service_name = service_name.into();
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let current = state.service_endpoints.get(&service_name);
        let sent = state.listeners.subscribe(service_name, listener, current);
        drop(guard);
        self.metrics.record_notified(sent).await;
    }

    /// 取消订阅，不存在时无操作
    pub async fn unsubscribe(&self, service_name: &str) -> bool {
        self.state.lock().await.listeners.unsubscribe(service_name)
    }

    /// 当前快照中某服务的端点列表
    pub async fn endpoints(&self, service_name: &str) -> Option<Arc<Vec<Endpoint>>> {
        self.state.lock().await.service_endpoints.get(service_name).cloned()
    }

    /// 当前快照中有端点的服务名
    pub async fn service_names(&self) -> BTreeSet<String> {
        self.state.lock().await.service_endpoints.keys().cloned().collect()
    }

    /// revision 缓存中的 revision（排序）
    pub async fn cached_revisions(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut revisions: Vec<String> = state.revision_to_metadata.keys().cloned().collect();
        revisions.sort();
        revisions
    }

    /// 某分组最近一次提交的实例列表
    pub async fn instances(&self, group: &str) -> Vec<PhysicalInstance> {
        self.state
            .lock()
            .await
            .all_instances
            .get(group)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn metrics(&self) -> ReconcileMetrics {
        self.metrics.get_metrics().await
    }

    /// 处理一个分组的实例变更，执行完整的一轮归并并推送
    ///
    /// 未跟踪的分组直接忽略
    pub async fn reconcile(&self, event: &InstancesChangedEvent) -> Result<()> {
        if !self.group_names.contains(&event.group) {
            debug!(group = %event.group, "ignoring untracked group");
            return Ok(());
        }

        let span = info_span!("reconcile", pass = %Uuid::new_v4(), group = %event.group);
        self.reconcile_locked(event).instrument(span).await
    }

    async fn reconcile_locked(&self, event: &InstancesChangedEvent) -> Result<()> {
        let started = Instant::now();
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        info!(
            instances = event.instances.len(),
            "received instance notification"
        );

        let replaced = state
            .all_instances
            .insert(event.group.clone(), event.instances.clone());

        let reduction = match self
            .reducer
            .reduce(&state.all_instances, &state.revision_to_metadata)
            .await
        {
            Ok(reduction) => reduction,
            Err(e) => {
                match replaced {
                    Some(previous) => state.all_instances.insert(event.group.clone(), previous),
                    None => state.all_instances.remove(&event.group),
                };
                drop(guard);
                self.metrics.record_failure(started.elapsed()).await;
                return Err(e);
            }
        };

        let mut projector = EndpointProjector::new();
        let service_endpoints = projector.project_reduction(&reduction);
        debug!(
            services = service_endpoints.len(),
            cache_hits = projector.cache_hits(),
            cache_misses = projector.cache_misses(),
            "endpoints projected"
        );

        let stats_skipped = reduction.skipped;
        let stats_resolved = reduction.resolved;
        state.revision_to_metadata = reduction.revision_to_metadata;
        state.service_endpoints = service_endpoints;
        let notified = state.listeners.dispatch(&state.service_endpoints);
        drop(guard);

        info!(
            notified,
            skipped = stats_skipped,
            resolved = stats_resolved,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reconciliation finished"
        );
        self.metrics
            .record_pass(
                PassStats {
                    skipped: stats_skipped,
                    resolved: stats_resolved,
                    notified,
                },
                started.elapsed(),
            )
            .await;
        Ok(())
    }
}

#[async_trait]
impl EventListener for InstanceChangeReconciler {
    /// 只接受跟踪分组的实例变更事件
    fn accept(&self, event: &DiscoveryEvent) -> bool {
        match event {
            DiscoveryEvent::InstancesChanged(e) => self.group_names.contains(&e.group),
            _ => false,
        }
    }

    /// 在同类事件的监听器中最先执行
    fn priority(&self) -> i32 {
        HIGHEST_LISTENER_PRIORITY
    }

    fn event_type(&self) -> EventType {
        EventType::InstancesChanged
    }

    async fn on_event(&self, event: &DiscoveryEvent) -> Result<()> {
        match event {
            DiscoveryEvent::InstancesChanged(e) => self.reconcile(e).await,
            _ => Ok(()),
        }
    }
}
