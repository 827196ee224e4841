//! 订阅者注册表与推送
//!
//! 每个逻辑服务名只有两种状态：未订阅 / 已订阅。每轮归并完成后，向所有已订阅
//! 的服务名全量重发当前端点列表（Add 事件），不与上一轮做差分；开启
//! `emit_removals` 后额外补发上一轮推送过、本轮已消失的端点的 Remove 事件。

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::discovery::endpoint::{Endpoint, ServiceEvent};

/// 推送完成回调
pub type NotifyCallback = Box<dyn FnOnce() + Send + 'static>;

/// 端点变更的订阅者
pub trait NotifyListener: Send + Sync {
    /// 推送单条事件
    fn notify(&self, event: ServiceEvent);

    /// 批量推送，尽力而为，调用方不等待回调
    ///
    /// 默认实现逐条调用 `notify` 后执行回调
    fn notify_all(&self, events: Vec<ServiceEvent>, callback: NotifyCallback) {
        for event in events {
            self.notify(event);
        }
        callback();
    }
}

/// 服务名 -> 订阅者
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: HashMap<String, Arc<dyn NotifyListener>>,
    delivered: HashMap<String, Arc<Vec<Endpoint>>>,
    emit_removals: bool,
}

impl ListenerRegistry {
    /// 开关 Remove 事件补发，已有订阅者保持不变
    pub fn set_emit_removals(&mut self, enabled: bool) {
        self.emit_removals = enabled;
    }

    /// 注册订阅者并立即推送当前端点列表，返回推送的事件数
    ///
    /// 同名重复订阅会替换旧的订阅者
    pub fn subscribe(
        &mut self,
        service_name: impl Into<String>,
        listener: Arc<dyn NotifyListener>,
        current: Option<&Arc<Vec<Endpoint>>>,
    ) -> usize {
        let service_name = service_name.into();
        let mut sent = 0;
        if let Some(endpoints) = current.filter(|e| !e.is_empty()) {
            let events: Vec<ServiceEvent> = endpoints.iter().cloned().map(ServiceEvent::add).collect();
            sent = events.len();
            listener.notify_all(events, Box::new(|| {}));
            self.delivered.insert(service_name.clone(), endpoints.clone());
        } else {
            self.delivered.remove(&service_name);
        }
        debug!(service = %service_name, events = sent, "listener subscribed");
        self.listeners.insert(service_name, listener);
        sent
    }

    /// 移除订阅者，不存在时无操作
    pub fn unsubscribe(&mut self, service_name: &str) -> bool {
        self.delivered.remove(service_name);
        self.listeners.remove(service_name).is_some()
    }

    pub fn contains(&self, service_name: &str) -> bool {
        self.listeners.contains_key(service_name)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// 已订阅的服务名
    pub fn service_names(&self) -> BTreeSet<String> {
        self.listeners.keys().cloned().collect()
    }

    /// 向所有订阅者推送新快照，返回推送的事件总数
    pub fn dispatch(&mut self, snapshot: &HashMap<String, Arc<Vec<Endpoint>>>) -> usize {
        let empty = Arc::new(Vec::new());
        let mut total = 0;
        for (service_name, listener) in &self.listeners {
            let current = snapshot.get(service_name).unwrap_or(&empty);
            let mut events: Vec<ServiceEvent> = current.iter().cloned().map(ServiceEvent::add).collect();

            if self.emit_removals {
                if let Some(previous) = self.delivered.get(service_name) {
                    let present: HashSet<&Endpoint> = current.iter().collect();
                    events.extend(
                        previous
                            .iter()
                            .filter(|e| !present.contains(e))
                            .cloned()
                            .map(ServiceEvent::remove),
                    );
                }
            }

            total += events.len();
            listener.notify_all(events, Box::new(|| {}));
            self.delivered.insert(service_name.clone(), current.clone());
        }
        total
    }
}
