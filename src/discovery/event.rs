//! 实例变更事件与监听器契约
//!
//! 事件总线本身（按优先级把事件分发给监听器）不在本 crate 内，这里只定义
//! 总线与监听器之间的边界。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::discovery::instance::PhysicalInstance;
use crate::error::Result;

/// 监听器可用的最高优先级，数值越小越先执行
pub const HIGHEST_LISTENER_PRIORITY: i32 = -1;

/// 某个发现分组的实例列表发生变化
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstancesChangedEvent {
    pub group: String,
    /// 该分组的完整实例列表
    pub instances: Vec<PhysicalInstance>,
}

impl InstancesChangedEvent {
    pub fn new(group: impl Into<String>, instances: Vec<PhysicalInstance>) -> Self {
        Self {
            group: group.into(),
            instances,
        }
    }
}

/// 事件类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    InstancesChanged,
    Other,
}

/// 总线上流转的事件
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DiscoveryEvent {
    InstancesChanged(InstancesChangedEvent),
    Other { kind: String },
}

impl DiscoveryEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            DiscoveryEvent::InstancesChanged(_) => EventType::InstancesChanged,
            DiscoveryEvent::Other { .. } => EventType::Other,
        }
    }
}

impl From<InstancesChangedEvent> for DiscoveryEvent {
    fn from(event: InstancesChangedEvent) -> Self {
        DiscoveryEvent::InstancesChanged(event)
    }
}

/// 事件监听器
#[async_trait]
pub trait EventListener: Send + Sync {
    /// 是否处理该事件
    fn accept(&self, event: &DiscoveryEvent) -> bool;

    /// 优先级，数值越小越先执行
    fn priority(&self) -> i32;

    /// 关心的事件类型
    fn event_type(&self) -> EventType;

    /// 处理事件
    async fn on_event(&self, event: &DiscoveryEvent) -> Result<()>;
}
