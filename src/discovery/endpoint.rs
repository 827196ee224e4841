//! 可寻址端点与推送事件

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::discovery::instance::PhysicalInstance;
use crate::discovery::metadata::ServiceDescriptor;

/// 端点来源标记键
pub const REGISTRY_TYPE_KEY: &str = "registry-type";
/// 来源于实例级服务发现
pub const REGISTRY_INSTANCE: &str = "instance";

/// 一个逻辑服务在某个实例上的可达地址
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    /// 逻辑服务名
    pub service: String,
    pub group: String,
    pub version: String,
    pub params: BTreeMap<String, String>,
}

impl Endpoint {
    /// 由地址和服务描述组合出端点
    pub fn new(host: impl Into<String>, port: u16, service: &ServiceDescriptor) -> Self {
        Self {
            protocol: service.protocol.clone(),
            host: host.into(),
            port,
            service: service.name.clone(),
            group: service.group.clone(),
            version: service.version.clone(),
            params: service.params.clone(),
        }
    }

    /// 使用实例主端口组合出端点
    pub fn from_instance(instance: &PhysicalInstance, service: &ServiceDescriptor) -> Self {
        Self::new(instance.host.clone(), instance.port, service)
    }

    /// 设置参数
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// 是否由实例级服务发现产生
    pub fn is_instance_derived(&self) -> bool {
        self.param(REGISTRY_TYPE_KEY) == Some(REGISTRY_INSTANCE)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `protocol://host:port/service?k=v&...`，参数按键排序
    pub fn to_url(&self) -> String {
        let mut url = format!("{}://{}/{}", self.protocol, self.address(), self.service);
        let mut params: Vec<(&str, &str)> = Vec::with_capacity(self.params.len() + 2);
        if !self.group.is_empty() {
            params.push(("group", &self.group));
        }
        if !self.version.is_empty() {
            params.push(("version", &self.version));
        }
        params.extend(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        params.sort_unstable();
        for (i, (k, v)) in params.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(k);
            url.push('=');
            url.push_str(v);
        }
        url
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

/// 事件动作
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Add,
    Remove,
}

/// 推送给订阅者的单条变更
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceEvent {
    pub action: EventAction,
    pub endpoint: Endpoint,
}

impl ServiceEvent {
    pub fn add(endpoint: Endpoint) -> Self {
        Self {
            action: EventAction::Add,
            endpoint,
        }
    }

    pub fn remove(endpoint: Endpoint) -> Self {
        Self {
            action: EventAction::Remove,
            endpoint,
        }
    }
}
