//! revision 元数据文档与服务描述

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FlareError, Result};

/// 一个 revision 导出的逻辑服务
///
/// 既是元数据文档中的条目，也是归并阶段的分组键
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceDescriptor {
    pub name: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    pub protocol: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl ServiceDescriptor {
    pub fn new(name: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: String::new(),
            version: String::new(),
            protocol: protocol.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// `group/name:version`，空的 group / version 省略
    pub fn service_key(&self) -> String {
        let mut key = String::with_capacity(self.name.len() + 16);
        if !self.group.is_empty() {
            key.push_str(&self.group);
            key.push('/');
        }
        key.push_str(&self.name);
        if !self.version.is_empty() {
            key.push(':');
            key.push_str(&self.version);
        }
        key
    }

    /// `service_key:protocol`，同一服务通过多个协议导出时各占一项
    pub fn match_key(&self) -> String {
        format!("{}:{}", self.service_key(), self.protocol)
    }
}

/// revision 对应的元数据文档，按内容寻址，进程生命周期内不变
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataDocument {
    #[serde(default)]
    pub app: String,
    pub revision: String,
    /// match key -> 服务描述
    #[serde(default)]
    pub services: BTreeMap<String, ServiceDescriptor>,
}

impl MetadataDocument {
    pub fn new(app: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            revision: revision.into(),
            services: BTreeMap::new(),
        }
    }

    pub fn with_service(mut self, service: ServiceDescriptor) -> Self {
        self.services.insert(service.match_key(), service);
        self
    }

    pub fn services(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.values()
    }

    /// 从 JSON 解码
    pub fn from_json(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw)
            .map_err(|e| FlareError::metadata_decode_failed(format!("元数据文档解码失败: {}", e)))
    }
}

/// 导出同一服务的 revision 集合
///
/// 相等性与哈希按集合内容计算
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RevisionSet(BTreeSet<String>);

impl RevisionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, revision: impl Into<String>) -> bool {
        self.0.insert(revision.into())
    }

    pub fn contains(&self, revision: &str) -> bool {
        self.0.contains(revision)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 按字典序遍历
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// 排序后以逗号连接
    pub fn cache_key(&self) -> String {
        self.iter().collect::<Vec<_>>().join(",")
    }
}

impl fmt::Display for RevisionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.cache_key())
    }
}

impl<S: Into<String>> FromIterator<S> for RevisionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
