//! 服务实例定义

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ErrorCode;

/// 实例元数据中的 revision 键
pub const EXPORTED_SERVICES_REVISION_KEY: &str = "dubbo.metadata.revision";
/// 实例元数据中的元数据存储方式键
pub const METADATA_STORAGE_TYPE_KEY: &str = "dubbo.metadata.storage-type";
/// 实例元数据中的协议端口列表键（JSON 数组）
pub const SERVICE_INSTANCE_ENDPOINTS_KEY: &str = "dubbo.endpoints";
/// 未导出任何服务的实例使用的 revision
pub const NO_EXPORTED_SERVICES_REVISION: &str = "0";

/// 元数据获取方式
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// 直接调用实例自身暴露的元数据服务
    #[default]
    Local,
    /// 从远程元数据中心读取
    Remote,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Local => "local",
            StorageType::Remote => "remote",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageType::Local),
            "remote" => Ok(StorageType::Remote),
            _ => Err(format!("Unknown metadata storage type: {}", s)),
        }
    }
}

/// 实例声明的协议端口
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProtocolPort {
    pub port: u16,
    pub protocol: String,
}

/// 发现分组中的一个运行实例
///
/// 每次收到该分组的变更事件时整体替换，不做增量更新
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhysicalInstance {
    /// 所属发现分组（应用名）
    pub group: String,

    /// 实例 ID
    pub id: String,

    pub host: String,

    pub port: u16,

    /// 实例元数据，`None` 表示注册中心没有返回元数据
    pub metadata: Option<HashMap<String, String>>,
}

impl PhysicalInstance {
    /// 创建不带元数据的实例
    pub fn new(group: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        Self {
            group: group.into(),
            id: format!("{}:{}", host, port),
            host,
            port,
            metadata: None,
        }
    }

    /// 设置实例 ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// 添加一条元数据
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// 设置 revision
    pub fn with_revision(self, revision: impl Into<String>) -> Self {
        self.with_metadata(EXPORTED_SERVICES_REVISION_KEY, revision)
    }

    /// 设置元数据存储方式
    pub fn with_storage_type(self, storage_type: StorageType) -> Self {
        self.with_metadata(METADATA_STORAGE_TYPE_KEY, storage_type.as_str())
    }

    /// 设置协议端口列表
    pub fn with_protocol_ports(self, ports: &[ProtocolPort]) -> Self {
        let encoded = serde_json::to_string(ports).unwrap_or_else(|_| "[]".to_string());
        self.with_metadata(SERVICE_INSTANCE_ENDPOINTS_KEY, encoded)
    }

    /// 读取一条元数据
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(key))
            .map(String::as_str)
    }

    /// 导出服务的 revision
    pub fn revision(&self) -> Option<&str> {
        self.metadata_value(EXPORTED_SERVICES_REVISION_KEY)
    }

    /// 实例声明的存储方式；未声明或无法识别时返回 `None`
    pub fn storage_type(&self) -> Option<StorageType> {
        let raw = self.metadata_value(METADATA_STORAGE_TYPE_KEY)?;
        match raw.parse() {
            Ok(storage_type) => Some(storage_type),
            Err(e) => {
                warn!(instance = %self.id, error = %e, "ignoring metadata storage type");
                None
            }
        }
    }

    /// 实例声明的协议端口列表，格式错误时视为未声明
    pub fn protocol_ports(&self) -> Vec<ProtocolPort> {
        let Some(raw) = self.metadata_value(SERVICE_INSTANCE_ENDPOINTS_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<ProtocolPort>>(raw) {
            Ok(ports) => ports,
            Err(e) => {
                warn!(
                    instance = %self.id,
                    code = %ErrorCode::InvalidEndpoints,
                    error = %e,
                    "malformed endpoints metadata, using primary port"
                );
                Vec::new()
            }
        }
    }

    /// 查找指定协议的端口，没有声明时回落到实例主端口
    pub fn ports_for(&self, protocol: &str) -> Vec<u16> {
        let ports: Vec<u16> = self
            .protocol_ports()
            .into_iter()
            .filter(|p| p.protocol == protocol)
            .map(|p| p.port)
            .collect();
        if ports.is_empty() {
            vec![self.port]
        } else {
            ports
        }
    }
}
