//! 统一错误类型

use super::code::ErrorCode;
use std::collections::HashMap;
use thiserror::Error;

/// 服务发现统一错误类型
#[derive(Error, Debug, Clone)]
pub enum FlareError {
    /// 带错误代码的业务错误
    #[error("错误 [{code}] {reason}", code = .code.as_str())]
    Localized {
        code: ErrorCode,
        reason: String,
        details: Option<String>,
        params: Option<HashMap<String, String>>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(String),
}

impl FlareError {
    /// 创建带错误代码的错误
    pub fn localized(code: ErrorCode, reason: impl Into<String>) -> Self {
        FlareError::Localized {
            code,
            reason: reason.into(),
            details: None,
            params: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// 创建 IO 错误
    pub fn io(msg: impl Into<String>) -> Self {
        FlareError::Io(msg.into())
    }

    // ============================================================
    // 便捷方法：元数据解析相关错误
    // ============================================================

    /// 元数据解析失败（携带 revision 参数）
    pub fn metadata_resolve_failed(revision: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut params = HashMap::new();
        params.insert("revision".to_string(), revision.into());
        Self::Localized {
            code: ErrorCode::MetadataResolveFailed,
            reason: reason.into(),
            details: None,
            params: Some(params),
            timestamp: chrono::Utc::now(),
        }
    }

    /// 元数据解码失败
    pub fn metadata_decode_failed(reason: impl Into<String>) -> Self {
        Self::localized(ErrorCode::MetadataDecodeFailed, reason)
    }

    /// 实例元数据服务不可用
    pub fn metadata_service_unavailable(reason: impl Into<String>) -> Self {
        Self::localized(ErrorCode::MetadataServiceUnavailable, reason)
    }

    /// 远程元数据中心未配置或不可用
    pub fn remote_metadata_unavailable(reason: impl Into<String>) -> Self {
        Self::localized(ErrorCode::RemoteMetadataUnavailable, reason)
    }

    /// revision 对应的元数据不存在
    pub fn revision_not_found(revision: impl Into<String>) -> Self {
        let revision = revision.into();
        let mut params = HashMap::new();
        params.insert("revision".to_string(), revision.clone());
        Self::Localized {
            code: ErrorCode::RevisionNotFound,
            reason: format!("revision {} 不存在", revision),
            details: None,
            params: Some(params),
            timestamp: chrono::Utc::now(),
        }
    }

    // ============================================================
    // 便捷方法：配置 / 序列化 / 通用
    // ============================================================

    /// 创建配置错误
    pub fn configuration_error(reason: impl Into<String>) -> Self {
        Self::localized(ErrorCode::ConfigurationError, reason)
    }

    /// 创建序列化错误
    pub fn serialization_error(reason: impl Into<String>) -> Self {
        Self::localized(ErrorCode::SerializationError, reason)
    }

    /// 创建反序列化错误
    pub fn deserialization_error(reason: impl Into<String>) -> Self {
        Self::localized(ErrorCode::DeserializationError, reason)
    }

    /// 创建操作超时错误
    pub fn timeout(reason: impl Into<String>) -> Self {
        Self::localized(ErrorCode::OperationTimeout, reason)
    }

    // ============================================================
    // 信息获取方法
    // ============================================================

    /// 获取错误代码
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            FlareError::Localized { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// 获取错误原因
    pub fn reason(&self) -> &str {
        match self {
            FlareError::Localized { reason, .. } => reason,
            FlareError::Io(msg) => msg,
        }
    }

    /// 获取错误参数
    pub fn param(&self, key: &str) -> Option<&str> {
        match self {
            FlareError::Localized {
                params: Some(params),
                ..
            } => params.get(key).map(String::as_str),
            _ => None,
        }
    }

    /// 判断是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        self.code().map(|code| code.is_retryable()).unwrap_or(false)
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, FlareError>;
