//! 错误代码和错误类别定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 错误代码枚举
///
/// 错误代码按类别分组，每个类别占用1000个代码范围：
/// - 1000-1999: 元数据解析相关错误
/// - 2000-2999: 实例相关错误
/// - 6000-6999: 系统相关错误
/// - 7000-7999: 网络相关错误
/// - 8000-8999: 序列化相关错误
/// - 9000-9999: 通用错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum ErrorCode {
    // ============================================================
    // 元数据解析相关错误 (1000-1999)
    // ============================================================
    MetadataResolveFailed = 1000,
    MetadataDecodeFailed = 1001,
    MetadataServiceUnavailable = 1002,
    RemoteMetadataUnavailable = 1003,
    RevisionNotFound = 1004,

    // ============================================================
    // 实例相关错误 (2000-2999)
    // ============================================================
    InstanceMetadataMissing = 2000,
    InvalidRevision = 2001,
    InvalidEndpoints = 2002,

    // ============================================================
    // 系统相关错误 (6000-6999)
    // ============================================================
    InternalError = 6000,
    ServiceUnavailable = 6001,
    ConfigurationError = 6003,

    // ============================================================
    // 网络相关错误 (7000-7999)
    // ============================================================
    NetworkError = 7000,
    NetworkTimeout = 7001,

    // ============================================================
    // 序列化相关错误 (8000-8999)
    // ============================================================
    SerializationError = 8000,
    DeserializationError = 8001,

    // ============================================================
    // 通用错误 (9000-9999)
    // ============================================================
    GeneralError = 9000,
    InvalidParameter = 9001,
    OperationNotSupported = 9002,
    OperationTimeout = 9004,
    UnknownError = 9999,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ErrorCode {
    /// 获取错误代码的数字值
    #[inline]
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }

    /// 从数字值创建错误代码
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            1000 => Some(ErrorCode::MetadataResolveFailed),
            1001 => Some(ErrorCode::MetadataDecodeFailed),
            1002 => Some(ErrorCode::MetadataServiceUnavailable),
            1003 => Some(ErrorCode::RemoteMetadataUnavailable),
            1004 => Some(ErrorCode::RevisionNotFound),
            2000 => Some(ErrorCode::InstanceMetadataMissing),
            2001 => Some(ErrorCode::InvalidRevision),
            2002 => Some(ErrorCode::InvalidEndpoints),
            6000 => Some(ErrorCode::InternalError),
            6001 => Some(ErrorCode::ServiceUnavailable),
            6003 => Some(ErrorCode::ConfigurationError),
            7000 => Some(ErrorCode::NetworkError),
            7001 => Some(ErrorCode::NetworkTimeout),
            8000 => Some(ErrorCode::SerializationError),
            8001 => Some(ErrorCode::DeserializationError),
            9000 => Some(ErrorCode::GeneralError),
            9001 => Some(ErrorCode::InvalidParameter),
            9002 => Some(ErrorCode::OperationNotSupported),
            9004 => Some(ErrorCode::OperationTimeout),
            9999 => Some(ErrorCode::UnknownError),
            _ => None,
        }
    }

    /// 获取错误代码的英文标识符
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MetadataResolveFailed => "METADATA_RESOLVE_FAILED",
            ErrorCode::MetadataDecodeFailed => "METADATA_DECODE_FAILED",
            ErrorCode::MetadataServiceUnavailable => "METADATA_SERVICE_UNAVAILABLE",
            ErrorCode::RemoteMetadataUnavailable => "REMOTE_METADATA_UNAVAILABLE",
            ErrorCode::RevisionNotFound => "REVISION_NOT_FOUND",
            ErrorCode::InstanceMetadataMissing => "INSTANCE_METADATA_MISSING",
            ErrorCode::InvalidRevision => "INVALID_REVISION",
            ErrorCode::InvalidEndpoints => "INVALID_ENDPOINTS",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::NetworkTimeout => "NETWORK_TIMEOUT",
            ErrorCode::SerializationError => "SERIALIZATION_ERROR",
            ErrorCode::DeserializationError => "DESERIALIZATION_ERROR",
            ErrorCode::GeneralError => "GENERAL_ERROR",
            ErrorCode::InvalidParameter => "INVALID_PARAMETER",
            ErrorCode::OperationNotSupported => "OPERATION_NOT_SUPPORTED",
            ErrorCode::OperationTimeout => "OPERATION_TIMEOUT",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// 获取错误代码的类别
    pub fn category(&self) -> ErrorCategory {
        match self.as_u32() {
            1000..=1999 => ErrorCategory::Metadata,
            2000..=2999 => ErrorCategory::Instance,
            6000..=6999 => ErrorCategory::System,
            7000..=7999 => ErrorCategory::Network,
            8000..=8999 => ErrorCategory::Serialization,
            _ => ErrorCategory::General,
        }
    }

    /// 判断是否为可重试的错误
    ///
    /// 引擎内部不做重试，这里只给调用方（重新投递事件的一方）作参考
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::MetadataServiceUnavailable
                | ErrorCode::RemoteMetadataUnavailable
                | ErrorCode::ServiceUnavailable
                | ErrorCode::NetworkError
                | ErrorCode::NetworkTimeout
                | ErrorCode::OperationTimeout
        )
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Metadata,
    Instance,
    System,
    Network,
    Serialization,
    General,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Metadata => write!(f, "METADATA"),
            ErrorCategory::Instance => write!(f, "INSTANCE"),
            ErrorCategory::System => write!(f, "SYSTEM"),
            ErrorCategory::Network => write!(f, "NETWORK"),
            ErrorCategory::Serialization => write!(f, "SERIALIZATION"),
            ErrorCategory::General => write!(f, "GENERAL"),
        }
    }
}
