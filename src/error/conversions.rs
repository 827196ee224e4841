//! 错误类型转换实现

use super::{ErrorBuilder, ErrorCode, FlareError};
use std::io;

impl From<io::Error> for FlareError {
    fn from(err: io::Error) -> Self {
        FlareError::io(err.to_string())
    }
}

impl From<serde_json::Error> for FlareError {
    fn from(err: serde_json::Error) -> Self {
        FlareError::deserialization_error(format!("JSON 解析错误: {}", err))
    }
}

impl From<toml::de::Error> for FlareError {
    fn from(err: toml::de::Error) -> Self {
        ErrorBuilder::new(ErrorCode::ConfigurationError, "配置文件解析失败")
            .details(err.to_string())
            .build_error()
    }
}

/// 远程元数据中心通过 gRPC 访问，状态码映射到本地错误代码
impl From<tonic::Status> for FlareError {
    fn from(status: tonic::Status) -> Self {
        let error_code = match status.code() {
            tonic::Code::NotFound => ErrorCode::RevisionNotFound,
            tonic::Code::InvalidArgument => ErrorCode::InvalidParameter,
            tonic::Code::Unavailable => ErrorCode::MetadataServiceUnavailable,
            tonic::Code::DeadlineExceeded => ErrorCode::OperationTimeout,
            tonic::Code::DataLoss => ErrorCode::MetadataDecodeFailed,
            tonic::Code::Internal => ErrorCode::InternalError,
            tonic::Code::Unimplemented => ErrorCode::OperationNotSupported,
            _ => ErrorCode::UnknownError,
        };

        FlareError::localized(error_code, status.message())
    }
}
