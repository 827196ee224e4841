//! 日志初始化

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::InfraResult;

/// 安装全局 tracing subscriber
///
/// `RUST_LOG` 优先于配置中的级别；已经安装过 subscriber 时直接返回 `Ok`
pub fn init_tracing(config: &LoggingConfig) -> InfraResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}
