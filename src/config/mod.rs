//! Configuration Module
//!
//! 提供应用配置管理功能，支持多层级配置来源：
//! - 环境变量（最高优先级）
//! - 配置文件（TOML 格式）
//! - 默认值（最低优先级）

mod loader;
mod types;

pub use loader::{load_config, load_config_from_path, print_config, ConfigError};
pub use types::{
    AppConfig, CacheConfig, GenerationConfig, LogConfig, SpeechConfig, StorageConfig,
};

use tracing_subscriber::EnvFilter;

/// 初始化日志订阅器
///
/// `RUST_LOG` 优先，否则按配置等级构造过滤器。
/// 重复调用时静默忽略（便于测试进程内多次初始化）。
pub fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},huihua={}", log.level, log.level)));

    if log.json {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
}
