//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 支持的短期缓存后端
const CACHE_BACKENDS: &[&str] = &["sled", "memory", "noop"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `HUIHUA_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `HUIHUA_GENERATION__API_KEY=sk-xxx`
/// - `HUIHUA_GENERATION__MODEL=qwen-turbo`
/// - `HUIHUA_SPEECH__VOICE_NAME=cmn-CN-Wavenet-B`
/// - `HUIHUA_CACHE__BACKEND=memory`
///
/// # 返回
/// - `Ok(AppConfig)` - 成功加载的配置
/// - `Err(ConfigError)` - 加载失败
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default(
            "generation.base_url",
            "https://dashscope.aliyuncs.com/compatible-mode/v1",
        )?
        .set_default("generation.api_key", "")?
        .set_default("generation.model", "qwen-plus")?
        .set_default("generation.max_tokens", 1000)?
        .set_default("generation.temperature", 0.7)?
        .set_default("generation.timeout_secs", 30)?
        .set_default("speech.base_url", "https://texttospeech.googleapis.com")?
        .set_default("speech.api_key", "")?
        .set_default("speech.language_code", "cmn-CN")?
        .set_default("speech.voice_name", "cmn-CN-Wavenet-A")?
        .set_default("speech.audio_encoding", "MP3")?
        .set_default("speech.timeout_secs", 30)?
        .set_default("storage.base_dir", "data/store")?
        .set_default("storage.public_base_url", "http://localhost:5070/assets")?
        .set_default("storage.convo_namespace", "convo")?
        .set_default("storage.audio_namespace", "audio")?
        .set_default("cache.enabled", true)?
        .set_default("cache.backend", "sled")?
        .set_default("cache.sled_path", "data/cache.sled")?
        .set_default("cache.conversation_ttl_secs", 3600)?
        .set_default("cache.audio_ttl_secs", 21600)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        // 搜索默认配置文件
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: HUIHUA_
    // 层级分隔符: __ (双下划线)
    // 例如: HUIHUA_GENERATION__API_KEY=sk-xxx
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("HUIHUA")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    // 验证生成服务地址与模型
    if config.generation.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Generation base URL cannot be empty".to_string(),
        ));
    }
    if config.generation.model.is_empty() {
        return Err(ConfigError::ValidationError(
            "Generation model cannot be empty".to_string(),
        ));
    }

    // 验证合成服务地址与默认音色
    if config.speech.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Speech base URL cannot be empty".to_string(),
        ));
    }
    if config.speech.voice_name.is_empty() {
        return Err(ConfigError::ValidationError(
            "Speech voice name cannot be empty".to_string(),
        ));
    }

    // 验证存储命名空间
    if config.storage.public_base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Storage public base URL cannot be empty".to_string(),
        ));
    }
    if config.storage.convo_namespace.is_empty() || config.storage.audio_namespace.is_empty() {
        return Err(ConfigError::ValidationError(
            "Storage namespaces cannot be empty".to_string(),
        ));
    }

    // 验证缓存后端
    if !CACHE_BACKENDS.contains(&config.cache.backend.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "Unknown cache backend '{}', expected one of: {}",
            config.cache.backend,
            CACHE_BACKENDS.join(", ")
        )));
    }
    if config.cache.enabled && config.cache.backend == "sled" && config.cache.sled_path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Sled cache path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Generation URL: {}", config.generation.base_url);
    tracing::info!("Generation Model: {}", config.generation.model);
    tracing::info!(
        "Generation API Key: {}",
        if config.generation.api_key.is_empty() {
            "(empty, using fake adapter)"
        } else {
            "(set)"
        }
    );
    tracing::info!("Speech URL: {}", config.speech.base_url);
    tracing::info!("Speech Voice: {}", config.speech.voice_name);
    tracing::info!(
        "Speech API Key: {}",
        if config.speech.api_key.is_empty() {
            "(empty, using fake adapter)"
        } else {
            "(set)"
        }
    );
    tracing::info!("Storage Base Dir: {:?}", config.storage.base_dir);
    tracing::info!("Public Base URL: {}", config.storage.public_base_url);
    tracing::info!("Cache Enabled: {}", config.cache.enabled);
    if config.cache.enabled {
        tracing::info!("Cache Backend: {}", config.cache.backend);
        tracing::info!("Conversation TTL: {}s", config.cache.conversation_ttl_secs);
        tracing::info!("Audio TTL: {}s", config.cache.audio_ttl_secs);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.generation.model, "qwen-plus");
        assert_eq!(config.speech.voice_name, "cmn-CN-Wavenet-A");
        assert_eq!(config.cache.backend, "sled");
        assert_eq!(config.cache.conversation_ttl_secs, 3600);
        assert_eq!(config.cache.audio_ttl_secs, 21600);
        assert_eq!(config.storage.convo_namespace, "convo");
        assert_eq!(config.storage.audio_namespace, "audio");
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_empty_model() {
        let mut config = AppConfig::default();
        config.generation.model = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_unknown_backend() {
        let mut config = AppConfig::default();
        config.cache.backend = "redis".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_voice() {
        let mut config = AppConfig::default();
        config.speech.voice_name = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_namespace() {
        let mut config = AppConfig::default();
        config.storage.audio_namespace = String::new();
        assert!(validate_config(&config).is_err());
    }
}
