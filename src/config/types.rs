//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::application::ports::{GenerationOptions, SpeechOptions};

/// 应用主配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 文本生成服务配置
    #[serde(default)]
    pub generation: GenerationConfig,

    /// 语音合成服务配置
    #[serde(default)]
    pub speech: SpeechConfig,

    /// 内容存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 短期缓存配置
    #[serde(default)]
    pub cache: CacheConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            speech: SpeechConfig::default(),
            storage: StorageConfig::default(),
            cache: CacheConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// 文本生成服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// OpenAI 兼容服务基础 URL
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// API key，为空时使用 Fake 适配器（离线开发）
    #[serde(default)]
    pub api_key: String,

    /// 模型名称
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// 最大输出 token 数
    #[serde(default = "default_generation_max_tokens")]
    pub max_tokens: u32,

    /// 采样温度
    #[serde(default = "default_generation_temperature")]
    pub temperature: f32,

    /// 请求超时时间（秒）
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

fn default_generation_base_url() -> String {
    "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string()
}

fn default_generation_model() -> String {
    "qwen-plus".to_string()
}

fn default_generation_max_tokens() -> u32 {
    1000
}

fn default_generation_temperature() -> f32 {
    0.7
}

fn default_generation_timeout() -> u64 {
    30
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            api_key: String::new(),
            model: default_generation_model(),
            max_tokens: default_generation_max_tokens(),
            temperature: default_generation_temperature(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

impl GenerationConfig {
    /// 转为端口调用参数
    pub fn options(&self) -> GenerationOptions {
        GenerationOptions {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// 语音合成服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// 合成服务基础 URL
    #[serde(default = "default_speech_base_url")]
    pub base_url: String,

    /// API key，为空时使用 Fake 适配器（离线开发）
    #[serde(default)]
    pub api_key: String,

    /// 语言代码
    #[serde(default = "default_speech_language")]
    pub language_code: String,

    /// 默认音色
    #[serde(default = "default_speech_voice")]
    pub voice_name: String,

    /// 音频编码格式
    #[serde(default = "default_speech_encoding")]
    pub audio_encoding: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_speech_timeout")]
    pub timeout_secs: u64,
}

fn default_speech_base_url() -> String {
    "https://texttospeech.googleapis.com".to_string()
}

fn default_speech_language() -> String {
    "cmn-CN".to_string()
}

fn default_speech_voice() -> String {
    "cmn-CN-Wavenet-A".to_string()
}

fn default_speech_encoding() -> String {
    "MP3".to_string()
}

fn default_speech_timeout() -> u64 {
    30
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: default_speech_base_url(),
            api_key: String::new(),
            language_code: default_speech_language(),
            voice_name: default_speech_voice(),
            audio_encoding: default_speech_encoding(),
            timeout_secs: default_speech_timeout(),
        }
    }
}

impl SpeechConfig {
    /// 转为端口调用参数（含默认音色）
    pub fn options(&self) -> SpeechOptions {
        SpeechOptions {
            language_code: self.language_code.clone(),
            voice_name: self.voice_name.clone(),
            audio_encoding: self.audio_encoding.clone(),
        }
    }
}

/// 内容存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 存储根目录
    #[serde(default = "default_storage_base_dir")]
    pub base_dir: PathBuf,

    /// 公开访问 URL 前缀（静态文件服务对外地址）
    #[serde(default = "default_storage_public_url")]
    pub public_base_url: String,

    /// 对话 JSON 的命名空间前缀
    #[serde(default = "default_convo_namespace")]
    pub convo_namespace: String,

    /// 音频对象的命名空间前缀
    #[serde(default = "default_audio_namespace")]
    pub audio_namespace: String,
}

fn default_storage_base_dir() -> PathBuf {
    PathBuf::from("data/store")
}

fn default_storage_public_url() -> String {
    "http://localhost:5070/assets".to_string()
}

fn default_convo_namespace() -> String {
    "convo".to_string()
}

fn default_audio_namespace() -> String {
    "audio".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: default_storage_base_dir(),
            public_base_url: default_storage_public_url(),
            convo_namespace: default_convo_namespace(),
            audio_namespace: default_audio_namespace(),
        }
    }
}

/// 短期缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// 是否启用短期缓存，关闭时自动选用空实现
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// 后端: sled、memory 或 noop
    #[serde(default = "default_cache_backend")]
    pub backend: String,

    /// sled 数据库路径
    #[serde(default = "default_cache_sled_path")]
    pub sled_path: String,

    /// 对话条目 TTL（秒），0 表示不过期
    #[serde(default = "default_conversation_ttl")]
    pub conversation_ttl_secs: u64,

    /// 音频条目 TTL（秒），0 表示不过期
    #[serde(default = "default_audio_ttl")]
    pub audio_ttl_secs: u64,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_backend() -> String {
    "sled".to_string()
}

fn default_cache_sled_path() -> String {
    "data/cache.sled".to_string()
}

fn default_conversation_ttl() -> u64 {
    3600
}

fn default_audio_ttl() -> u64 {
    21600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            backend: default_cache_backend(),
            sled_path: default_cache_sled_path(),
            conversation_ttl_secs: default_conversation_ttl(),
            audio_ttl_secs: default_audio_ttl(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否输出 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
