//! Speech Synthesizer Port - 语音合成服务抽象
//!
//! 定义单句语音合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// 语音合成错误
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Quota or billing limit reached: {0}")]
    Quota(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    Service(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 合成参数
#[derive(Debug, Clone)]
pub struct SpeechOptions {
    /// 语言代码，如 cmn-CN
    pub language_code: String,
    /// 音色名称
    pub voice_name: String,
    /// 音频编码格式，如 MP3
    pub audio_encoding: String,
}

/// Speech Synthesizer Port
///
/// 外部语音合成服务的抽象接口，输入单句文本返回音频字节
#[async_trait]
pub trait SpeechSynthesizerPort: Send + Sync {
    /// 合成单句语音
    async fn synthesize_speech(
        &self,
        text: &str,
        options: &SpeechOptions,
    ) -> Result<Vec<u8>, SpeechError>;

    /// 检查合成服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
