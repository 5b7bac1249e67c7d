//! Text Generator Port - 文本生成服务抽象
//!
//! 定义对话文本生成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// 文本生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
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

    #[error("Empty response from generation service")]
    EmptyResponse,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 生成参数
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// 模型名称
    pub model: String,
    /// 最大输出 token 数
    pub max_tokens: u32,
    /// 采样温度
    pub temperature: f32,
}

/// Text Generator Port
///
/// 外部文本生成服务的抽象接口，一次调用返回完整文本（不做流式）
#[async_trait]
pub trait TextGeneratorPort: Send + Sync {
    /// 根据 prompt 生成文本
    async fn generate_text(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError>;

    /// 检查生成服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
