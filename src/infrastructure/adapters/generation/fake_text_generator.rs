//! Fake Text Generator - 用于测试与本地开发的生成客户端
//!
//! 返回固定文本，不实际调用生成服务

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::application::ports::{GenerationError, GenerationOptions, TextGeneratorPort};

/// 默认的固定对话输出（与解析器格式配套）
const DEFAULT_RESPONSE: &str = "A: 你好！ | nǐ hǎo | Hello!\n\
B: 你好，今天怎么样？ | nǐ hǎo, jīn tiān zěn me yàng | Hello, how is today?\n\
A: 挺好的，我们开始学习吧。 | tǐng hǎo de, wǒ men kāi shǐ xué xí ba | Pretty good, let's start studying.";

/// Fake Text Generator
///
/// 记录调用次数，可配置固定输出、固定失败和人工延迟
pub struct FakeTextGenerator {
    response: String,
    fail: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeTextGenerator {
    pub fn new() -> Self {
        Self::with_response(DEFAULT_RESPONSE)
    }

    /// 固定返回给定文本
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            fail: false,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// 每次调用都返回 ServiceError
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            fail: true,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// 每次调用前先等待，用于并发时序测试
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FakeTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGeneratorPort for FakeTextGenerator {
    async fn generate_text(
        &self,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(GenerationError::Service(
                "fake generator configured to fail".to_string(),
            ));
        }

        tracing::debug!(
            prompt_len = prompt.len(),
            "FakeTextGenerator: returning fixed text"
        );
        Ok(self.response.clone())
    }

    async fn health_check(&self) -> bool {
        !self.fail
    }
}
