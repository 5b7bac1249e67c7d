//! Fake Speech Synthesizer - 用于测试与本地开发的合成客户端
//!
//! 返回固定音频字节，不实际调用合成服务

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::application::ports::{SpeechError, SpeechOptions, SpeechSynthesizerPort};

/// Fake Speech Synthesizer
///
/// 记录调用次数与最近一次使用的音色，可配置固定失败和人工延迟
pub struct FakeSpeechSynthesizer {
    audio: Vec<u8>,
    fail: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_voice: Mutex<Option<String>>,
}

impl FakeSpeechSynthesizer {
    pub fn new() -> Self {
        // 假装是一段 MP3
        Self::with_audio(b"ID3fake-audio".to_vec())
    }

    /// 固定返回给定字节
    pub fn with_audio(audio: Vec<u8>) -> Self {
        Self {
            audio,
            fail: false,
            delay: None,
            calls: AtomicUsize::new(0),
            last_voice: Mutex::new(None),
        }
    }

    /// 每次调用都返回 ServiceError
    pub fn failing() -> Self {
        Self {
            audio: Vec::new(),
            fail: true,
            delay: None,
            calls: AtomicUsize::new(0),
            last_voice: Mutex::new(None),
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

    /// 最近一次请求的音色
    pub async fn last_voice(&self) -> Option<String> {
        self.last_voice.lock().await.clone()
    }
}

impl Default for FakeSpeechSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizerPort for FakeSpeechSynthesizer {
    async fn synthesize_speech(
        &self,
        text: &str,
        options: &SpeechOptions,
    ) -> Result<Vec<u8>, SpeechError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_voice.lock().await = Some(options.voice_name.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(SpeechError::Service(
                "fake synthesizer configured to fail".to_string(),
            ));
        }

        tracing::debug!(
            text_len = text.len(),
            voice = %options.voice_name,
            "FakeSpeechSynthesizer: returning fixed audio"
        );
        Ok(self.audio.clone())
    }

    async fn health_check(&self) -> bool {
        !self.fail
    }
}
