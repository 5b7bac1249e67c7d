//! Cached Speech Synthesizer - 合成端口上的短期字节缓存

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::cached::{audio_request_key, ServiceCounters, ServiceMetrics};
use crate::application::ports::{
    EphemeralCachePort, SpeechError, SpeechOptions, SpeechSynthesizerPort,
};

/// 在 [`SpeechSynthesizerPort`] 上做装饰，TTL 内相同文本+音色直接复用字节
///
/// 键不含 wordId，同一句子出现在不同生词的对话里也只合成一次。
pub struct CachedSpeechSynthesizer {
    inner: Arc<dyn SpeechSynthesizerPort>,
    cache: Arc<dyn EphemeralCachePort>,
    ttl_secs: u64,
    counters: ServiceCounters,
}

impl CachedSpeechSynthesizer {
    pub fn new(
        inner: Arc<dyn SpeechSynthesizerPort>,
        cache: Arc<dyn EphemeralCachePort>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            inner,
            cache,
            ttl_secs,
            counters: ServiceCounters::new(),
        }
    }

    /// 删除键名包含 tag 的短期条目，返回删除数
    pub async fn invalidate(&self, tag: &str) -> u64 {
        match self.cache.clear(tag).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(tag = %tag, error = %e, "Ephemeral cache clear failed");
                0
            }
        }
    }

    pub fn metrics(&self) -> ServiceMetrics {
        self.counters.snapshot()
    }
}

#[async_trait]
impl SpeechSynthesizerPort for CachedSpeechSynthesizer {
    async fn synthesize_speech(
        &self,
        text: &str,
        options: &SpeechOptions,
    ) -> Result<Vec<u8>, SpeechError> {
        self.counters.record_call();
        let key = audio_request_key(text, &options.voice_name);

        match self.cache.get(&key).await {
            Ok(Some(bytes)) => {
                self.counters.record_hit();
                tracing::debug!(key = %key, size = bytes.len(), "Ephemeral audio hit");
                return Ok(bytes);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Ephemeral cache get failed, treating as miss");
            }
        }
        self.counters.record_miss();

        let bytes = self.inner.synthesize_speech(text, options).await?;

        if let Err(e) = self.cache.set(&key, &bytes, self.ttl_secs).await {
            tracing::warn!(key = %key, error = %e, "Ephemeral cache set failed");
        }

        Ok(bytes)
    }

    async fn health_check(&self) -> bool {
        self.inner.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::CacheError;
    use crate::infrastructure::adapters::speech::FakeSpeechSynthesizer;
    use crate::infrastructure::memory::MemoryCache;

    fn options(voice: &str) -> SpeechOptions {
        SpeechOptions {
            language_code: "cmn-CN".to_string(),
            voice_name: voice.to_string(),
            audio_encoding: "MP3".to_string(),
        }
    }

    /// get/set 永远失败的后端，用于验证故障旁路
    struct BrokenCache;

    #[async_trait]
    impl EphemeralCachePort for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: &[u8], _ttl_secs: u64) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }

        async fn clear(&self, _pattern: &str) -> Result<u64, CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_same_text_and_voice_synthesized_once() {
        let inner = Arc::new(FakeSpeechSynthesizer::with_audio(b"mp3".to_vec()));
        let cached =
            CachedSpeechSynthesizer::new(inner.clone(), Arc::new(MemoryCache::new()), 21600);

        let a = cached
            .synthesize_speech("你好", &options("cmn-CN-Wavenet-A"))
            .await
            .unwrap();
        let b = cached
            .synthesize_speech("你好", &options("cmn-CN-Wavenet-A"))
            .await
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(inner.call_count(), 1);

        let metrics = cached.metrics();
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.hit_rate, "50.00%");
    }

    #[tokio::test]
    async fn test_different_voice_misses() {
        let inner = Arc::new(FakeSpeechSynthesizer::with_audio(b"mp3".to_vec()));
        let cached =
            CachedSpeechSynthesizer::new(inner.clone(), Arc::new(MemoryCache::new()), 21600);

        cached
            .synthesize_speech("你好", &options("cmn-CN-Wavenet-A"))
            .await
            .unwrap();
        cached
            .synthesize_speech("你好", &options("cmn-CN-Wavenet-B"))
            .await
            .unwrap();

        assert_eq!(inner.call_count(), 2);
    }

    #[tokio::test]
    async fn test_broken_cache_bypassed() {
        let inner = Arc::new(FakeSpeechSynthesizer::with_audio(b"mp3".to_vec()));
        let cached = CachedSpeechSynthesizer::new(inner.clone(), Arc::new(BrokenCache), 21600);

        let bytes = cached
            .synthesize_speech("你好", &options("cmn-CN-Wavenet-A"))
            .await
            .unwrap();
        assert_eq!(bytes, b"mp3");

        // 后端错误按未命中计
        let metrics = cached.metrics();
        assert_eq!(metrics.hits, 0);
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.total, 1);
        assert_eq!(cached.invalidate("audio:").await, 0);
    }

    #[tokio::test]
    async fn test_synthesis_error_propagates_after_miss() {
        let inner = Arc::new(FakeSpeechSynthesizer::failing());
        let cached =
            CachedSpeechSynthesizer::new(inner, Arc::new(MemoryCache::new()), 21600);

        let err = cached
            .synthesize_speech("你好", &options("cmn-CN-Wavenet-A"))
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::Service(_)));

        // total 与 hits+misses 保持一致
        let metrics = cached.metrics();
        assert_eq!(metrics.total, 1);
        assert_eq!(metrics.misses, 1);
    }
}
