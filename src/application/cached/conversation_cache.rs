//! Cached Conversation Service - 对话编排的短期缓存装饰

use std::sync::Arc;

use crate::application::cached::{conversation_request_key, ServiceCounters, ServiceMetrics};
use crate::application::commands::GenerateConversationCommand;
use crate::application::commands::handlers::GenerateConversationHandler;
use crate::application::error::ApplicationError;
use crate::application::ports::EphemeralCachePort;
use crate::domain::conversation::Conversation;

/// 包装 [`GenerateConversationHandler`]，命中时跳过持久层读取
///
/// 注意短期条目可能落后于持久层（逐轮音频填充只更新持久 JSON），
/// 在 TTL 窗口内读到无 audioUrl 的对话属预期行为。
pub struct CachedConversationService {
    inner: GenerateConversationHandler,
    cache: Arc<dyn EphemeralCachePort>,
    ttl_secs: u64,
    counters: ServiceCounters,
}

impl CachedConversationService {
    pub fn new(
        inner: GenerateConversationHandler,
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

    pub async fn handle(
        &self,
        cmd: GenerateConversationCommand,
    ) -> Result<Conversation, ApplicationError> {
        self.counters.record_call();
        let key = conversation_request_key(&cmd.word_id, &cmd.word, &cmd.generator_version);

        match self.cache.get(&key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Conversation>(&bytes) {
                Ok(conversation) => {
                    self.counters.record_hit();
                    tracing::debug!(key = %key, "Ephemeral conversation hit");
                    return Ok(conversation);
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Ephemeral entry undecodable, treating as miss");
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Ephemeral cache get failed, treating as miss");
            }
        }
        self.counters.record_miss();

        let conversation = self.inner.handle(cmd).await?;

        match serde_json::to_vec(&conversation) {
            Ok(bytes) => {
                if let Err(e) = self.cache.set(&key, &bytes, self.ttl_secs).await {
                    tracing::warn!(key = %key, error = %e, "Ephemeral cache set failed");
                }
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Conversation serialization failed, skipping cache");
            }
        }

        Ok(conversation)
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
