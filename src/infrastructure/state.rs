//! Application State
//!
//! 组合根：按配置装配端口适配器与处理器，
//! 对外（宿主 HTTP 层）暴露生成、取音、指标与缓存清理操作。

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::{
    // Cached services
    CachedConversationService, CachedSpeechSynthesizer, MetricsSnapshot,
    // Commands + handlers
    GenerateConversationCommand, GenerateConversationHandler, GenerateTurnAudioCommand,
    GenerateTurnAudioHandler, TurnAudioResponse,
    // Ports
    ContentStorePort, EphemeralCachePort, SpeechSynthesizerPort, TextGeneratorPort,
    // Errors
    ApplicationError,
};
use crate::config::{AppConfig, CacheConfig, GenerationConfig, SpeechConfig};
use crate::domain::conversation::Conversation;
use crate::infrastructure::adapters::generation::{
    FakeTextGenerator, HttpTextGenerator, HttpTextGeneratorConfig,
};
use crate::infrastructure::adapters::speech::{
    FakeSpeechSynthesizer, HttpSpeechSynthesizer, HttpSpeechSynthesizerConfig,
};
use crate::infrastructure::adapters::storage::FsContentStore;
use crate::infrastructure::memory::{MemoryCache, NoopCache};
use crate::infrastructure::persistence::{SledCache, SledCacheConfig};

/// 应用状态
///
/// 所有协作者以 `Arc<dyn Port>` 注入，没有全局单例。
/// 短期缓存两个装饰器共用同一个后端实例。
pub struct AppState {
    // ========== Ports ==========
    pub content_store: Arc<dyn ContentStorePort>,
    pub ephemeral_cache: Arc<dyn EphemeralCachePort>,
    pub text_generator: Arc<dyn TextGeneratorPort>,

    // ========== Services ==========
    pub speech_synthesizer: Arc<CachedSpeechSynthesizer>,
    pub conversation_service: CachedConversationService,
    pub turn_audio_handler: GenerateTurnAudioHandler,
}

impl AppState {
    /// 创建应用状态
    ///
    /// 音频处理器注入的是装饰后的合成端口，
    /// 同一句文本即使出现在不同生词的对话里也只合成一次。
    pub fn new(
        content_store: Arc<dyn ContentStorePort>,
        ephemeral_cache: Arc<dyn EphemeralCachePort>,
        text_generator: Arc<dyn TextGeneratorPort>,
        speech_synthesizer: Arc<dyn SpeechSynthesizerPort>,
        config: &AppConfig,
    ) -> Self {
        let speech_synthesizer = Arc::new(CachedSpeechSynthesizer::new(
            speech_synthesizer,
            ephemeral_cache.clone(),
            config.cache.audio_ttl_secs,
        ));

        let conversation_handler = GenerateConversationHandler::new(
            content_store.clone(),
            text_generator.clone(),
            config.generation.options(),
            config.storage.convo_namespace.clone(),
        );
        let conversation_service = CachedConversationService::new(
            conversation_handler,
            ephemeral_cache.clone(),
            config.cache.conversation_ttl_secs,
        );

        let turn_audio_handler = GenerateTurnAudioHandler::new(
            content_store.clone(),
            speech_synthesizer.clone(),
            config.speech.options(),
            config.storage.convo_namespace.clone(),
            config.storage.audio_namespace.clone(),
        );

        Self {
            content_store,
            ephemeral_cache,
            text_generator,
            speech_synthesizer,
            conversation_service,
            turn_audio_handler,
        }
    }

    /// 按配置装配全部适配器
    ///
    /// API key 为空的外部服务自动换用 Fake 适配器（离线开发模式）；
    /// 短期缓存后端打不开时退回空实现，不阻塞启动。
    pub fn from_config(config: &AppConfig) -> Result<Self, ApplicationError> {
        let content_store: Arc<dyn ContentStorePort> = Arc::new(FsContentStore::new(
            config.storage.base_dir.clone(),
            config.storage.public_base_url.clone(),
        ));
        let ephemeral_cache = connect_ephemeral_cache(&config.cache);
        let text_generator = build_text_generator(&config.generation)?;
        let speech_synthesizer = build_speech_synthesizer(&config.speech)?;

        Ok(Self::new(
            content_store,
            ephemeral_cache,
            text_generator,
            speech_synthesizer,
            config,
        ))
    }

    /// 生成或复用生词对话文本
    pub async fn generate_conversation_text(
        &self,
        cmd: GenerateConversationCommand,
    ) -> Result<Conversation, ApplicationError> {
        self.conversation_service.handle(cmd).await
    }

    /// 为已有对话的指定轮次生成或复用音频
    pub async fn generate_turn_audio(
        &self,
        cmd: GenerateTurnAudioCommand,
    ) -> Result<TurnAudioResponse, ApplicationError> {
        self.turn_audio_handler.handle(cmd).await
    }

    /// 各服务命中指标快照
    pub fn metrics(&self) -> MetricsSnapshot {
        let mut services = BTreeMap::new();
        services.insert(
            "conversation".to_string(),
            self.conversation_service.metrics(),
        );
        services.insert("audio".to_string(), self.speech_synthesizer.metrics());
        MetricsSnapshot::from_services(services)
    }

    /// 删除键名包含 tag 的短期缓存条目（如按 wordId 失效），返回删除数
    pub async fn clear_cache(&self, tag: &str) -> u64 {
        match self.ephemeral_cache.clear(tag).await {
            Ok(count) => {
                tracing::info!(tag = %tag, removed = count, "Ephemeral cache cleared");
                count
            }
            Err(e) => {
                tracing::warn!(tag = %tag, error = %e, "Ephemeral cache clear failed");
                0
            }
        }
    }

    /// 外部服务就绪探测，供宿主层 readiness 使用
    pub async fn health_check(&self) -> bool {
        self.text_generator.health_check().await && self.speech_synthesizer.health_check().await
    }
}

/// 按配置选择短期缓存后端
fn connect_ephemeral_cache(config: &CacheConfig) -> Arc<dyn EphemeralCachePort> {
    if !config.enabled {
        tracing::info!("Ephemeral cache disabled, using noop backend");
        return Arc::new(NoopCache::new());
    }

    match config.backend.as_str() {
        "memory" => {
            tracing::info!("Ephemeral cache backend: memory");
            Arc::new(MemoryCache::new())
        }
        "noop" => Arc::new(NoopCache::new()),
        _ => {
            let sled_config = SledCacheConfig {
                db_path: config.sled_path.clone(),
            };
            match SledCache::new(&sled_config) {
                Ok(cache) => Arc::new(cache),
                // 打不开按不可达处理，降级运行
                Err(e) => {
                    tracing::warn!(
                        db_path = %config.sled_path,
                        error = %e,
                        "Failed to open sled cache, falling back to noop"
                    );
                    Arc::new(NoopCache::new())
                }
            }
        }
    }
}

fn build_text_generator(
    config: &GenerationConfig,
) -> Result<Arc<dyn TextGeneratorPort>, ApplicationError> {
    if config.api_key.is_empty() {
        tracing::warn!("Generation API key is empty, using fake text generator");
        return Ok(Arc::new(FakeTextGenerator::new()));
    }

    let http_config =
        HttpTextGeneratorConfig::new(config.base_url.clone(), config.api_key.clone())
            .with_timeout(config.timeout_secs);
    Ok(Arc::new(HttpTextGenerator::new(http_config)?))
}

fn build_speech_synthesizer(
    config: &SpeechConfig,
) -> Result<Arc<dyn SpeechSynthesizerPort>, ApplicationError> {
    if config.api_key.is_empty() {
        tracing::warn!("Speech API key is empty, using fake speech synthesizer");
        return Ok(Arc::new(FakeSpeechSynthesizer::new()));
    }

    let http_config =
        HttpSpeechSynthesizerConfig::new(config.base_url.clone(), config.api_key.clone())
            .with_timeout(config.timeout_secs);
    Ok(Arc::new(HttpSpeechSynthesizer::new(http_config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.base_dir = dir.path().join("store");
        config.cache.backend = "memory".to_string();
        config
    }

    fn convo_cmd(word_id: &str, word: &str) -> GenerateConversationCommand {
        GenerateConversationCommand {
            word_id: word_id.to_string(),
            word: word.to_string(),
            generator_version: "v1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_from_config_serves_text_then_audio() {
        let dir = TempDir::new().unwrap();
        let state = AppState::from_config(&test_config(&dir)).unwrap();

        let conv = state
            .generate_conversation_text(convo_cmd("w1", "你好"))
            .await
            .unwrap();
        assert_eq!(conv.turn_count(), 3);

        let text = conv.turn(0).unwrap().chinese().to_string();
        let resp = state
            .generate_turn_audio(GenerateTurnAudioCommand {
                word_id: "w1".to_string(),
                turn_index: 0,
                text: text.clone(),
                voice: None,
            })
            .await
            .unwrap();
        assert!(!resp.cached);
        assert!(resp.audio_url.ends_with(".mp3"));

        // 同一轮第二次直接短路
        let again = state
            .generate_turn_audio(GenerateTurnAudioCommand {
                word_id: "w1".to_string(),
                turn_index: 0,
                text,
                voice: None,
            })
            .await
            .unwrap();
        assert!(again.cached);
        assert_eq!(again.audio_url, resp.audio_url);
    }

    #[tokio::test]
    async fn test_metrics_keyed_by_service_name() {
        let dir = TempDir::new().unwrap();
        let state = AppState::from_config(&test_config(&dir)).unwrap();

        state
            .generate_conversation_text(convo_cmd("w1", "你好"))
            .await
            .unwrap();
        state
            .generate_conversation_text(convo_cmd("w1", "你好"))
            .await
            .unwrap();

        let snapshot = state.metrics();
        assert!(snapshot.services.contains_key("conversation"));
        assert!(snapshot.services.contains_key("audio"));

        let conversation = &snapshot.services["conversation"];
        assert_eq!(conversation.total, 2);
        assert_eq!(conversation.hits, 1);
        assert_eq!(conversation.misses, 1);
        assert_eq!(snapshot.overall.total, 2);
    }

    #[tokio::test]
    async fn test_clear_cache_by_word_id() {
        let dir = TempDir::new().unwrap();
        let state = AppState::from_config(&test_config(&dir)).unwrap();

        state
            .generate_conversation_text(convo_cmd("w1", "你好"))
            .await
            .unwrap();
        assert_eq!(state.clear_cache("w1").await, 1);
        assert_eq!(state.clear_cache("w1").await, 0);
    }

    #[tokio::test]
    async fn test_disabled_cache_selects_noop() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.cache.enabled = false;

        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.ephemeral_cache.name(), "noop");
    }

    #[tokio::test]
    async fn test_unopenable_sled_falls_back_to_noop() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.cache.backend = "sled".to_string();

        // 父路径是普通文件，sled 打开必然失败
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        config.cache.sled_path = blocker
            .join("db")
            .to_string_lossy()
            .to_string();

        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.ephemeral_cache.name(), "noop");
    }

    #[tokio::test]
    async fn test_empty_api_keys_select_fake_adapters() {
        let dir = TempDir::new().unwrap();
        let state = AppState::from_config(&test_config(&dir)).unwrap();

        // Fake 适配器始终就绪
        assert!(state.health_check().await);
    }
}
