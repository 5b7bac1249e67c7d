//! Audio Command Handlers - 逐轮音频填充

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::application::commands::audio_commands::{GenerateTurnAudioCommand, TurnAudioResponse};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ContentStoreError, ContentStorePort, SpeechOptions, SpeechSynthesizerPort,
};
use crate::domain::cache_key;
use crate::domain::conversation::{Conversation, WordId};

/// GenerateTurnAudio Handler - 幂等的单轮音频生成
///
/// 前置条件: 对话文本必须已生成并落盘。
/// 对话 JSON 的读-改-写全程持有 per-conversation 锁，
/// 同一对话不同轮次的并发填充互相可见，不丢失已填充的 URL。
pub struct GenerateTurnAudioHandler {
    content_store: Arc<dyn ContentStorePort>,
    synthesizer: Arc<dyn SpeechSynthesizerPort>,
    options: SpeechOptions,
    convo_namespace: String,
    audio_namespace: String,
    conversation_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl GenerateTurnAudioHandler {
    pub fn new(
        content_store: Arc<dyn ContentStorePort>,
        synthesizer: Arc<dyn SpeechSynthesizerPort>,
        options: SpeechOptions,
        convo_namespace: impl Into<String>,
        audio_namespace: impl Into<String>,
    ) -> Self {
        Self {
            content_store,
            synthesizer,
            options,
            convo_namespace: convo_namespace.into(),
            audio_namespace: audio_namespace.into(),
            conversation_locks: DashMap::new(),
        }
    }

    pub async fn handle(
        &self,
        cmd: GenerateTurnAudioCommand,
    ) -> Result<TurnAudioResponse, ApplicationError> {
        let word_id = WordId::new(&cmd.word_id)?;
        if cmd.text.trim().is_empty() {
            return Err(ApplicationError::validation("text 不能为空"));
        }
        let voice = self.resolve_voice(cmd.voice.as_deref());

        let convo_path = cache_key::conversation_path(&self.convo_namespace, word_id.as_str());

        let lock = self
            .conversation_locks
            .entry(convo_path.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock().await;
        let result = self
            .fill_locked(&convo_path, &word_id, &cmd, voice)
            .await;
        drop(guard);

        self.conversation_locks
            .remove_if(&convo_path, |_, l| Arc::strong_count(l) <= 2);

        result
    }

    /// 持锁执行完整的 读-改-写
    async fn fill_locked(
        &self,
        convo_path: &str,
        word_id: &WordId,
        cmd: &GenerateTurnAudioCommand,
        voice: String,
    ) -> Result<TurnAudioResponse, ApplicationError> {
        let mut conversation = self.load_conversation(convo_path, word_id).await?;

        let turn = conversation.turn(cmd.turn_index).ok_or_else(|| {
            tracing::warn!(
                conversation_id = %conversation.id(),
                turn_index = cmd.turn_index,
                turn_count = conversation.turn_count(),
                "Turn index out of range"
            );
            ApplicationError::not_found(
                "Turn",
                format!("{}#{}", conversation.id(), cmd.turn_index),
            )
        })?;

        // 已填充直接复用
        if let Some(url) = turn.audio_url() {
            tracing::info!(
                conversation_id = %conversation.id(),
                turn_index = cmd.turn_index,
                "Turn audio already filled"
            );
            return Ok(TurnAudioResponse {
                conversation_id: conversation.id().to_string(),
                turn_index: cmd.turn_index,
                audio_url: url.to_string(),
                voice,
                cached: true,
                generated_at: Utc::now(),
            });
        }

        let audio_path = cache_key::turn_audio_path(
            &self.audio_namespace,
            word_id.as_str(),
            cmd.turn_index,
            &cmd.text,
        );

        let url = if self
            .content_store
            .exists(&audio_path)
            .await
            .map_err(|e| {
                ApplicationError::storage(
                    format!("check audio {}#{}", word_id, cmd.turn_index),
                    e,
                )
            })?
        {
            // 音频对象已在，跳过合成
            tracing::info!(path = %audio_path, "Audio object exists, reusing");
            self.content_store.public_url(&audio_path)
        } else {
            tracing::info!(
                conversation_id = %conversation.id(),
                turn_index = cmd.turn_index,
                voice = %voice,
                "Synthesizing turn audio"
            );
            let options = SpeechOptions {
                voice_name: voice.clone(),
                ..self.options.clone()
            };
            let bytes = self
                .synthesizer
                .synthesize_speech(&cmd.text, &options)
                .await?;
            self.content_store
                .upload(&audio_path, &bytes, "audio/mpeg")
                .await
                .map_err(|e| {
                    ApplicationError::storage(
                        format!("upload audio {}#{}", word_id, cmd.turn_index),
                        e,
                    )
                })?;
            self.content_store.public_url(&audio_path)
        };

        conversation.fill_turn_audio(cmd.turn_index, url.clone())?;
        let bytes = serde_json::to_vec(&conversation)
            .map_err(|e| ApplicationError::internal(e.to_string()))?;
        self.content_store
            .upload(convo_path, &bytes, "application/json")
            .await
            .map_err(|e| {
                ApplicationError::storage(
                    format!("persist conversation {}#{}", word_id, cmd.turn_index),
                    e,
                )
            })?;

        tracing::info!(
            conversation_id = %conversation.id(),
            turn_index = cmd.turn_index,
            url = %url,
            "Turn audio filled"
        );

        Ok(TurnAudioResponse {
            conversation_id: conversation.id().to_string(),
            turn_index: cmd.turn_index,
            audio_url: url,
            voice,
            cached: false,
            generated_at: Utc::now(),
        })
    }

    /// 加载父对话，缺失视为前置条件未满足
    async fn load_conversation(
        &self,
        path: &str,
        word_id: &WordId,
    ) -> Result<Conversation, ApplicationError> {
        let missing = || {
            tracing::warn!(word_id = %word_id, "Conversation not found, generate text first");
            ApplicationError::not_found("Conversation", cache_key::conversation_id(word_id.as_str()))
        };

        if !self
            .content_store
            .exists(path)
            .await
            .map_err(|e| {
                ApplicationError::storage(format!("check conversation {}", word_id), e)
            })?
        {
            return Err(missing());
        }

        let bytes = match self.content_store.download(path).await {
            Ok(bytes) => bytes,
            Err(ContentStoreError::NotFound(_)) => return Err(missing()),
            Err(e) => {
                return Err(ApplicationError::storage(
                    format!("download conversation {}", word_id),
                    e,
                ))
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| {
            ApplicationError::internal(format!("cached conversation is corrupt: {}", e))
        })
    }

    /// 空或缺省音色回落到配置默认值
    fn resolve_voice(&self, requested: Option<&str>) -> String {
        match requested {
            Some(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => self.options.voice_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::{Speaker, Turn};
    use crate::infrastructure::adapters::speech::FakeSpeechSynthesizer;
    use crate::infrastructure::adapters::storage::FsContentStore;
    use std::time::Duration;
    use tempfile::TempDir;

    fn options() -> SpeechOptions {
        SpeechOptions {
            language_code: "cmn-CN".to_string(),
            voice_name: "cmn-CN-Wavenet-A".to_string(),
            audio_encoding: "MP3".to_string(),
        }
    }

    fn store(dir: &TempDir) -> Arc<FsContentStore> {
        Arc::new(FsContentStore::new(
            dir.path().to_path_buf(),
            "http://localhost:5070/assets",
        ))
    }

    fn handler_with(
        store: Arc<FsContentStore>,
        synthesizer: Arc<FakeSpeechSynthesizer>,
    ) -> GenerateTurnAudioHandler {
        GenerateTurnAudioHandler::new(store, synthesizer, options(), "convo", "audio")
    }

    async fn seed_conversation(store: &FsContentStore, word_id: &str) -> Conversation {
        let turns = vec![
            Turn::new(Speaker::A, "你好", "nǐ hǎo", "Hello"),
            Turn::new(Speaker::B, "你好吗", "nǐ hǎo ma", "How are you"),
            Turn::new(Speaker::A, "我很好", "wǒ hěn hǎo", "I am fine"),
        ];
        let conv = Conversation::new(
            WordId::new(word_id).unwrap(),
            "你好",
            "v1",
            "prompt",
            turns,
        )
        .unwrap();
        let path = cache_key::conversation_path("convo", word_id);
        store
            .upload(&path, &serde_json::to_vec(&conv).unwrap(), "application/json")
            .await
            .unwrap();
        conv
    }

    async fn reload(store: &FsContentStore, word_id: &str) -> Conversation {
        let path = cache_key::conversation_path("convo", word_id);
        serde_json::from_slice(&store.download(&path).await.unwrap()).unwrap()
    }

    fn cmd(word_id: &str, turn_index: usize, text: &str) -> GenerateTurnAudioCommand {
        GenerateTurnAudioCommand {
            word_id: word_id.to_string(),
            turn_index,
            text: text.to_string(),
            voice: None,
        }
    }

    #[tokio::test]
    async fn test_missing_conversation_is_not_found() {
        let dir = TempDir::new().unwrap();
        let synthesizer = Arc::new(FakeSpeechSynthesizer::with_audio(b"mp3".to_vec()));
        let handler = handler_with(store(&dir), synthesizer.clone());

        let err = handler.handle(cmd("w1", 0, "你好")).await.unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
        assert_eq!(synthesizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fresh_synthesis_uploads_and_persists_url() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let synthesizer = Arc::new(FakeSpeechSynthesizer::with_audio(b"mp3-bytes".to_vec()));
        let handler = handler_with(store.clone(), synthesizer.clone());
        seed_conversation(&store, "w1").await;

        let resp = handler.handle(cmd("w1", 1, "你好吗")).await.unwrap();

        assert_eq!(synthesizer.call_count(), 1);
        assert!(!resp.cached);
        assert_eq!(resp.turn_index, 1);
        assert_eq!(resp.voice, "cmn-CN-Wavenet-A");
        assert!(resp.audio_url.starts_with("http://localhost:5070/assets/audio/w1/"));
        assert!(resp.audio_url.ends_with(".mp3"));

        // 音频对象落盘
        let audio_path = cache_key::turn_audio_path("audio", "w1", 1, "你好吗");
        assert_eq!(store.download(&audio_path).await.unwrap(), b"mp3-bytes");

        // 对话 JSON 带上了 audioUrl
        let conv = reload(&store, "w1").await;
        assert_eq!(conv.turn(1).unwrap().audio_url(), Some(resp.audio_url.as_str()));
        assert!(!conv.turn(0).unwrap().has_audio());
    }

    #[tokio::test]
    async fn test_second_call_short_circuits_as_cached() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let synthesizer = Arc::new(FakeSpeechSynthesizer::with_audio(b"mp3".to_vec()));
        let handler = handler_with(store.clone(), synthesizer.clone());
        seed_conversation(&store, "w1").await;

        let first = handler.handle(cmd("w1", 0, "你好")).await.unwrap();
        let second = handler.handle(cmd("w1", 0, "你好")).await.unwrap();

        assert_eq!(synthesizer.call_count(), 1);
        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(second.audio_url, first.audio_url);
    }

    #[tokio::test]
    async fn test_existing_audio_object_reused_without_synthesis() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let synthesizer = Arc::new(FakeSpeechSynthesizer::with_audio(b"new".to_vec()));
        let handler = handler_with(store.clone(), synthesizer.clone());
        seed_conversation(&store, "w1").await;

        // 上次运行留下的音频对象，但对话里还没记录 URL
        let audio_path = cache_key::turn_audio_path("audio", "w1", 0, "你好");
        store.upload(&audio_path, b"old", "audio/mpeg").await.unwrap();

        let resp = handler.handle(cmd("w1", 0, "你好")).await.unwrap();

        assert_eq!(synthesizer.call_count(), 0);
        assert!(!resp.cached);
        assert_eq!(store.download(&audio_path).await.unwrap(), b"old");

        let conv = reload(&store, "w1").await;
        assert!(conv.turn(0).unwrap().has_audio());
    }

    #[tokio::test]
    async fn test_invalid_inputs_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let synthesizer = Arc::new(FakeSpeechSynthesizer::with_audio(b"mp3".to_vec()));
        let handler = handler_with(store.clone(), synthesizer);
        seed_conversation(&store, "w1").await;

        // 轮次缺失与对话缺失同级，都算前置条件未满足
        assert!(matches!(
            handler.handle(cmd("w1", 9, "你好")).await.unwrap_err(),
            ApplicationError::NotFound { resource_type: "Turn", .. }
        ));
        assert!(matches!(
            handler.handle(cmd("w1", 0, "  ")).await.unwrap_err(),
            ApplicationError::ValidationError(_)
        ));
        assert!(matches!(
            handler.handle(cmd("", 0, "你好")).await.unwrap_err(),
            ApplicationError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn test_storage_error_names_word_and_turn() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let synthesizer = Arc::new(FakeSpeechSynthesizer::with_audio(b"mp3".to_vec()));
        let handler = handler_with(store.clone(), synthesizer.clone());
        seed_conversation(&store, "w1").await;

        // audio 命名空间被普通文件占据，查音频对象时报错
        std::fs::write(dir.path().join("audio"), b"blocker").unwrap();

        let err = handler.handle(cmd("w1", 0, "你好")).await.unwrap_err();
        match err {
            ApplicationError::Storage { context, .. } => {
                assert!(context.contains("w1#0"), "{context}");
            }
            other => panic!("expected storage error, got {other:?}"),
        }
        assert_eq!(synthesizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_explicit_voice_overrides_default() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let synthesizer = Arc::new(FakeSpeechSynthesizer::with_audio(b"mp3".to_vec()));
        let handler = handler_with(store.clone(), synthesizer.clone());
        seed_conversation(&store, "w1").await;

        let mut command = cmd("w1", 0, "你好");
        command.voice = Some("cmn-CN-Wavenet-B".to_string());
        let resp = handler.handle(command).await.unwrap();

        assert_eq!(resp.voice, "cmn-CN-Wavenet-B");
        assert_eq!(
            synthesizer.last_voice().await.as_deref(),
            Some("cmn-CN-Wavenet-B")
        );

        // 空字符串视同未指定
        let mut command = cmd("w1", 1, "你好吗");
        command.voice = Some("".to_string());
        let resp = handler.handle(command).await.unwrap();
        assert_eq!(resp.voice, "cmn-CN-Wavenet-A");
    }

    #[tokio::test]
    async fn test_concurrent_fills_keep_both_urls() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let synthesizer = Arc::new(
            FakeSpeechSynthesizer::with_audio(b"mp3".to_vec())
                .with_delay(Duration::from_millis(30)),
        );
        let handler = Arc::new(handler_with(store.clone(), synthesizer.clone()));
        seed_conversation(&store, "w1").await;

        let h0 = {
            let handler = handler.clone();
            tokio::spawn(async move { handler.handle(cmd("w1", 0, "你好")).await })
        };
        let h1 = {
            let handler = handler.clone();
            tokio::spawn(async move { handler.handle(cmd("w1", 1, "你好吗")).await })
        };
        h0.await.unwrap().unwrap();
        h1.await.unwrap().unwrap();

        // 读-改-写有锁，两个轮次的 URL 都保留
        let conv = reload(&store, "w1").await;
        assert!(conv.turn(0).unwrap().has_audio());
        assert!(conv.turn(1).unwrap().has_audio());
        assert_eq!(synthesizer.call_count(), 2);
    }
}
