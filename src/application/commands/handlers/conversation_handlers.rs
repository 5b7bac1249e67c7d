//! Conversation Command Handlers - 对话文本生成

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::application::commands::conversation_commands::GenerateConversationCommand;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ContentStoreError, ContentStorePort, GenerationOptions, TextGeneratorPort,
};
use crate::domain::cache_key;
use crate::domain::conversation::{Conversation, WordId};
use crate::domain::{conversation_prompt, parse_turns};

/// GenerateConversation Handler - 生成或复用生词对话
///
/// 流程: 查持久缓存 → 命中直接返回 → 未命中走 生成 → 解析 → 落盘。
/// 同一缓存路径的并发未命中通过 per-key 锁串行化，
/// 第一个进入者生成，其余等待后直接读到已落盘结果。
pub struct GenerateConversationHandler {
    content_store: Arc<dyn ContentStorePort>,
    generator: Arc<dyn TextGeneratorPort>,
    options: GenerationOptions,
    namespace: String,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
}

impl GenerateConversationHandler {
    pub fn new(
        content_store: Arc<dyn ContentStorePort>,
        generator: Arc<dyn TextGeneratorPort>,
        options: GenerationOptions,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            content_store,
            generator,
            options,
            namespace: namespace.into(),
            in_flight: DashMap::new(),
        }
    }

    pub async fn handle(
        &self,
        cmd: GenerateConversationCommand,
    ) -> Result<Conversation, ApplicationError> {
        let word_id = WordId::new(&cmd.word_id)?;
        if cmd.word.trim().is_empty() {
            return Err(ApplicationError::validation("word 不能为空"));
        }

        let path = cache_key::conversation_path(&self.namespace, word_id.as_str());

        // 锁外快速路径
        if let Some(existing) = self.load_existing(&path).await? {
            tracing::info!(word_id = %word_id, path = %path, "Conversation cache hit");
            return Ok(existing);
        }

        let lock = self
            .in_flight
            .entry(path.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock().await;
        let result = self.generate_locked(&path, word_id, cmd).await;
        drop(guard);

        // 没有其他等待者时回收锁条目
        self.in_flight
            .remove_if(&path, |_, l| Arc::strong_count(l) <= 2);

        result
    }

    /// 持锁执行: 先复查持久缓存再生成
    async fn generate_locked(
        &self,
        path: &str,
        word_id: WordId,
        cmd: GenerateConversationCommand,
    ) -> Result<Conversation, ApplicationError> {
        // 等锁期间可能已被第一个进入者落盘
        if let Some(existing) = self.load_existing(path).await? {
            tracing::info!(word_id = %word_id, "Conversation populated while waiting");
            return Ok(existing);
        }

        tracing::info!(
            word_id = %word_id,
            word = %cmd.word,
            model = %self.options.model,
            "Conversation cache miss, generating"
        );

        let prompt = conversation_prompt(&cmd.word);
        let raw = self.generator.generate_text(&prompt, &self.options).await?;

        let turns = parse_turns(&raw);
        tracing::debug!(
            word_id = %word_id,
            turn_count = turns.len(),
            raw_len = raw.len(),
            "Parsed generation output"
        );

        let conversation =
            Conversation::new(word_id, cmd.word, cmd.generator_version, prompt, turns)?;

        let bytes = serde_json::to_vec(&conversation)
            .map_err(|e| ApplicationError::internal(e.to_string()))?;
        self.content_store
            .upload(path, &bytes, "application/json")
            .await
            .map_err(|e| {
                ApplicationError::storage(
                    format!("upload conversation {}", conversation.word_id()),
                    e,
                )
            })?;

        tracing::info!(
            conversation_id = %conversation.id(),
            path = %path,
            "Conversation persisted"
        );
        Ok(conversation)
    }

    /// 读取已落盘的对话，不存在返回 None
    async fn load_existing(&self, path: &str) -> Result<Option<Conversation>, ApplicationError> {
        if !self
            .content_store
            .exists(path)
            .await
            .map_err(|e| ApplicationError::storage(format!("check conversation {}", path), e))?
        {
            return Ok(None);
        }

        let bytes = match self.content_store.download(path).await {
            Ok(bytes) => bytes,
            // exists 与 download 之间被删除，按未命中处理
            Err(ContentStoreError::NotFound(_)) => return Ok(None),
            Err(e) => {
                return Err(ApplicationError::storage(
                    format!("download conversation {}", path),
                    e,
                ))
            }
        };

        let conversation = serde_json::from_slice(&bytes).map_err(|e| {
            ApplicationError::internal(format!("cached conversation is corrupt: {}", e))
        })?;
        Ok(Some(conversation))
    }
}
