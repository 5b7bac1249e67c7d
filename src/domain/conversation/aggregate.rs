//! Conversation Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ConversationError, Turn, WordId};
use crate::domain::cache_key;
use crate::domain::turn_parser::{MAX_TURNS, MIN_TURNS};

/// Conversation 聚合根
///
/// 围绕一个生词生成的 A/B 两人对话。
///
/// 不变量:
/// - turns 数量固定在 [MIN_TURNS, MAX_TURNS]
/// - id 由 word_id 确定性派生，同一 word_id 永远得到同一 id
/// - 除逐轮音频填充外不可变（generated_at 不随填充更新）
///
/// 序列化为 camelCase，持久化 JSON 与对外接口共用同一格式。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    id: String,
    word_id: WordId,
    word: String,
    generator_version: String,
    prompt: String,
    turns: Vec<Turn>,
    generated_at: DateTime<Utc>,
}

impl Conversation {
    /// 组装新会话
    ///
    /// turns 必须已经过解析器约束（[3,5] 轮），否则拒绝。
    pub fn new(
        word_id: WordId,
        word: impl Into<String>,
        generator_version: impl Into<String>,
        prompt: impl Into<String>,
        turns: Vec<Turn>,
    ) -> Result<Self, ConversationError> {
        let word = word.into();
        if word.trim().is_empty() {
            return Err(ConversationError::EmptyWord);
        }
        if turns.len() < MIN_TURNS || turns.len() > MAX_TURNS {
            return Err(ConversationError::TurnCountOutOfBounds {
                min: MIN_TURNS,
                max: MAX_TURNS,
                actual: turns.len(),
            });
        }

        Ok(Self {
            id: cache_key::conversation_id(word_id.as_str()),
            word_id,
            word,
            generator_version: generator_version.into(),
            prompt: prompt.into(),
            turns,
            generated_at: Utc::now(),
        })
    }

    /// 填充指定轮次的音频 URL（幂等）
    ///
    /// 已填充的轮次保持原值不被覆盖，返回当前生效的 URL。
    pub fn fill_turn_audio(
        &mut self,
        index: usize,
        url: String,
    ) -> Result<&str, ConversationError> {
        let len = self.turns.len();
        let turn = self
            .turns
            .get_mut(index)
            .ok_or(ConversationError::TurnIndexOutOfRange { index, len })?;

        if !turn.has_audio() {
            turn.set_audio_url(url);
        }
        // 上面刚刚设置或原本已存在
        Ok(self.turns[index].audio_url().unwrap_or_default())
    }

    // Getters
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn word_id(&self) -> &WordId {
        &self.word_id
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn generator_version(&self) -> &str {
        &self.generator_version
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn turn(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}
