//! Conversation Context - Entities

use serde::{Deserialize, Serialize};

use super::Speaker;

/// 对话轮次 - 最小合成/播放单位
///
/// 不变量:
/// - chinese 不可为空（由解析器保证）
/// - audio_url 一旦非空就不再被覆盖或清除（幂等填充）
///
/// 序列化为 camelCase（持久化 JSON 与对外接口共用同一格式）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    speaker: Speaker,
    chinese: String,
    #[serde(default)]
    pinyin: String,
    #[serde(default)]
    english: String,
    #[serde(default)]
    audio_url: Option<String>,
}

impl Turn {
    pub fn new(
        speaker: Speaker,
        chinese: impl Into<String>,
        pinyin: impl Into<String>,
        english: impl Into<String>,
    ) -> Self {
        Self {
            speaker,
            chinese: chinese.into(),
            pinyin: pinyin.into(),
            english: english.into(),
            audio_url: None,
        }
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn chinese(&self) -> &str {
        &self.chinese
    }

    pub fn pinyin(&self) -> &str {
        &self.pinyin
    }

    pub fn english(&self) -> &str {
        &self.english
    }

    /// 已填充的音频 URL（空字符串视为未填充）
    pub fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref().filter(|u| !u.is_empty())
    }

    pub fn has_audio(&self) -> bool {
        self.audio_url().is_some()
    }

    pub(crate) fn set_audio_url(&mut self, url: String) {
        self.audio_url = Some(url);
    }
}
