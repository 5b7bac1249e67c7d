//! Conversation Context - Value Objects

use serde::{Deserialize, Serialize};

use super::errors::ConversationError;

/// 生词唯一标识
///
/// 由词库层分配的稳定 ID，是所有缓存 key 的派生源。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordId(String);

impl WordId {
    pub fn new(id: impl Into<String>) -> Result<Self, ConversationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ConversationError::EmptyWordId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 说话人
///
/// 对话固定为 A/B 两人交替。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    A,
    B,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::A => "A",
            Speaker::B => "B",
        }
    }

    /// 从行首标记解析说话人
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker.trim() {
            "A" | "a" => Some(Speaker::A),
            "B" | "b" => Some(Speaker::B),
            _ => None,
        }
    }

    /// 对方说话人
    pub fn other(&self) -> Self {
        match self {
            Speaker::A => Speaker::B,
            Speaker::B => Speaker::A,
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
