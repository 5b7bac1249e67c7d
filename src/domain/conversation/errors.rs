//! Conversation Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("word_id 不能为空")]
    EmptyWordId,

    #[error("词语不能为空")]
    EmptyWord,

    #[error("对话轮数必须在 {min} 到 {max} 之间，实际为 {actual}")]
    TurnCountOutOfBounds {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("轮次索引越界: {index} (共 {len} 轮)")]
    TurnIndexOutOfRange { index: usize, len: usize },
}
