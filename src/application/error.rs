//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{ContentStoreError, GenerationError, SpeechError};
use crate::domain::conversation::ConversationError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 文本生成服务错误
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// 语音合成服务错误
    #[error("Speech error: {0}")]
    Speech(#[from] SpeechError),

    /// 内容存储错误
    #[error("Storage error ({context}): {source}")]
    Storage {
        context: String,
        #[source]
        source: ContentStoreError,
    },

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建存储错误
    ///
    /// context 描述失败的操作并带上出错对象的 wordId（音频场景再带轮次下标）。
    pub fn storage(context: impl Into<String>, source: ContentStoreError) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<ConversationError> for ApplicationError {
    fn from(err: ConversationError) -> Self {
        match err {
            ConversationError::EmptyWordId | ConversationError::EmptyWord => {
                Self::ValidationError(err.to_string())
            }
            _ => Self::InternalError(err.to_string()),
        }
    }
}
