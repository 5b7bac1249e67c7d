//! Conversation Context - 对话限界上下文
//!
//! 职责:
//! - 对话聚合管理
//! - 对话轮次实体
//! - 生词标识与说话人值对象

mod aggregate;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::Conversation;
pub use entities::Turn;
pub use errors::ConversationError;
pub use value_objects::{Speaker, WordId};
