//! Domain Layer - 领域层
//!
//! 包含一个限界上下文:
//! - Conversation Context: 生词对话管理
//!
//! 以及共享的纯函数模块: 缓存键派生、轮次解析、prompt 构造

pub mod cache_key;
pub mod conversation;

mod prompt;
mod turn_parser;

pub use prompt::conversation_prompt;
pub use turn_parser::{fallback_turns, parse_turns, MAX_TURNS, MIN_TURNS};
