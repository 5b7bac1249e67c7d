//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作

mod audio_commands;
mod conversation_commands;

pub mod handlers;

pub use audio_commands::*;
pub use conversation_commands::*;
