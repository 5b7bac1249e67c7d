//! Conversation Commands - 对话生成命令

/// 生成生词对话命令
#[derive(Debug, Clone)]
pub struct GenerateConversationCommand {
    pub word_id: String,
    pub word: String,
    pub generator_version: String,
}
