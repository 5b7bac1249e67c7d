//! Audio Commands - 逐轮音频生成命令

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 生成单轮音频命令
#[derive(Debug, Clone)]
pub struct GenerateTurnAudioCommand {
    pub word_id: String,
    pub turn_index: usize,
    pub text: String,
    /// 不传时使用配置的默认音色
    pub voice: Option<String>,
}

/// 单轮音频生成响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnAudioResponse {
    pub conversation_id: String,
    pub turn_index: usize,
    pub audio_url: String,
    pub voice: String,
    /// 是否直接复用了已填充的 audioUrl
    pub cached: bool,
    pub generated_at: DateTime<Utc>,
}
