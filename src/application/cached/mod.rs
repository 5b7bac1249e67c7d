//! 缓存装饰层
//!
//! 短期缓存包装昂贵的生成调用:
//! - conversation: 包装对话编排，键含 wordId 便于按词失效
//! - audio: 在合成端口上包装，键只含文本与音色，相同句子跨词复用
//!
//! 装饰器吞掉一切缓存后端错误，降级为未命中，绝不让缓存故障
//! 影响业务调用。

mod audio_cache;
mod conversation_cache;
mod metrics;

pub use audio_cache::CachedSpeechSynthesizer;
pub use conversation_cache::CachedConversationService;
pub use metrics::{MetricsSnapshot, ServiceCounters, ServiceMetrics};

/// 对话请求的短期缓存键
///
/// wordId 以明文嵌入，clear(wordId) 按子串即可命中。
pub(crate) fn conversation_request_key(word_id: &str, word: &str, version: &str) -> String {
    let digest = md5::compute(format!("{}:{}", word, version).as_bytes());
    format!("convo:{}:{:x}", word_id, digest)
}

/// 合成请求的短期缓存键，只由文本和音色决定
pub(crate) fn audio_request_key(text: &str, voice: &str) -> String {
    let digest = md5::compute(text.as_bytes());
    format!("audio:{:x}:{}", digest, voice)
}
