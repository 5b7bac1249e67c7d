//! 缓存 Key 派生
//!
//! 所有持久缓存 key 都是语义输入的 md5 单向哈希：
//! - 文本缓存 key 只取决于 word_id（对 word 文本、prompt、版本号不敏感，
//!   保证 key 长期稳定）
//! - 音频缓存 key 只取决于朗读文本本身，相同文本复用同一音频资产

/// 计算 md5 十六进制摘要
fn md5_hex(input: &str) -> String {
    let digest = md5::compute(input.as_bytes());
    format!("{:x}", digest)
}

/// 文本缓存 key
///
/// 只对 word_id 哈希。word 文本或生成器版本变化不会改变 key。
pub fn text_cache_key(word_id: &str) -> String {
    md5_hex(word_id)
}

/// 音频缓存 key
///
/// 对朗读文本本身哈希。
pub fn audio_cache_key(text: &str) -> String {
    md5_hex(text)
}

/// 会话 ID
///
/// 格式: `{word_id}-{hash}`，hash 为文本缓存 key。
/// 同一 word_id 的重复调用总是得到相同 ID。
pub fn conversation_id(word_id: &str) -> String {
    format!("{}-{}", word_id, text_cache_key(word_id))
}

/// 会话 JSON 在 Content Store 中的路径
///
/// 格式: `{namespace}/{word_id}/{hash}.json`
pub fn conversation_path(namespace: &str, word_id: &str) -> String {
    format!("{}/{}/{}.json", namespace, word_id, text_cache_key(word_id))
}

/// 单句音频在 Content Store 中的路径
///
/// 格式: `{namespace}/{word_id}/{conv_hash}-turn{index}-{text_hash}.mp3`
pub fn turn_audio_path(namespace: &str, word_id: &str, turn_index: usize, text: &str) -> String {
    format!(
        "{}/{}/{}-turn{}-{}.mp3",
        namespace,
        word_id,
        text_cache_key(word_id),
        turn_index,
        audio_cache_key(text)
    )
}
