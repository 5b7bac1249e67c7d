//! 对话生成 Prompt 构造
//!
//! 输出格式与 turn_parser 的解析规则配套

use crate::domain::turn_parser::{MAX_TURNS, MIN_TURNS};

/// 为生词构造对话生成 prompt
///
/// 要求模型产出 `A: 中文 | 拼音 | 英文` 逐行格式，
/// 轮数限制与解析器的 [MIN_TURNS, MAX_TURNS] 保持一致。
pub fn conversation_prompt(word: &str) -> String {
    format!(
        "你是一名中文老师。请围绕生词\"{word}\"编写一段 {min} 到 {max} 轮的日常对话，\
         帮助学生理解这个词的用法。\n\
         要求:\n\
         1. 两个说话人分别标记为 A 和 B，交替发言\n\
         2. 每行严格按照格式输出: A: 中文句子 | 拼音 | 英文翻译\n\
         3. 对话中必须自然地用到\"{word}\"\n\
         4. 句子简短口语化，适合初学者\n\
         5. 除对话行外不要输出任何其他内容",
        word = word,
        min = MIN_TURNS,
        max = MAX_TURNS,
    )
}
