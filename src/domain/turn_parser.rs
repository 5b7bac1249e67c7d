//! 对话轮次解析器
//!
//! 把生成模型返回的自由文本解析为结构化的 A/B 轮次

use crate::domain::conversation::{Speaker, Turn};

/// 有效对话的最少轮数
/// 解析结果不足此数时整体放弃，改用固定兜底对话
pub const MIN_TURNS: usize = 3;

/// 有效对话的最多轮数
/// 超出部分直接截断
pub const MAX_TURNS: usize = 5;

/// 检查是否为说话人分隔符（ASCII 冒号或全角冒号）
#[inline]
fn is_marker_delimiter(ch: char) -> bool {
    matches!(ch, ':' | '：')
}

/// 尝试把一行拆为 (说话人, 正文)
///
/// 行必须以单个说话人字母开头，紧跟冒号，如 `A: 你好` 或 `B：谢谢`。
fn split_marker(line: &str) -> Option<(Speaker, &str)> {
    let mut chars = line.char_indices();
    let (_, head) = chars.next()?;
    let (delim_idx, delim) = chars.next()?;
    if !is_marker_delimiter(delim) {
        return None;
    }

    let speaker = Speaker::from_marker(&head.to_string())?;
    let rest = &line[delim_idx + delim.len_utf8()..];
    Some((speaker, rest.trim()))
}

/// 解析 `中文 | 拼音 | 英文` 三段式正文
///
/// 竖线不足时缺失字段置空，多余竖线并入英文字段。
fn split_fields(content: &str) -> (String, String, String) {
    let mut parts = content.splitn(3, '|').map(str::trim);
    let chinese = parts.next().unwrap_or_default().to_string();
    let pinyin = parts.next().unwrap_or_default().to_string();
    let english = parts.next().unwrap_or_default().to_string();
    (chinese, pinyin, english)
}

/// 固定兜底对话（3 轮问候，A 起头交替）
///
/// 模型输出完全不可解析时使用，保证下游永远拿到合法轮数。
pub fn fallback_turns() -> Vec<Turn> {
    let lines = [
        ("你好！", "nǐ hǎo", "Hello!"),
        (
            "你好，很高兴见到你。",
            "nǐ hǎo, hěn gāo xìng jiàn dào nǐ",
            "Hello, nice to meet you.",
        ),
        (
            "我们一起学习吧。",
            "wǒ men yī qǐ xué xí ba",
            "Let's study together.",
        ),
    ];

    let mut speaker = Speaker::A;
    lines
        .into_iter()
        .map(|(chinese, pinyin, english)| {
            let turn = Turn::new(speaker, chinese, pinyin, english);
            speaker = speaker.other();
            turn
        })
        .collect()
}

/// 解析模型原始输出为对话轮次
///
/// 解析策略:
/// 1. 按行分割，跳过空行与无说话人标记的行
/// 2. 标记后正文按 `中文 | 拼音 | 英文` 拆分，无竖线时整行作中文
/// 3. 不足 [`MIN_TURNS`] 整体放弃，返回 [`fallback_turns`]
/// 4. 超过 [`MAX_TURNS`] 截断
///
/// 返回长度恒在 [MIN_TURNS, MAX_TURNS] 区间内。
pub fn parse_turns(raw: &str) -> Vec<Turn> {
    let mut turns: Vec<Turn> = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((speaker, content)) = split_marker(line) else {
            continue;
        };
        if content.is_empty() {
            continue;
        }

        let (chinese, pinyin, english) = split_fields(content);
        if chinese.is_empty() {
            continue;
        }
        turns.push(Turn::new(speaker, chinese, pinyin, english));

        if turns.len() == MAX_TURNS {
            break;
        }
    }

    if turns.len() < MIN_TURNS {
        return fallback_turns();
    }
    turns
}
