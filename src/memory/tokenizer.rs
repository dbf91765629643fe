//! 分词
//!
//! 知识库关键词检索用的中英文混合分词：含 CJK 字符时走 jieba 搜索引擎模式，
//! 否则按空白切分并去掉首尾标点。

use std::collections::HashSet;
use std::sync::OnceLock;

use jieba_rs::Jieba;

static JIEBA: OnceLock<Jieba> = OnceLock::new();

fn jieba() -> &'static Jieba {
    JIEBA.get_or_init(Jieba::new)
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}' |
        '\u{3400}'..='\u{4DBF}' |
        '\u{F900}'..='\u{FAFF}' |
        '\u{3040}'..='\u{309F}' |
        '\u{30A0}'..='\u{30FF}'
    )
}

/// 文本是否包含 CJK 字符
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

/// 单个词是否值得保留：单字 CJK 保留，其余至少两个字符
fn keep_token(token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => is_cjk(c),
        (Some(_), Some(_)) => true,
        _ => false,
    }
}

/// 分词并统一小写
pub fn tokenize(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let raw: Vec<String> = if contains_cjk(text) {
        jieba()
            .cut_for_search(text, true)
            .into_iter()
            .map(str::to_string)
            .collect()
    } else {
        text.split_whitespace().map(str::to_string).collect()
    };

    raw.into_iter()
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|t| keep_token(t))
        .collect()
}

/// 分词并去重
pub fn tokenize_to_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

/// Jaccard 相似度，任一集合为空时为 0
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f32;
    let union = a.union(b).count() as f32;
    intersection / union
}
