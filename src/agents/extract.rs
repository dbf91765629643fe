//! 订单号提取：固定优先级的正则级联 + 模型兜底结果的清洗
//!
//! 每一级都是纯函数，可单独测试；级联按顺序尝试，第一个合格匹配胜出。
//! 同一级内按出现顺序扫描所有匹配，长度不足 MIN_ORDER_ID_LEN 的候选会被跳过。

use std::sync::OnceLock;

use regex::Regex;

/// 任何候选订单号的最小长度
pub const MIN_ORDER_ID_LEN: usize = 5;

/// 级联中的一级：名称（日志用）+ 匹配函数
pub type Matcher = fn(&str) -> Option<String>;

/// 按优先级排列的提取级联
pub const CASCADE: [(&str, Matcher); 5] = [
    ("labelled_structured", match_labelled_structured),
    ("bare_structured", match_bare_structured),
    ("labelled_colon", match_labelled_colon),
    ("letters_digits", match_letters_digits),
    ("long_digits", match_long_digits),
];

static LABELLED_STRUCTURED_RE: OnceLock<Regex> = OnceLock::new();
static BARE_STRUCTURED_RE: OnceLock<Regex> = OnceLock::new();
static LABELLED_COLON_RES: OnceLock<Vec<Regex>> = OnceLock::new();
static LETTERS_DIGITS_RE: OnceLock<Regex> = OnceLock::new();
static LONG_DIGITS_RE: OnceLock<Regex> = OnceLock::new();
static LLM_CANDIDATE_RE: OnceLock<Regex> = OnceLock::new();

/// 模型表示“没找到”的回复（小写比较）
const NEGATIVE_MARKERS: [&str; 5] = ["not found", "none", "null", "未找到", ""];

/// 取正则第一个捕获组的所有匹配中，第一个长度达标的
fn first_qualifying(re: &Regex, text: &str) -> Option<String> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|id| id.chars().count() >= MIN_ORDER_ID_LEN)
        .map(str::to_string)
}

/// 第 1 级：带“订单 / 订单号 / order”标签的结构化编号，如 “订单号 ORD-2024-001”
pub fn match_labelled_structured(text: &str) -> Option<String> {
    let re = LABELLED_STRUCTURED_RE.get_or_init(|| {
        Regex::new(r"(?i)(?:订单号|订单|order)[：:\s]*([A-Z]{2,}[-_]?\d{4}[-_]?\d{3,})").unwrap()
    });
    first_qualifying(re, text)
}

/// 第 2 级：无标签的结构化编号，如 ORD_2024_001
pub fn match_bare_structured(text: &str) -> Option<String> {
    let re = BARE_STRUCTURED_RE
        .get_or_init(|| Regex::new(r"(?i)([A-Z]{2,}[-_]?\d{4}[-_]?\d{3,})").unwrap());
    first_qualifying(re, text)
}

/// 第 3 级：标签 + 冒号后的任意字母数字串；三种标签依次尝试
pub fn match_labelled_colon(text: &str) -> Option<String> {
    let res = LABELLED_COLON_RES.get_or_init(|| {
        [
            r"(?i)订单[：:]\s*([A-Z0-9\-_]+)",
            r"(?i)订单号[：:]\s*([A-Z0-9\-_]+)",
            r"(?i)order[：:]\s*([A-Z0-9\-_]+)",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    });
    res.iter().find_map(|re| first_qualifying(re, text))
}

/// 第 4 级：字母紧跟数字，如 ORDER123
pub fn match_letters_digits(text: &str) -> Option<String> {
    let re = LETTERS_DIGITS_RE.get_or_init(|| Regex::new(r"(?i)([A-Z]{2,}\d{3,})").unwrap());
    first_qualifying(re, text)
}

/// 第 5 级：8 位以上纯数字
pub fn match_long_digits(text: &str) -> Option<String> {
    let re = LONG_DIGITS_RE.get_or_init(|| Regex::new(r"(\d{8,})").unwrap());
    first_qualifying(re, text)
}

/// 依次尝试级联，返回命中的级别名称与订单号
pub fn extract_by_patterns(text: &str) -> Option<(&'static str, String)> {
    CASCADE
        .iter()
        .find_map(|(name, matcher)| matcher(text).map(|id| (*name, id)))
}

/// 清洗模型兜底提取的回复：去首尾引号、标点与空白，拒绝否定标记，要求含 5 位以上编号字符，统一大写
pub fn sanitize_llm_candidate(reply: &str) -> Option<String> {
    let candidate = reply.trim_matches(is_wrapping_char);

    let lowered = candidate.to_lowercase();
    if NEGATIVE_MARKERS.contains(&lowered.as_str()) {
        return None;
    }

    let re = LLM_CANDIDATE_RE.get_or_init(|| Regex::new(r"(?i)[A-Z0-9\-_]{5,}").unwrap());
    if !re.is_match(candidate) {
        return None;
    }
    Some(candidate.to_uppercase())
}

/// 首尾可剥离的字符；`-` 与 `_` 属于编号本身
fn is_wrapping_char(c: char) -> bool {
    if c == '-' || c == '_' {
        return false;
    }
    c.is_whitespace()
        || c.is_ascii_punctuation()
        || matches!(
            c,
            '“' | '”' | '‘' | '’' | '。' | '，' | '！' | '？' | '；' | '：' | '、' | '．' | '「' | '」'
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labelled_structured() {
        assert_eq!(
            match_labelled_structured("帮我查一下订单号：ORD-2024-001 的状态"),
            Some("ORD-2024-001".to_string())
        );
        assert_eq!(
            match_labelled_structured("order ord-2024-001 please"),
            Some("ord-2024-001".to_string())
        );
        assert_eq!(match_labelled_structured("ORD-2024-001"), None);
    }

    #[test]
    fn test_bare_structured() {
        assert_eq!(
            match_bare_structured("where is ORD_2024_001?"),
            Some("ORD_2024_001".to_string())
        );
        assert_eq!(match_bare_structured("AB12"), None);
    }

    #[test]
    fn test_labelled_colon_rejects_short_candidates() {
        assert_eq!(match_labelled_colon("订单：AB12"), None);
        assert_eq!(match_labelled_colon("order: 12345"), Some("12345".to_string()));
        assert_eq!(match_labelled_colon("订单号: X1-99"), Some("X1-99".to_string()));
    }

    #[test]
    fn test_letters_digits_and_long_digits() {
        assert_eq!(match_letters_digits("ORDER123 到哪了"), Some("ORDER123".to_string()));
        assert_eq!(match_letters_digits("AB12"), None);
        assert_eq!(match_long_digits("电话 13800138000"), Some("13800138000".to_string()));
        assert_eq!(match_long_digits("1234567"), None);
    }

    #[test]
    fn test_cascade_priority() {
        assert_eq!(
            extract_by_patterns("订单号：ORD-2024-001"),
            Some(("labelled_structured", "ORD-2024-001".to_string()))
        );
        assert_eq!(
            extract_by_patterns("ORD_2024_001 怎么还没到"),
            Some(("bare_structured", "ORD_2024_001".to_string()))
        );
        assert_eq!(
            extract_by_patterns("order: 12345"),
            Some(("labelled_colon", "12345".to_string()))
        );
        assert_eq!(
            extract_by_patterns("我的 ORDER123 呢"),
            Some(("letters_digits", "ORDER123".to_string()))
        );
        assert_eq!(
            extract_by_patterns("单号是 2024000123"),
            Some(("long_digits", "2024000123".to_string()))
        );
        assert_eq!(extract_by_patterns("订单：AB12"), None);
        assert_eq!(extract_by_patterns("我的快递到哪了"), None);
    }

    #[test]
    fn test_first_match_in_order_of_appearance() {
        assert_eq!(
            extract_by_patterns("AB1234567 和 CD7654321"),
            Some(("bare_structured", "AB1234567".to_string()))
        );
    }

    #[test]
    fn test_deterministic() {
        let text = "退货 order: ZX-77881 的进度";
        assert_eq!(extract_by_patterns(text), extract_by_patterns(text));
    }

    #[test]
    fn test_sanitize_llm_candidate() {
        assert_eq!(sanitize_llm_candidate(" \"ord-2024-001\" "), Some("ORD-2024-001".to_string()));
        assert_eq!(sanitize_llm_candidate("“ABC12345”"), Some("ABC12345".to_string()));
        assert_eq!(sanitize_llm_candidate("未找到"), None);
        assert_eq!(sanitize_llm_candidate("Not Found"), None);
        assert_eq!(sanitize_llm_candidate("null"), None);
        assert_eq!(sanitize_llm_candidate("''"), None);
        assert_eq!(sanitize_llm_candidate("Not found."), None);
        assert_eq!(sanitize_llm_candidate("AB1"), None);
    }

    #[test]
    fn test_sanitize_strips_trailing_punctuation() {
        assert_eq!(sanitize_llm_candidate("ORD-2024-001."), Some("ORD-2024-001".to_string()));
        assert_eq!(sanitize_llm_candidate("ord-2024-001。"), Some("ORD-2024-001".to_string()));
        assert_eq!(sanitize_llm_candidate("(ORD_2024_001)!"), Some("ORD_2024_001".to_string()));
        assert_eq!(sanitize_llm_candidate("「ABC12345」，"), Some("ABC12345".to_string()));
        assert_eq!(sanitize_llm_candidate("未找到。"), None);
    }
}
