//! 手机号解析
//!
//! 支持半角/全角的换行、逗号、顿号、分号和空白做分隔符，
//! 只保留 11 位纯数字，按首次出现顺序去重。

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{11}$").expect("手机号正则不合法"))
}

fn is_separator(c: char) -> bool {
    matches!(c, ',' | '，' | '、' | ';' | '；' | '\u{3000}') || c.is_whitespace()
}

/// 解析原始文本中的手机号列表
pub fn parse_phone_numbers(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut phones = Vec::new();
    for token in raw.split(is_separator) {
        let token = token.trim();
        if token.is_empty() || !phone_regex().is_match(token) {
            continue;
        }
        if seen.insert(token.to_string()) {
            phones.push(token.to_string());
        }
    }
    phones
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_separators_and_duplicate() {
        let raw = "13800000001,13800000002\n13800000001";
        assert_eq!(
            parse_phone_numbers(raw),
            vec!["13800000001", "13800000002"]
        );
    }

    #[test]
    fn test_fullwidth_separators() {
        let raw = "13800000001，13800000002、13800000003；13800000004　13800000005";
        assert_eq!(parse_phone_numbers(raw).len(), 5);
    }

    #[test]
    fn test_rejects_invalid_tokens() {
        let raw = "1380000001\n138000000012\nabc13800000\n13800000x01\n 13800000009 ";
        assert_eq!(parse_phone_numbers(raw), vec!["13800000009"]);
    }

    #[test]
    fn test_first_seen_order_kept() {
        let raw = "13800000003 13800000001 13800000002 13800000001";
        assert_eq!(
            parse_phone_numbers(raw),
            vec!["13800000003", "13800000001", "13800000002"]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_phone_numbers("").is_empty());
        assert!(parse_phone_numbers(" ，\n、 ").is_empty());
    }
}
