//! 关键词词表（Aho-Corasick）
//!
//! 设计沿用锚点预筛思路：用 AC 自动机在窗口内快速定位候选关键词，
//! 再对命中位置做近似词边界确认，避免 "database" 误命中 "aba" 一类的子串。
use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

use crate::tuning::Tuning;

/// 金融语境关键词（通用兜底检测的触发条件）
const FINANCE_KEYWORDS: &[&str] = &[
    "iban", "routing", "aba", "bsb", "sort code", "sortcode", "ifsc", "account", "acct",
];

/// 安全语境关键词（说明文档/模板类内容的信号）
const SAFE_KEYWORDS: &[&str] = &[
    "example",
    "template",
    "placeholder",
    "sample",
    "format",
    "like",
    "such as",
    "e.g.",
    "for instance",
    "emergency plan",
    "guide",
    "documentation",
];

/// 两套词表的已构建自动机（跨线程只读共享）
pub(crate) struct ContextVocab {
    finance: AhoCorasick,
    safe: AhoCorasick,
}

/// 近似词边界：相邻侧同为“词字符”（字母数字或下划线）时视为子串命中，拒绝
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn boundary_ok(hay: &[u8], start: usize, end: usize) -> bool {
    let left_ok = start == 0
        || !(is_word_byte(hay[start - 1]) && is_word_byte(hay[start]));
    let right_ok = end == hay.len()
        || !(is_word_byte(hay[end - 1]) && is_word_byte(hay[end]));
    left_ok && right_ok
}

fn build(words: &[&str], extra: &[String]) -> AhoCorasick {
    let patterns: Vec<&str> = words
        .iter()
        .copied()
        .chain(extra.iter().map(|s| s.as_str()))
        .collect();
    AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .match_kind(MatchKind::LeftmostLongest)
        .build(&patterns)
        .expect("build aho-corasick")
}

impl ContextVocab {
    pub(crate) fn build_from(tuning: &Tuning) -> Self {
        Self {
            finance: build(FINANCE_KEYWORDS, &tuning.extra_finance_keywords),
            safe: build(SAFE_KEYWORDS, &tuning.extra_safe_keywords),
        }
    }

    /// 窗口内是否出现金融关键词（带词边界确认）
    pub(crate) fn finance_near(&self, window: &str) -> bool {
        let hay = window.as_bytes();
        self.finance
            .find_iter(hay)
            .any(|m| boundary_ok(hay, m.start(), m.end()))
    }

    /// 窗口内是否出现安全语境关键词
    pub(crate) fn safe_in(&self, window: &str) -> bool {
        let hay = window.as_bytes();
        self.safe
            .find_iter(hay)
            .any(|m| boundary_ok(hay, m.start(), m.end()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> ContextVocab {
        ContextVocab::build_from(&Tuning::default())
    }

    #[test]
    fn finance_keyword_hits_case_insensitively() {
        let v = vocab();
        assert!(v.finance_near("my IBAN: x"));
        assert!(v.finance_near("Sort Code 12-34-56"));
        assert!(v.finance_near("acct no 12345678"));
        assert!(!v.finance_near("nothing financial here"));
    }

    #[test]
    fn substring_hits_are_rejected() {
        let v = vocab();
        // "database" 内含 "aba"，"accountant" 以 "account" 开头但右侧仍是词字符
        assert!(!v.finance_near("the database is big"));
        assert!(!v.finance_near("our accountants"));
    }

    #[test]
    fn safe_vocabulary() {
        let v = vocab();
        assert!(v.safe_in("for example:"));
        assert!(v.safe_in("e.g. a card number"));
        assert!(v.safe_in("this template shows"));
        assert!(!v.safe_in("pay the invoice now"));
    }

    #[test]
    fn tuning_extras_are_appended() {
        let mut t = Tuning::default();
        t.extra_finance_keywords.push("swift".to_string());
        let v = ContextVocab::build_from(&t);
        assert!(v.finance_near("swift code attached"));
    }
}
