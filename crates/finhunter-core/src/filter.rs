//! 误报抑制（在校验之后、产出之前执行）
//!
//! 结构与数值都合法的值仍可能是文档示例或模板占位——本过滤器偏向
//! 压低误报：占位词、重复/全零占位、模板语法、示例性上下文、
//! 行内代码包裹，命中任一条件即抑制。
use regex::Regex;

use crate::context::ContextVocab;
use crate::error::{Result, ScanError};
use crate::tuning::Tuning;

/// 内置的占位符模式（作用于原始命中值本身）
/// 注意：众所周知的测试卡号（4111… 等）不在此列——光秃出现的测试卡号
/// 仍按命中上报，只有示例性上下文才会压掉它（见 safe 词表）。
const TEST_PATTERNS: &[(&str, &str)] = &[
    ("placeholder_word", r"(?i)\b(example|test|dummy|fake|sample|placeholder)\b"),
    ("repeated_digits", r"\b(xxxx|1234\s*1234|0000\s*0000)\b"),
    ("bracket_placeholder", r"(?i)\[(your|my|their)\s+(account|card|bank|name)\]"),
    ("template_variable", r"(?i)\{\{\s*(person|account|bank)\.\w+\s*\}\}"),
];

/// 已编译的误报过滤器（构建一次，跨线程只读共享）
pub(crate) struct FalsePositiveFilter {
    patterns: Vec<Regex>,
}

impl FalsePositiveFilter {
    /// 编译内置模式与调参文件追加的占位符模式；任何一条失败都是启动期致命错误
    pub(crate) fn compile(tuning: &Tuning) -> Result<Self> {
        let mut patterns = Vec::with_capacity(TEST_PATTERNS.len() + tuning.extra_placeholders.len());
        for (name, pat) in TEST_PATTERNS {
            patterns.push(compile_one(name, pat)?);
        }
        for entry in &tuning.extra_placeholders {
            patterns.push(compile_one(&entry.name, &entry.pattern)?);
        }
        Ok(Self { patterns })
    }

    /// 判定是否疑似误报
    /// - raw：原始命中值
    /// - ctx：以命中为中心截取的上下文窗口（换行已展平）
    /// - raw_start/raw_end：raw 在 ctx 中的字节区间
    pub(crate) fn is_false_positive(
        &self,
        vocab: &ContextVocab,
        raw: &str,
        ctx: &str,
        raw_start: usize,
        raw_end: usize,
    ) -> bool {
        if self.patterns.iter().any(|p| p.is_match(raw)) {
            return true;
        }
        if vocab.safe_in(ctx) {
            return true;
        }
        // 行内代码判定：窗口内命中值前后各存在一个反引号即视为代码包裹
        let before = &ctx[..raw_start.min(ctx.len())];
        let after = &ctx[raw_end.min(ctx.len())..];
        if before.contains('`') && after.contains('`') {
            return true;
        }
        false
    }
}

fn compile_one(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| ScanError::Pattern { name: name.to_string(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> (FalsePositiveFilter, ContextVocab) {
        let t = Tuning::default();
        (FalsePositiveFilter::compile(&t).unwrap(), ContextVocab::build_from(&t))
    }

    #[test]
    fn placeholder_words_inside_span_suppressed() {
        let (f, v) = filter();
        assert!(f.is_false_positive(&v, "dummy 12345678", "x dummy 12345678 y", 2, 16));
        assert!(f.is_false_positive(&v, "0000 0000 1234", "n 0000 0000 1234 x", 2, 16));
    }

    #[test]
    fn bare_test_card_is_not_value_suppressed() {
        // 测试卡号本身不触发值级抑制；只有示例性上下文才压掉它
        let (f, v) = filter();
        assert!(!f.is_false_positive(&v, "4111 1111 1111 1111", "x 4111 1111 1111 1111 y", 2, 21));
        assert!(f.is_false_positive(
            &v,
            "4111 1111 1111 1111",
            "example 4111 1111 1111 1111 y",
            8,
            27
        ));
    }

    #[test]
    fn safe_context_suppresses_valid_numbers() {
        let (f, v) = filter();
        // 数值合法但上下文表明是示例
        let ctx = "example: 4539578763621486 is shown";
        assert!(f.is_false_positive(&v, "4539578763621486", ctx, 9, 25));
    }

    #[test]
    fn inline_code_suppressed() {
        let (f, v) = filter();
        let ctx = "run `4539578763621486` locally";
        assert!(f.is_false_positive(&v, "4539578763621486", ctx, 5, 21));
    }

    #[test]
    fn bare_valid_number_passes() {
        let (f, v) = filter();
        let ctx = "card 4539578763621486 on file";
        assert!(!f.is_false_positive(&v, "4539578763621486", ctx, 5, 21));
    }

    #[test]
    fn template_placeholders_suppressed() {
        let (f, v) = filter();
        assert!(f.is_false_positive(&v, "{{person.account}}", "x {{person.account}} y", 2, 20));
        assert!(f.is_false_positive(&v, "[your account]", "see [your account] here", 4, 18));
    }

    #[test]
    fn bad_extra_pattern_is_fatal() {
        let mut t = Tuning::default();
        t.extra_placeholders.push(crate::tuning::PlaceholderEntry {
            name: "broken".to_string(),
            pattern: "(unclosed".to_string(),
        });
        assert!(matches!(
            FalsePositiveFilter::compile(&t),
            Err(ScanError::Pattern { .. })
        ));
    }
}
