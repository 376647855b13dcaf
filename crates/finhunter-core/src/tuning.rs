//! 调参文件加载（TOML）
//!
//! 近邻窗口半径、二进制判定阈值等均为启发式常量，精确取值只影响误报率而不影响
//! 正确性，因此全部做成可配置项而非硬编码。文件缺省或字段缺省时使用内置默认值。
use serde::Deserialize;
use std::path::Path;

use crate::error::{Result, ScanError};

/// 单条额外占位符模式（调参文件提供，启动时编译）
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlaceholderEntry {
    pub name: String,
    pub pattern: String,
}

/// 窗口半径配置段
#[derive(Debug, Clone, Deserialize, Default)]
struct WindowSection {
    pair_radius: Option<usize>,
    triple_radius: Option<usize>,
    context_radius: Option<usize>,
    safe_context_radius: Option<usize>,
    snippet_radius: Option<usize>,
}

/// 二进制判定配置段
#[derive(Debug, Clone, Deserialize, Default)]
struct BinarySection {
    min_printable_ratio: Option<f32>,
}

/// 关键词词表扩展段
#[derive(Debug, Clone, Deserialize, Default)]
struct KeywordSection {
    #[serde(default)]
    finance: Vec<String>,
    #[serde(default)]
    safe: Vec<String>,
}

/// 顶层调参文件结构（所有段均可省略）
#[derive(Debug, Clone, Deserialize, Default)]
struct TuningFile {
    #[serde(default)]
    windows: WindowSection,
    #[serde(default)]
    binary: BinarySection,
    #[serde(default)]
    keywords: KeywordSection,
    #[serde(default)]
    placeholders: Vec<PlaceholderEntry>,
}

/// 归一化后的调参集（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct Tuning {
    /// 双字段配对的搜索半径（UK/AU/IN）
    pub pair_radius: usize,
    /// 三字段配对的搜索半径（CA）
    pub triple_radius: usize,
    /// 通用上下文检测的关键词搜索半径
    pub context_radius: usize,
    /// 误报过滤时取用的上下文半径
    pub safe_context_radius: usize,
    /// 报告中上下文片段的半径
    pub snippet_radius: usize,
    /// 文本判定的最低可打印字节占比
    pub min_printable_ratio: f32,
    /// 追加的金融关键词
    pub extra_finance_keywords: Vec<String>,
    /// 追加的安全上下文关键词
    pub extra_safe_keywords: Vec<String>,
    /// 追加的占位符模式（由 filter 在启动时编译；编译失败即致命）
    pub extra_placeholders: Vec<PlaceholderEntry>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            pair_radius: 60,
            triple_radius: 80,
            context_radius: 60,
            safe_context_radius: 80,
            snippet_radius: 40,
            min_printable_ratio: 0.80,
            extra_finance_keywords: Vec::new(),
            extra_safe_keywords: Vec::new(),
            extra_placeholders: Vec::new(),
        }
    }
}

/// 从 TOML 调参文件加载并归一化；path 为空时返回默认值
pub(crate) fn load_tuning(path: Option<&Path>) -> Result<Tuning> {
    let path = match path {
        Some(p) => p,
        None => return Ok(Tuning::default()),
    };
    let txt = std::fs::read_to_string(path)
        .map_err(|e| ScanError::Tuning(format!("{}: {}", path.display(), e)))?;
    let parsed: TuningFile = toml::from_str(&txt)
        .map_err(|e| ScanError::Tuning(format!("{}: {}", path.display(), e)))?;

    let d = Tuning::default();
    Ok(Tuning {
        pair_radius: parsed.windows.pair_radius.unwrap_or(d.pair_radius),
        triple_radius: parsed.windows.triple_radius.unwrap_or(d.triple_radius),
        context_radius: parsed.windows.context_radius.unwrap_or(d.context_radius),
        safe_context_radius: parsed
            .windows
            .safe_context_radius
            .unwrap_or(d.safe_context_radius),
        snippet_radius: parsed.windows.snippet_radius.unwrap_or(d.snippet_radius),
        min_printable_ratio: parsed
            .binary
            .min_printable_ratio
            .unwrap_or(d.min_printable_ratio),
        extra_finance_keywords: parsed.keywords.finance,
        extra_safe_keywords: parsed.keywords.safe,
        extra_placeholders: parsed.placeholders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_path_yields_defaults() {
        let t = load_tuning(None).unwrap();
        assert_eq!(t.pair_radius, 60);
        assert_eq!(t.triple_radius, 80);
        assert!((t.min_printable_ratio - 0.80).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[windows]\npair_radius = 30\n\n[keywords]\nfinance = [\"swift\"]").unwrap();
        let t = load_tuning(Some(f.path())).unwrap();
        assert_eq!(t.pair_radius, 30);
        assert_eq!(t.triple_radius, 80);
        assert_eq!(t.extra_finance_keywords, vec!["swift".to_string()]);
    }

    #[test]
    fn malformed_file_is_fatal() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "windows = \"not a table").unwrap();
        assert!(matches!(load_tuning(Some(f.path())), Err(ScanError::Tuning(_))));
    }
}
