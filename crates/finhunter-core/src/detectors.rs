//! 检测器集合（每个识别类别一条结构化正则）
//!
//! 检测器只负责产出结构上疑似的候选区间，彼此独立、允许重叠；
//! 数值接受判定交给 validators，配对判定交给 correlate，重叠由去重收敛。
use regex::Regex;

use crate::error::{Result, ScanError};

/// 全部类别的已编译模式集合（构建一次，跨线程只读共享）
pub(crate) struct DetectorSet {
    /// 12–19 位数字，允许组间单个空格/连字符分隔
    pub(crate) cc_span: Regex,
    /// 两位字母 + 两位数字 + 11–30 位字母数字（总长 15–34），大小写不敏感
    pub(crate) iban: Regex,
    /// 恰好 9 位连续数字（ABA 路由号候选）
    pub(crate) nine_digits: Regex,
    pub(crate) uk_sort: Regex,
    pub(crate) uk_acct: Regex,
    pub(crate) au_bsb: Regex,
    pub(crate) au_acct: Regex,
    pub(crate) ca_transit: Regex,
    pub(crate) ca_inst: Regex,
    pub(crate) ca_acct: Regex,
    pub(crate) in_ifsc: Regex,
    pub(crate) in_acct: Regex,
    /// 7 位以上的长数字串（允许空格/连字符），供上下文兜底检测使用
    pub(crate) num_near: Regex,
}

/// 编译单条模式；失败即启动期致命错误
fn rx(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| ScanError::Pattern { name: name.to_string(), source })
}

impl DetectorSet {
    pub(crate) fn compile() -> Result<Self> {
        Ok(Self {
            cc_span: rx("credit_card", r"\b(?:\d[ -]?){12,19}\b")?,
            // 不对整篇文本做 upper() 再匹配（那会破坏非 ASCII 文本的偏移对应），
            // 而是就地大小写不敏感匹配，校验前再统一转大写。
            iban: rx("iban", r"(?i)\b[A-Z]{2}\d{2}[A-Z0-9]{11,30}\b")?,
            nine_digits: rx("us_routing", r"\b\d{9}\b")?,
            uk_sort: rx("uk_sort", r"\b\d{2}-?\d{2}-?\d{2}\b")?,
            uk_acct: rx("uk_acct", r"\b\d{8}\b")?,
            au_bsb: rx("au_bsb", r"\b\d{3}-?\d{3}\b")?,
            au_acct: rx("au_acct", r"\b\d{6,10}\b")?,
            ca_transit: rx("ca_transit", r"\b\d{5}\b")?,
            ca_inst: rx("ca_inst", r"\b\d{3}\b")?,
            ca_acct: rx("ca_acct", r"\b\d{7,12}\b")?,
            in_ifsc: rx("in_ifsc", r"(?i)\b[A-Z]{4}0\d{6}\b")?,
            in_acct: rx("in_acct", r"\b\d{9,18}\b")?,
            num_near: rx("account_like", r"\b\d[\d \-]{6,}\d\b")?,
        })
    }
}
