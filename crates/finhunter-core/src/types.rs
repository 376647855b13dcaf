//! 公共类型（对外暴露）
use serde::Serialize;
use std::path::PathBuf;

use crate::options::ScanStats;

/// 命中类别（序列化为大写下划线形式，例如 CREDIT_CARD）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingKind {
    CreditCard,
    Iban,
    UsRouting,
    UkSort,
    AuBsb,
    CaTransit,
    CaInst,
    InIfsc,
    AccountLike,
}

impl FindingKind {
    /// 稳定的文本名（CSV 列与日志使用）
    pub fn as_str(self) -> &'static str {
        match self {
            FindingKind::CreditCard => "CREDIT_CARD",
            FindingKind::Iban => "IBAN",
            FindingKind::UsRouting => "US_ROUTING",
            FindingKind::UkSort => "UK_SORT",
            FindingKind::AuBsb => "AU_BSB",
            FindingKind::CaTransit => "CA_TRANSIT",
            FindingKind::CaInst => "CA_INST",
            FindingKind::InIfsc => "IN_IFSC",
            FindingKind::AccountLike => "ACCOUNT_LIKE",
        }
    }

    /// 是否按“纯数字”方式打码（其余类别按字母数字方式）
    pub(crate) fn is_digit_class(self) -> bool {
        !matches!(self, FindingKind::Iban | FindingKind::InIfsc)
    }
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 输出记录（对应报告中的单个元素）
/// 字段顺序即 JSON/CSV 的固定列序
#[derive(Debug, Clone)]
pub struct OutputRecord {
    pub file: PathBuf,
    /// 1 起始的行号（基于解码后的文本）
    pub line: usize,
    /// 命中区间在解码文本中的字节偏移（半开区间）
    pub start: usize,
    pub end: usize,
    pub kind: FindingKind,
    pub value_masked: String,
    /// 原始命中值；默认不写入任何输出，仅在调用方显式要求时序列化
    pub value_raw: String,
    /// 命中附近的上下文片段（换行已展平为空格）
    pub context: String,
}

/// 序列化视图：value_raw 的暴露与否由 writer 决定
#[derive(Debug, Serialize)]
pub(crate) struct RecordView<'a> {
    pub file: &'a PathBuf,
    pub line: usize,
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: FindingKind,
    pub value_masked: &'a str,
    pub value_raw: Option<&'a str>,
    pub context: &'a str,
}

impl OutputRecord {
    pub(crate) fn view(&self, reveal_raw: bool) -> RecordView<'_> {
        RecordView {
            file: &self.file,
            line: self.line,
            start: self.start,
            end: self.end,
            kind: self.kind,
            value_masked: &self.value_masked,
            value_raw: if reveal_raw { Some(&self.value_raw) } else { None },
            context: &self.context,
        }
    }
}

/// 单次扫描的完整结果
#[derive(Debug)]
pub struct ScanReport {
    /// 去重后的输出记录；同一文件内按偏移稳定排序，跨文件按路径顺序拼接
    pub records: Vec<OutputRecord>,
    pub stats: ScanStats,
    /// 为 false 表示本次扫描因超时被截断（存在未扫描的文件）
    pub complete: bool,
}

impl ScanReport {
    /// 是否“干净”：没有任何命中记录
    /// 注意：截断的扫描（complete == false）即使记录为空也不等同于完整的干净扫描
    pub fn clean(&self) -> bool {
        self.records.is_empty()
    }
}
