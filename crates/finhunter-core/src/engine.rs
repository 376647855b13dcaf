//! 单文件扫描引擎（有界读取 + 二进制判定 + 解码回退 + 检测管线）
//!
//! 设计要点：
//! - 每文件最多读取 max_bytes 字节，限定最坏情况的内存与耗时；
//! - 先判二进制（NUL 字节或可打印占比过低），二进制文件直接跳过；
//! - 解码先严格 UTF-8，失败则退回 Latin-1（逐字节映射，对任意字节序列无损）；
//! - 管线顺序固定：检测 → 校验 → 配对 → 误报过滤 → 去重 → 稳定排序。
use anyhow::Result;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

use crate::context::ContextVocab;
use crate::correlate::{correlate_pair, correlate_triple, window_around};
use crate::detectors::DetectorSet;
use crate::filter::FalsePositiveFilter;
use crate::findings::{dedup_findings, sort_findings_stable, Finding};
use crate::report::flatten_newlines;
use crate::tuning::Tuning;
use crate::types::FindingKind;
use crate::validators::{aba_routing_valid, card_brand, iban_checksum_valid, luhn_valid};

/// 判定缓冲区是否“明显是二进制”
/// - 含任何 NUL 字节（0x00）即认为二进制；
/// - 否则计算可打印 ASCII（含 tab/LF/CR）占比，低于阈值认为二进制。
pub(crate) fn is_probably_binary(buf: &[u8], min_printable_ratio: f32) -> bool {
    if buf.is_empty() {
        return false;
    }
    if buf.iter().any(|&b| b == 0) {
        return true;
    }
    let printable = buf
        .iter()
        .filter(|&&b| matches!(b, 0x09 | 0x0A | 0x0D) || (0x20..=0x7E).contains(&b))
        .count();
    (printable as f32 / buf.len() as f32) < min_printable_ratio
}

/// Latin-1 回退解码：每个字节映射到同值码点，对任意输入都不会失败
fn decode_latin1(buf: &[u8]) -> String {
    buf.iter().map(|&b| b as char).collect()
}

/// 有界读取并解码单个文件
/// 返回 None 表示按二进制跳过；打开/读取失败向上传递由调用方按“跳过”处理
pub(crate) fn read_text_file(path: &Path, max_bytes: u64, tuning: &Tuning) -> Result<Option<String>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file).take(max_bytes);
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;

    if is_probably_binary(&buf, tuning.min_printable_ratio) {
        debug!(path = %path.display(), "skipping binary file");
        return Ok(None);
    }
    let text = match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => decode_latin1(e.as_bytes()),
    };
    Ok(Some(text))
}

/// 对解码文本执行完整检测管线，返回去重并稳定排序后的命中
pub(crate) fn scan_text(
    text: &str,
    det: &DetectorSet,
    vocab: &ContextVocab,
    fpf: &FalsePositiveFilter,
    tuning: &Tuning,
) -> Vec<Finding> {
    let mut found: Vec<Finding> = Vec::new();

    // A) IBAN（结构 + mod-97 校验）
    for m in det.iban.find_iter(text) {
        if iban_checksum_valid(&m.as_str().to_ascii_uppercase()) {
            found.push(Finding::new(FindingKind::Iban, m.as_str(), m.start(), m.end()));
        }
    }

    // B) ABA 路由号（9 位 + 加权校验）
    for m in det.nine_digits.find_iter(text) {
        if aba_routing_valid(m.as_str()) {
            found.push(Finding::new(FindingKind::UsRouting, m.as_str(), m.start(), m.end()));
        }
    }

    // C) 信用卡（长度 + Luhn；卡组织仅作诊断）
    for m in det.cc_span.find_iter(text) {
        // 模式允许末位数字后再吞一个分隔符，区间收敛回数字结尾
        let raw = m.as_str().trim_end_matches([' ', '-']);
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if (12..=19).contains(&digits.len()) && luhn_valid(&digits) {
            debug!(brand = card_brand(&digits), "credit card candidate accepted");
            found.push(Finding::new(FindingKind::CreditCard, raw, m.start(), m.start() + raw.len()));
        }
    }

    // D) 国家类近邻配对（无校验和，格式 + 伴随字段）
    correlate_pair(text, FindingKind::UkSort, &det.uk_sort, &det.uk_acct, tuning.pair_radius, &mut found);
    correlate_pair(text, FindingKind::AuBsb, &det.au_bsb, &det.au_acct, tuning.pair_radius, &mut found);
    correlate_triple(text, &det.ca_transit, &det.ca_inst, &det.ca_acct, tuning.triple_radius, &mut found);
    correlate_pair(text, FindingKind::InIfsc, &det.in_ifsc, &det.in_acct, tuning.pair_radius, &mut found);

    // E) 通用兜底：长数字串 + 近邻金融关键词（无数值校验，上下文即信号）
    for m in det.num_near.find_iter(text) {
        let (_, window) = window_around(text, m.start(), m.end(), tuning.context_radius);
        if vocab.finance_near(window) {
            found.push(Finding::new(FindingKind::AccountLike, m.as_str(), m.start(), m.end()));
        }
    }

    // 误报过滤（在校验之后执行）
    let mut kept: Vec<Finding> = Vec::with_capacity(found.len());
    for f in found {
        let (lo, window) = window_around(text, f.start_offset, f.end_offset, tuning.safe_context_radius);
        let ctx = flatten_newlines(window);
        let rel_start = f.start_offset - lo;
        let rel_end = f.end_offset - lo;
        if fpf.is_false_positive(vocab, &f.value, &ctx, rel_start, rel_end) {
            continue;
        }
        kept.push(f);
    }

    // 去重与文件内稳定排序
    let mut uniq = dedup_findings(kept);
    sort_findings_stable(&mut uniq);
    uniq
}
