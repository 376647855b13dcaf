//! 命中项与排序/去重（内部使用）
use std::collections::HashSet;

use crate::types::FindingKind;

/// 单次命中的内部表示（仅在单文件扫描过程中存在）
/// 不变量：end_offset > start_offset；value 为解码文本中该区间的独立拷贝
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Finding {
    pub(crate) kind: FindingKind,
    pub(crate) value: String,
    pub(crate) start_offset: usize,
    pub(crate) end_offset: usize,
}

impl Finding {
    pub(crate) fn new(kind: FindingKind, value: &str, start: usize, end: usize) -> Self {
        debug_assert!(end > start);
        Self { kind, value: value.to_string(), start_offset: start, end_offset: end }
    }
}

/// 按 (kind, value, start, end) 精确去重，保留首次出现的顺序
pub(crate) fn dedup_findings(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen: HashSet<Finding> = HashSet::new();
    let mut out = Vec::with_capacity(findings.len());
    for f in findings {
        if seen.insert(f.clone()) {
            out.push(f);
        }
    }
    out
}

/// 对单文件命中进行稳定排序：起始偏移升序 → 长度降序 → 值字典序升序
pub(crate) fn sort_findings_stable(findings: &mut Vec<Finding>) {
    findings.sort_by(|a, b| {
        use std::cmp::Ordering;
        match a.start_offset.cmp(&b.start_offset) {
            Ordering::Equal => match b.value.len().cmp(&a.value.len()) {
                Ordering::Equal => a.value.cmp(&b.value),
                o => o,
            },
            o => o,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_distinct_offsets() {
        // 同值不同位置视为两条；完全相同的元组只留一条
        let a = Finding::new(FindingKind::CreditCard, "4111111111111111", 0, 16);
        let b = Finding::new(FindingKind::CreditCard, "4111111111111111", 40, 56);
        let out = dedup_findings(vec![a.clone(), b.clone(), a.clone()]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], a);
        assert_eq!(out[1], b);
    }

    #[test]
    fn sort_is_stable_by_offset_then_length() {
        let mut v = vec![
            Finding::new(FindingKind::AccountLike, "123", 10, 13),
            Finding::new(FindingKind::AccountLike, "12345", 10, 15),
            Finding::new(FindingKind::AccountLike, "999", 2, 5),
        ];
        sort_findings_stable(&mut v);
        assert_eq!(v[0].start_offset, 2);
        assert_eq!(v[1].value, "12345");
        assert_eq!(v[2].value, "123");
    }
}
