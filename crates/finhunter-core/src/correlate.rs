//! 近邻配对（窗口构造与伴随字段搜索）
//!
//! 无通用校验和的国家类格式（UK/AU/CA/IN）只有在固定半径窗口内找到
//! 伴随的账号形字段时才成立；缺任一必需伴随字段则锚点与伴随一个都不产出。
//! 窗口内命中的偏移一律折算回文件绝对坐标（窗口相对偏移 + 窗口起点）。
use regex::Regex;

use crate::findings::Finding;
use crate::types::FindingKind;

/// 将字节下标向左收敛到最近的 UTF-8 字符边界
pub(crate) fn floor_char_boundary(text: &str, mut i: usize) -> usize {
    if i >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// 将字节下标向右收敛到最近的 UTF-8 字符边界
pub(crate) fn ceil_char_boundary(text: &str, mut i: usize) -> usize {
    if i >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// 以 [start, end) 为锚、radius 为半径构造窗口，夹取到 [0, len) 并对齐字符边界
/// 返回 (窗口起点的绝对偏移, 窗口切片)
pub(crate) fn window_around(text: &str, start: usize, end: usize, radius: usize) -> (usize, &str) {
    let lo = floor_char_boundary(text, start.saturating_sub(radius));
    let hi = ceil_char_boundary(text, (end.saturating_add(radius)).min(text.len()));
    (lo, &text[lo..hi])
}

/// 双字段配对：锚点匹配 + 窗口内第一个伴随账号匹配
/// 成功时锚点以自身类别产出，伴随以 ACCOUNT_LIKE 产出；失败则两者皆不产出
pub(crate) fn correlate_pair(
    text: &str,
    anchor_kind: FindingKind,
    anchor: &Regex,
    companion: &Regex,
    radius: usize,
    out: &mut Vec<Finding>,
) {
    for am in anchor.find_iter(text) {
        let (lo, window) = window_around(text, am.start(), am.end(), radius);
        if let Some(cm) = companion.find(window) {
            out.push(Finding::new(anchor_kind, am.as_str(), am.start(), am.end()));
            out.push(Finding::new(
                FindingKind::AccountLike,
                cm.as_str(),
                lo + cm.start(),
                lo + cm.end(),
            ));
        }
    }
}

/// 三字段配对（CA）：transit 为锚，同一窗口内必须同时出现机构号与账号
/// 任一缺失则三个候选角色全部不产出
pub(crate) fn correlate_triple(
    text: &str,
    transit: &Regex,
    institution: &Regex,
    account: &Regex,
    radius: usize,
    out: &mut Vec<Finding>,
) {
    for tm in transit.find_iter(text) {
        let (lo, window) = window_around(text, tm.start(), tm.end(), radius);
        let im = institution.find(window);
        let am = account.find(window);
        if let (Some(im), Some(am)) = (im, am) {
            out.push(Finding::new(FindingKind::CaTransit, tm.as_str(), tm.start(), tm.end()));
            out.push(Finding::new(
                FindingKind::CaInst,
                im.as_str(),
                lo + im.start(),
                lo + im.end(),
            ));
            out.push(Finding::new(
                FindingKind::AccountLike,
                am.as_str(),
                lo + am.start(),
                lo + am.end(),
            ));
        }
    }
}
