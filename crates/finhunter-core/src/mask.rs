//! 展示值打码（仅用于呈现，原始值在报告内部保留）
use crate::types::FindingKind;

/// 渲染打码后的展示值；本函数只接受原始命中值，不存在二次打码的路径
/// - 数字类：去除分隔符后仅保留末 4 位，其余以 '*' 代替（不足 4 位则全部打码）
/// - 字母数字类（IBAN/IFSC）：过短整体收敛为 "***"，否则保留前 4 后 2，中间省略号
pub(crate) fn mask_value(kind: FindingKind, raw: &str) -> String {
    if kind.is_digit_class() {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() <= 4 {
            return "*".repeat(digits.len());
        }
        let tail = &digits[digits.len() - 4..];
        return format!("{}{}", "*".repeat(digits.len() - 4), tail);
    }

    let chars: Vec<char> = raw.chars().collect();
    if chars.len() <= 6 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}…{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_classes_keep_trailing_four() {
        assert_eq!(mask_value(FindingKind::CreditCard, "4111 1111 1111 1111"), "************1111");
        assert_eq!(mask_value(FindingKind::UsRouting, "021000021"), "*****0021");
        assert_eq!(mask_value(FindingKind::UkSort, "12-34-56"), "**3456");
    }

    #[test]
    fn short_digit_values_fully_masked() {
        assert_eq!(mask_value(FindingKind::CaInst, "001"), "***");
        assert_eq!(mask_value(FindingKind::AccountLike, "1234"), "****");
    }

    #[test]
    fn alnum_classes_keep_prefix_and_suffix() {
        assert_eq!(mask_value(FindingKind::Iban, "GB82WEST12345698765432"), "GB82…32");
        assert_eq!(mask_value(FindingKind::InIfsc, "HDFC0001234"), "HDFC…34");
    }

    #[test]
    fn short_alnum_collapses() {
        assert_eq!(mask_value(FindingKind::Iban, "GB82AB"), "***");
    }
}
