//! 校验和算法（数值层面的“事实判定”全部集中在此）
//!
//! 所有检测器在这里之外不做任何数值接受判断：凡是存在校验和的类别，
//! 结构匹配之后必须经过对应函数确认。校验函数只返回确定的布尔值。

/// Luhn 校验：从右向左隔位翻倍（>9 减 9），总和模 10 为 0 即有效
/// 入参含任何非数字字符立即判否
pub fn luhn_valid(digits: &str) -> bool {
    let mut sum: u32 = 0;
    let mut alt = false;
    for ch in digits.chars().rev() {
        let d = match ch.to_digit(10) {
            Some(d) => d,
            None => return false,
        };
        let d = if alt {
            let doubled = d * 2;
            if doubled > 9 { doubled - 9 } else { doubled }
        } else {
            d
        };
        sum += d;
        alt = !alt;
    }
    !digits.is_empty() && sum % 10 == 0
}

/// IBAN mod-97 校验：前 4 字符旋转到末尾，字母映射为 10..35 的十进制展开，
/// 逐位做模 97 的增量归约（避免大整数），结果为 1 即有效
pub fn iban_checksum_valid(iban: &str) -> bool {
    let rotated: String = iban
        .chars()
        .skip(4)
        .chain(iban.chars().take(4))
        .collect::<String>()
        .to_ascii_uppercase();
    if rotated.len() != iban.chars().count() || iban.chars().count() < 4 {
        return false;
    }

    let mut rem: u32 = 0;
    for ch in rotated.chars() {
        if ch.is_ascii_digit() {
            rem = (rem * 10 + (ch as u32 - '0' as u32)) % 97;
        } else if ch.is_ascii_uppercase() {
            // 字母展开为两位十进制数（A=10 … Z=35）
            let v = ch as u32 - 'A' as u32 + 10;
            rem = (rem * 10 + v / 10) % 97;
            rem = (rem * 10 + v % 10) % 97;
        } else {
            return false;
        }
    }
    rem == 1
}

/// ABA 路由号校验：固定权重 (3,7,1) 循环作用于 9 位数字，加权和能被 10 整除即有效
pub fn aba_routing_valid(routing: &str) -> bool {
    if routing.len() != 9 || !routing.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    const WEIGHTS: [u32; 3] = [3, 7, 1];
    let total: u32 = routing
        .bytes()
        .enumerate()
        .map(|(i, b)| (b - b'0') as u32 * WEIGHTS[i % 3])
        .sum();
    total % 10 == 0
}

/// 卡组织判别（仅作诊断提示，不参与接受判定）
/// 入参为已归一化的纯数字串
pub fn card_brand(num: &str) -> &'static str {
    let len = num.len();
    let b = num.as_bytes();
    if b.is_empty() || !b.iter().all(|c| c.is_ascii_digit()) {
        return "unknown";
    }
    if b[0] == b'4' && matches!(len, 13 | 16 | 19) {
        return "visa";
    }
    if len == 16 {
        let p2: u32 = num[..2].parse().unwrap_or(0);
        let p4: u32 = num[..4].parse().unwrap_or(0);
        if (51..=55).contains(&p2) || (2221..=2720).contains(&p4) {
            return "mastercard";
        }
        if p4 == 6011 || p2 == 65 {
            return "discover";
        }
        if p2 == 35 {
            return "jcb";
        }
    }
    if len == 15 && (num.starts_with("34") || num.starts_with("37")) {
        return "amex";
    }
    if len == 14 {
        let p3: u32 = num[..3].parse().unwrap_or(0);
        if (300..=305).contains(&p3) || num.starts_with("36") || num.starts_with("38") {
            return "diners";
        }
    }
    "unknown"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luhn_known_vectors() {
        assert!(luhn_valid("4111111111111111"));
        assert!(luhn_valid("5555555555554444"));
        assert!(luhn_valid("378282246310005"));
        // 尾位改动后必须判否
        assert!(!luhn_valid("4111111111111112"));
        assert!(!luhn_valid("4111111111111110"));
    }

    #[test]
    fn luhn_single_digit_mutations_flip_result() {
        // 对每一位做一次 +1（模 10）扰动，Luhn 对单位错误应全部可检出
        let valid = "4111111111111111";
        for i in 0..valid.len() {
            let mut bytes = valid.as_bytes().to_vec();
            bytes[i] = b'0' + (bytes[i] - b'0' + 1) % 10;
            let mutated = String::from_utf8(bytes).unwrap();
            assert!(!luhn_valid(&mutated), "mutation at {} not caught", i);
        }
    }

    #[test]
    fn luhn_rejects_non_digits() {
        assert!(!luhn_valid("4111-1111-1111-1111"));
        assert!(!luhn_valid(""));
    }

    #[test]
    fn iban_known_vectors() {
        assert!(iban_checksum_valid("GB82WEST12345698765432"));
        assert!(iban_checksum_valid("DE89370400440532013000"));
        // 字符改动
        assert!(!iban_checksum_valid("GB82WEST12345698765433"));
        assert!(!iban_checksum_valid("GB82TEST12345698765432"));
        assert!(!iban_checksum_valid("GB00WEST12345698765432"));
    }

    #[test]
    fn iban_lowercase_accepted() {
        // 检测按大小写不敏感匹配，校验前统一转大写
        assert!(iban_checksum_valid("gb82west12345698765432"));
    }

    #[test]
    fn aba_known_vectors() {
        assert!(aba_routing_valid("021000021"));
        assert!(!aba_routing_valid("021000020"));
        assert!(!aba_routing_valid("12345678"));
        assert!(!aba_routing_valid("12345678a"));
    }

    #[test]
    fn brand_table() {
        assert_eq!(card_brand("4111111111111111"), "visa");
        assert_eq!(card_brand("5555555555554444"), "mastercard");
        assert_eq!(card_brand("2221000000000009"), "mastercard");
        assert_eq!(card_brand("378282246310005"), "amex");
        assert_eq!(card_brand("30569309025904"), "diners");
        assert_eq!(card_brand("6011111111111117"), "discover");
        assert_eq!(card_brand("3530111333300000"), "jcb");
        assert_eq!(card_brand("9999999999999999"), "unknown");
    }
}
