/*
[INPUT]:  Wallet addresses and decimal amounts
[OUTPUT]: Display strings for the dashboard
[POS]:    Presentation helpers - derived-value formatting
[UPDATE]: When display conventions change
*/

use rust_decimal::Decimal;

/// `"7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU"` -> `"7xKX...gAsU"`
pub fn truncate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 8 {
        return address.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// `None` -> `"-"`, otherwise a dollar amount with thousands separators
pub fn format_balance(value: Option<Decimal>) -> String {
    match value {
        Some(value) => format!("${}", group_thousands(value.round_dp(2))),
        None => "-".to_string(),
    }
}

/// Amount with thousands separators and at most two decimals
pub fn format_amount(value: Decimal) -> String {
    group_thousands(value.round_dp(2).normalize())
}

fn group_thousands(value: Decimal) -> String {
    let text = value.to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU", "7xKX...gAsU")]
    #[case("ABCDEFGHI", "ABCD...FGHI")]
    #[case("ABCDEFGH", "ABCDEFGH")]
    #[case("", "")]
    fn test_truncate_address(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(truncate_address(input), expected);
    }

    #[rstest]
    #[case(None, "-")]
    #[case(Some(Decimal::new(123456789, 2)), "$1,234,567.89")]
    #[case(Some(Decimal::from(1000)), "$1,000")]
    #[case(Some(Decimal::new(-25005, 1)), "$-2,500.5")]
    #[case(Some(Decimal::new(999, 0)), "$999")]
    fn test_format_balance(#[case] input: Option<Decimal>, #[case] expected: &str) {
        assert_eq!(format_balance(input), expected);
    }

    #[test]
    fn test_format_amount_rounds() {
        assert_eq!(format_amount(Decimal::new(12345678, 4)), "1,234.57");
        assert_eq!(format_amount(Decimal::new(5000, 3)), "5");
    }
}
