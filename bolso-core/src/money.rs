//! Monetary value extraction from free-form Portuguese text.
//!
//! An ordered regex cascade: the first pattern that matches wins, there is no
//! scoring across patterns. Validation of the extracted value is the caller's
//! job (`is_valid_amount`).

use std::sync::LazyLock;

use regex::Regex;

/// Money patterns in priority order:
/// 1. verb-prefixed amount ("gastei 50", "paguei R$ 30")
/// 2. currency-prefixed amount ("R$ 25,90")
/// 3. amount + colloquial money word ("30 conto", "50 pila")
/// 4. amount with trailing currency marker ("25 R$")
/// 5. bare amount at start of text ("45 mercado")
static MONEY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(?:gastei|paguei|comprei|saiu|foi|custou|deu)\s+(?:r\$|rs)?\s*(\d+(?:[.,]\d{1,2})?)",
        r"(?i)(?:r\$|rs)\s*(\d+(?:[.,]\d{1,2})?)",
        r"(?i)(\d+(?:[.,]\d{1,2})?)\s*(?:reais|real|conto|contos|pila|pilas|pau|mangos)",
        r"(?i)(\d+(?:[.,]\d{1,2})?)\s*(?:r\$|rs)",
        r"^(\d+(?:[.,]\d{1,2})?)\s+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("money pattern"))
    .collect()
});

/// Parse a decimal string that may use `,` or `.` as separator.
pub fn parse_decimal(s: &str) -> Option<f64> {
    s.replace(',', ".").parse::<f64>().ok()
}

/// Extract a monetary value from free text. First matching pattern wins.
///
/// No sign/range validation happens here.
pub fn extract_amount(text: &str) -> Option<f64> {
    for pattern in MONEY_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            return parse_decimal(&caps[1]);
        }
    }
    None
}

/// Contract shared with the dispatch layer: `0 < amount < 1_000_000`.
pub fn is_valid_amount(amount: f64) -> bool {
    amount > 0.0 && amount < 1_000_000.0
}

/// Round half away from zero to 2 decimal places.
///
/// Applied at every balance mutation and at schedule generation, not only at
/// display time, so rounding drift accumulates in stored balances exactly as
/// computed.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_and_dot_normalize_to_same_value() {
        assert_eq!(parse_decimal("12,50"), Some(12.5));
        assert_eq!(parse_decimal("12.50"), Some(12.5));
        assert_eq!(extract_amount("gastei 12,50"), Some(12.5));
        assert_eq!(extract_amount("gastei 12.50"), Some(12.5));
    }

    #[test]
    fn verb_prefixed_amount_wins() {
        assert_eq!(extract_amount("gastei 50 no mercado"), Some(50.0));
        assert_eq!(extract_amount("paguei R$ 30 de uber"), Some(30.0));
        assert_eq!(extract_amount("custou 99,90"), Some(99.9));
    }

    #[test]
    fn currency_prefix_and_suffix() {
        assert_eq!(extract_amount("R$ 25,90 na farmácia"), Some(25.9));
        assert_eq!(extract_amount("rs 100"), Some(100.0));
        assert_eq!(extract_amount("almoço 25 R$"), Some(25.0));
    }

    #[test]
    fn colloquial_money_words() {
        assert_eq!(extract_amount("30 conto de pizza"), Some(30.0));
        assert_eq!(extract_amount("deu uns 50 pila"), Some(50.0));
        assert_eq!(extract_amount("200 mangos no bar"), Some(200.0));
    }

    #[test]
    fn bare_leading_number_is_last_resort() {
        assert_eq!(extract_amount("45 mercado"), Some(45.0));
        assert_eq!(extract_amount("mercado 45"), None);
    }

    #[test]
    fn no_amount_yields_none() {
        assert_eq!(extract_amount("bom dia"), None);
        assert_eq!(extract_amount(""), None);
    }

    #[test]
    fn amount_validity_bounds() {
        assert!(is_valid_amount(0.01));
        assert!(is_valid_amount(999_999.99));
        assert!(!is_valid_amount(0.0));
        assert!(!is_valid_amount(-5.0));
        assert!(!is_valid_amount(1_000_000.0));
    }

    #[test]
    fn round2_half_away_from_zero() {
        // 0.125 is exactly representable, so the .5 tie is a real tie.
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(100.0 / 3.0), 33.33);
        assert_eq!(round2(1200.0 / 7.0), 171.43);
    }
}
