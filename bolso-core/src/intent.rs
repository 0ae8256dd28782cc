//! Intent classification: one exhaustive, total decision per inbound text.
//!
//! Priority: slash-command > installment purchase > plain expense > unknown.
//! Classification never fails; anything unrecognized degrades to
//! [`Intent::Unknown`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::command::{ParsedCommand, parse_command};
use crate::describe::{expense_description, installment_description};
use crate::money::{extract_amount, parse_decimal, round2};

/// Signals that free text is talking about spending even when no amount was
/// recognized.
const EXPENSE_KEYWORDS: &[&str] = &[
    "gastei",
    "paguei",
    "comprei",
    "saiu",
    "foi",
    "custou",
    "deu",
    "comprando",
    "no mercado",
    "na farmácia",
    "almocei",
    "jantei",
    "lanchou",
    "tomei",
];

static INSTALLMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d{1,2})?)\s*(?:em|por|parcelado em|parcelada em|parcelado|parcelada)\s*(\d+)x?")
        .expect("installment pattern")
});

/// The structured outcome of classifying one inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// A slash-command with optional argument.
    Command(ParsedCommand),
    /// A free-text expense ("gastei 50 no mercado").
    Expense { amount: f64, description: String, raw_text: String },
    /// An installment purchase ("comprei celular 1200 em 12x").
    Installment {
        total_amount: f64,
        installments: u32,
        installment_amount: f64,
        description: String,
        raw_text: String,
    },
    /// Anything else.
    Unknown { text: String },
}

/// Parsed "em Nx" info, before description extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstallmentInfo {
    pub total_amount: f64,
    pub installments: u32,
    pub installment_amount: f64,
}

/// True when the text carries an installment clause at all.
pub fn is_installment_purchase(text: &str) -> bool {
    INSTALLMENT_PATTERN.is_match(text)
}

/// Extract and validate installment info: total must be positive and the
/// count within 1..=100. Per-installment amount is the rounded quotient; no
/// reconciliation of rounding drift is performed.
pub fn extract_installment_info(text: &str) -> Option<InstallmentInfo> {
    let caps = INSTALLMENT_PATTERN.captures(text)?;
    let total_amount = parse_decimal(&caps[1])?;
    let installments: u32 = caps[2].parse().ok()?;

    if total_amount <= 0.0 || installments == 0 || installments > 100 {
        return None;
    }

    Some(InstallmentInfo {
        total_amount,
        installments,
        installment_amount: round2(total_amount / installments as f64),
    })
}

/// Expense heuristic: an extractable amount, or any spending keyword.
pub fn looks_like_expense(text: &str) -> bool {
    if extract_amount(text).is_some() {
        return true;
    }
    let lower = text.to_lowercase();
    EXPENSE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Classify one inbound message. Total: always produces exactly one variant
/// and never errors. Pure: same text, same result.
pub fn classify(text: &str) -> Intent {
    if let Some(command) = parse_command(text) {
        return Intent::Command(command);
    }

    if is_installment_purchase(text) && looks_like_expense(text) {
        if let Some(info) = extract_installment_info(text) {
            return Intent::Installment {
                total_amount: info.total_amount,
                installments: info.installments,
                installment_amount: info.installment_amount,
                description: installment_description(text, info.total_amount),
                raw_text: text.to_string(),
            };
        }
    }

    if looks_like_expense(text) {
        if let Some(amount) = extract_amount(text) {
            if amount > 0.0 {
                return Intent::Expense {
                    amount,
                    description: expense_description(text, amount),
                    raw_text: text.to_string(),
                };
            }
        }
    }

    Intent::Unknown { text: text.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandKind;

    #[test]
    fn command_beats_everything() {
        let intent = classify("/saldo 1000");
        let Intent::Command(cmd) = intent else {
            panic!("expected command, got {intent:?}");
        };
        assert_eq!(cmd.kind, CommandKind::SetBalance);
        assert_eq!(cmd.amount, Some(1000.0));
    }

    #[test]
    fn expense_with_amount_and_description() {
        let intent = classify("Gastei 50 no mercado");
        assert_eq!(
            intent,
            Intent::Expense {
                amount: 50.0,
                description: "mercado".to_string(),
                raw_text: "Gastei 50 no mercado".to_string(),
            }
        );
    }

    #[test]
    fn installment_purchase_with_per_installment_amount() {
        let intent = classify("comprei celular 1200 em 12x");
        let Intent::Installment { total_amount, installments, installment_amount, description, .. } =
            intent
        else {
            panic!("expected installment");
        };
        assert_eq!(total_amount, 1200.0);
        assert_eq!(installments, 12);
        assert_eq!(installment_amount, 100.0);
        assert_eq!(description, "celular");
    }

    #[test]
    fn installment_amount_is_rounded_not_reconciled() {
        let info = extract_installment_info("comprei sofa 1000 em 3x").unwrap();
        assert_eq!(info.installment_amount, 333.33);
        // 3 * 333.33 = 999.99 — drift is accepted, never patched up.
    }

    #[test]
    fn installment_count_bounds() {
        assert!(extract_installment_info("tv 1000 em 0x").is_none());
        assert!(extract_installment_info("tv 1000 em 101x").is_none());
        assert!(extract_installment_info("tv 1000 em 100x").is_some());
    }

    #[test]
    fn installment_clause_without_expense_signal_stays_unknown() {
        // "talvez 10 em 2x?" carries the clause but no spending verb and no
        // extractable amount, so it never reaches the installment branch.
        assert!(matches!(classify("talvez 10 em 2x?"), Intent::Unknown { .. }));
    }

    #[test]
    fn keyword_only_text_without_amount_is_unknown() {
        // "almocei" flags expense intent, but with no amount there is nothing
        // to record.
        assert!(matches!(classify("almocei muito bem"), Intent::Unknown { .. }));
    }

    #[test]
    fn arbitrary_text_is_unknown() {
        assert_eq!(classify("bom dia"), Intent::Unknown { text: "bom dia".to_string() });
    }

    #[test]
    fn classification_is_pure() {
        let text = "paguei 35,50 de uber";
        assert_eq!(classify(text), classify(text));
    }

    #[test]
    fn intent_serializes() {
        let intent = classify("gastei 50 no mercado");
        let json = serde_json::to_string(&intent).unwrap();
        let back: Intent = serde_json::from_str(&json).unwrap();
        assert_eq!(intent, back);
    }
}
