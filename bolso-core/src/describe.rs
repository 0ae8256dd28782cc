//! Best-effort description cleanup for expense and installment text.
//!
//! This is a lossy heuristic, not a grammar parser: it strips the tokens the
//! detectors already recognized (action verb, amount, currency markers,
//! installment clause, one leading preposition) and keeps whatever survives.

use std::sync::LazyLock;

use regex::Regex;

const DEFAULT_EXPENSE: &str = "Gasto";
const DEFAULT_INSTALLMENT: &str = "Compra parcelada";

static LEADING_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:gastei|paguei|comprei|saiu|foi|custou|deu)\s+").expect("verb pattern")
});

static CURRENCY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:r\$|rs)\s*").expect("currency pattern"));

static INSTALLMENT_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(?:em|por|parcelado em|parcelada em|parcelado|parcelada)\s*\d+x?")
        .expect("installment clause pattern")
});

static LEADING_PREPOSITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:em|de|com|no|na|para|pro|pra)\s+").expect("preposition pattern")
});

/// Pattern for the amount token as it appears in text: the integer part plus
/// whatever 1-2 decimal digits followed it, with either separator — "25,90",
/// "25.9" and "25" all collapse to the same token for amount 25.9.
fn amount_token(amount: f64) -> String {
    format!(r"{}(?:[.,]\d{{1,2}})?", amount.trunc() as i64)
}

fn strip_dynamic(text: &str, pattern: &str) -> String {
    match Regex::new(pattern) {
        Ok(re) => re.replace_all(text, "").into_owned(),
        Err(_) => text.to_string(),
    }
}

/// Description for a plain expense: text minus verb, amount token (with
/// currency prefix and optional money word) and leading preposition.
pub fn expense_description(text: &str, amount: f64) -> String {
    let mut description = LEADING_VERB.replace(text, "").into_owned();

    let amount_re = format!(
        r"(?i)(?:r\$|rs)?\s*{}\s*(?:reais?|contos?|pilas?|pau|mangos)?",
        amount_token(amount)
    );
    description = strip_dynamic(&description, &amount_re);

    description = CURRENCY_MARKER.replace_all(&description, "").into_owned();
    description = LEADING_PREPOSITION.replace(&description, "").into_owned();
    let description = description.trim();

    if description.is_empty() { DEFAULT_EXPENSE.to_string() } else { description.to_string() }
}

/// Description for an installment purchase: additionally strips the trailing
/// "em Nx" clause.
pub fn installment_description(text: &str, total_amount: f64) -> String {
    let mut description = LEADING_VERB.replace(text, "").into_owned();

    let amount_re = format!(r"(?i)(?:r\$|rs)?\s*{}", amount_token(total_amount));
    description = strip_dynamic(&description, &amount_re);

    description = INSTALLMENT_CLAUSE.replace_all(&description, "").into_owned();
    description = CURRENCY_MARKER.replace_all(&description, "").into_owned();
    description = LEADING_PREPOSITION.replace(&description, "").into_owned();
    let description = description.trim();

    if description.is_empty() { DEFAULT_INSTALLMENT.to_string() } else { description.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_verb_amount_and_preposition() {
        assert_eq!(expense_description("Gastei 50 no mercado", 50.0), "mercado");
        assert_eq!(expense_description("paguei R$ 30 de uber", 30.0), "uber");
    }

    #[test]
    fn strips_money_words() {
        assert_eq!(expense_description("gastei 30 conto na padaria", 30.0), "padaria");
    }

    #[test]
    fn decimal_amounts_match_either_separator() {
        assert_eq!(expense_description("gastei 25,90 na farmácia", 25.9), "farmácia");
        assert_eq!(expense_description("gastei 25.90 na farmácia", 25.9), "farmácia");
    }

    #[test]
    fn empty_residue_falls_back_to_default() {
        assert_eq!(expense_description("gastei 50", 50.0), "Gasto");
        assert_eq!(expense_description("R$ 50", 50.0), "Gasto");
        assert_eq!(installment_description("1200 em 12x", 1200.0), "Compra parcelada");
    }

    #[test]
    fn installment_clause_is_removed() {
        assert_eq!(installment_description("comprei celular 1200 em 12x", 1200.0), "celular");
        assert_eq!(installment_description("notebook 3500 parcelado em 10x", 3500.0), "notebook");
    }

    #[test]
    fn only_one_leading_preposition_is_stripped() {
        // "para o" — only the recognized connective goes away.
        assert_eq!(expense_description("gastei 20 com presente para ana", 20.0), "presente para ana");
    }
}
