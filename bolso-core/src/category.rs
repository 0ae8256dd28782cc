//! Keyword-scoring category matcher.
//!
//! Each configured category carries an ordered keyword list; the matcher
//! scores every non-reserved category against the description and picks the
//! highest total. Ties keep the first category in the supplied order — the
//! caller supplies categories ordered by name, and that order is part of the
//! contract.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A spending category as configured by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub emoji: String,
    pub keywords: Vec<String>,
}

impl Category {
    pub fn new(id: i64, name: &str, emoji: &str, keywords: &[&str]) -> Self {
        Self {
            id,
            name: name.to_string(),
            emoji: emoji.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Never auto-assigned: "Outros" is the zero-score fallback, the other two
/// are only ever targeted by explicit commands.
pub const RESERVED_CATEGORIES: &[&str] = &["Outros", "Poupança", "Emergência"];

const SCORE_EXACT: i32 = 100;
const SCORE_WORD: i32 = 50;
const SCORE_SUBSTRING: i32 = 10;

fn keyword_score(text: &str, keyword: &str) -> i32 {
    if text == keyword {
        return SCORE_EXACT;
    }

    let boundary = format!(r"\b{}\b", regex::escape(keyword));
    if Regex::new(&boundary).map(|re| re.is_match(text)).unwrap_or(false) {
        return SCORE_WORD;
    }

    if text.contains(keyword) {
        return SCORE_SUBSTRING;
    }

    0
}

/// Score one category: keyword scores accumulate; an exact full-string hit
/// short-circuits the rest of the list.
fn category_score(text: &str, category: &Category) -> i32 {
    let mut score = 0;
    for keyword in &category.keywords {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            continue;
        }
        let s = keyword_score(text, &keyword);
        score += s;
        if s == SCORE_EXACT {
            break;
        }
    }
    score
}

/// Pick the best category id for a description.
///
/// Zero total score falls back to "Outros"; with no "Outros" configured the
/// last supplied category wins. `None` only when `categories` is empty.
pub fn match_category(description: &str, categories: &[Category]) -> Option<i64> {
    let text = description.to_lowercase();
    let text = text.trim();

    let mut best: Option<(i64, i32)> = None;
    for category in categories {
        if RESERVED_CATEGORIES.contains(&category.name.as_str()) {
            continue;
        }

        let score = category_score(text, category);
        if score == 0 {
            continue;
        }

        // Strict greater-than: equal scores keep the earlier category.
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((category.id, score)),
        }
    }

    if let Some((id, _)) = best {
        return Some(id);
    }

    categories
        .iter()
        .find(|c| c.name == "Outros")
        .or_else(|| categories.last())
        .map(|c| c.id)
}
