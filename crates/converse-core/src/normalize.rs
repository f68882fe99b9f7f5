//! Lexical normalizer: deterministic text-to-token transform.
//!
//! Lowercases, strips everything that is not alphanumeric or whitespace,
//! splits on whitespace, substitutes a fixed inflection->lemma table for
//! common verb forms plus a short domain list, and rejoins with single
//! spaces. Pure: no side effects, no shared state.
//!
//! Empty or punctuation-only input yields the empty string. Callers must
//! treat that as "no signal", never as an error.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Fixed inflection -> lemma substitutions.
///
/// Covers be/run/go/have/do/say forms and the domain words that show up
/// in training patterns (orders, returns, problems, issues).
static LEMMAS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("are", "be"),
        ("am", "be"),
        ("is", "be"),
        ("was", "be"),
        ("were", "be"),
        ("running", "run"),
        ("ran", "run"),
        ("runs", "run"),
        ("going", "go"),
        ("went", "go"),
        ("goes", "go"),
        ("having", "have"),
        ("had", "have"),
        ("has", "have"),
        ("doing", "do"),
        ("did", "do"),
        ("does", "do"),
        ("saying", "say"),
        ("said", "say"),
        ("says", "say"),
        ("orders", "order"),
        ("ordered", "order"),
        ("returns", "return"),
        ("returned", "return"),
        ("problems", "problem"),
        ("issues", "issue"),
    ])
});

/// Normalize free text into a canonical token string.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .map(|token| *LEMMAS.get(token).unwrap_or(&token))
        .collect::<Vec<_>>()
        .join(" ")
}
