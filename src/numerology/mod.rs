//! Numerology: symbolic decoration of sat amounts.
//!
//! The amount's decimal form is run through an ordered list of substitution
//! rules. Each rule sees the output of the previous one, so rule order is part
//! of the result. Whatever digits survive the pipeline are dropped.

pub mod rules;

pub use rules::{load_rules, parse_rules, NumerologyRule, RuleLoadError};

use serde::Serialize;

/// Decoration computed for one amount.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumerologyResult {
    pub decorated_text: String,
    /// Labels of the rules that changed the text, in application order.
    pub matched_labels: Vec<String>,
}

impl NumerologyResult {
    /// Labels joined for a hover tooltip, or None when nothing matched.
    pub fn hover_text(&self) -> Option<String> {
        if self.matched_labels.is_empty() {
            None
        } else {
            Some(self.matched_labels.join(", "))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.decorated_text.is_empty()
    }
}

/// Decorate `amount` with `rules`, applied in order.
pub fn annotate(amount: u64, rules: &[NumerologyRule]) -> NumerologyResult {
    let mut text = amount.to_string();
    let mut matched_labels = Vec::new();

    for rule in rules {
        let candidate = rule.apply(&text);
        if candidate != text {
            matched_labels.push(rule.label().to_string());
        }
        text = candidate;
    }

    // Leftover numerals carry no meaning.
    text.retain(|c| !c.is_ascii_digit());

    NumerologyResult {
        decorated_text: text,
        matched_labels,
    }
}
