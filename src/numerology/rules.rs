//! Numerology rule records and loading.

use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// One substitution step of the numerology pipeline.
///
/// The pattern is compiled when the rule is built. A pattern that does not
/// compile leaves the rule inert: [`NumerologyRule::apply`] returns the input
/// unchanged.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawRule")]
pub struct NumerologyRule {
    pattern: String,
    replacement: String,
    label: String,
    compiled: Option<Regex>,
}

/// Rule file record. Accepts both the BoostBots field names (`regex`, `emoji`,
/// `name`) and descriptive ones.
#[derive(Debug, Deserialize)]
struct RawRule {
    #[serde(alias = "regex")]
    pattern: String,
    #[serde(alias = "emoji")]
    replacement: String,
    #[serde(alias = "name")]
    label: String,
}

impl From<RawRule> for NumerologyRule {
    fn from(raw: RawRule) -> Self {
        NumerologyRule::new(raw.pattern, raw.replacement, raw.label)
    }
}

impl NumerologyRule {
    pub fn new(
        pattern: impl Into<String>,
        replacement: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        let pattern = pattern.into();
        let label = label.into();
        let compiled = match Regex::new(&pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Numerology rule '{}' has an invalid pattern, skipping: {}", label, e);
                None
            }
        };

        Self {
            pattern,
            replacement: replacement.into(),
            label,
            compiled,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the pattern compiled.
    pub fn is_valid(&self) -> bool {
        self.compiled.is_some()
    }

    /// Replace every match of the pattern in `text`.
    pub fn apply(&self, text: &str) -> String {
        match &self.compiled {
            Some(re) => re.replace_all(text, self.replacement.as_str()).into_owned(),
            None => text.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RuleLoadError {
    #[error("Failed to read numerology rules from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid numerology rule file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parse an ordered rule list from its JSON form.
pub fn parse_rules(json: &str) -> Result<Vec<NumerologyRule>, RuleLoadError> {
    Ok(serde_json::from_str(json)?)
}

/// Load the ordered rule list from a JSON file.
pub fn load_rules(path: impl AsRef<Path>) -> Result<Vec<NumerologyRule>, RuleLoadError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| RuleLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rules = parse_rules(&content)?;

    let inert = rules.iter().filter(|r| !r.is_valid()).count();
    info!(
        "Loaded {} numerology rules from {} ({} inert)",
        rules.len(),
        path.display(),
        inert
    );

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_boostbots_field_names() {
        let rules = parse_rules(
            r#"[{"regex": "69", "emoji": "🌴", "name": "nice"},
                {"pattern": "420", "replacement": "🌿", "label": "blaze"}]"#,
        )
        .unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].pattern(), "69");
        assert_eq!(rules[0].replacement(), "🌴");
        assert_eq!(rules[0].label(), "nice");
        assert_eq!(rules[1].label(), "blaze");
        assert!(rules.iter().all(|r| r.is_valid()));
    }

    #[test]
    fn test_invalid_pattern_is_inert() {
        let rule = NumerologyRule::new("(unclosed", "x", "broken");
        assert!(!rule.is_valid());
        assert_eq!(rule.apply("123"), "123");
    }

    #[test]
    fn test_lookbehind_pattern_is_inert() {
        let rule = NumerologyRule::new("(?<=1)2", "x", "lookbehind");
        assert!(!rule.is_valid());
        assert_eq!(rule.apply("12"), "12");
    }

    #[test]
    fn test_apply_replaces_all_matches() {
        let rule = NumerologyRule::new("69", "🌴", "nice");
        assert_eq!(rule.apply("69069"), "🌴0🌴");
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_rules(r#"{"regex": "69"}"#).unwrap_err();
        assert!(matches!(err, RuleLoadError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_rules("/nonexistent/numerology.json").unwrap_err();
        assert!(matches!(err, RuleLoadError::Io { .. }));
    }
}
