//! Dynamic-value classification
//!
//! Ids, class tokens and attribute values that embed dates, hashes, counters
//! or session tokens change between page loads; selectors built on them do
//! not survive a reload.

use regex::Regex;

use crate::config::{compile_pattern, ConfigError, DynamicPatternSet};

/// Pattern-driven classifier for ephemeral values and text
#[derive(Debug, Clone)]
pub struct DynamicClassifier {
    value_patterns: Vec<Regex>,
    content_patterns: Vec<Regex>,
}

impl DynamicClassifier {
    /// Compile both pattern families
    pub fn new(patterns: &DynamicPatternSet) -> Result<Self, ConfigError> {
        let value_patterns = patterns
            .value_patterns
            .iter()
            .map(|p| compile_pattern("dynamic-value", p))
            .collect::<Result<Vec<_>, _>>()?;
        let content_patterns = patterns
            .content_patterns
            .iter()
            .map(|p| compile_pattern("dynamic-content", p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            value_patterns,
            content_patterns,
        })
    }

    /// Whether a literal value looks auto-generated or time-dependent
    ///
    /// Empty values count as dynamic: there is nothing stable to anchor on.
    pub fn is_dynamic_value(&self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return true;
        }
        self.value_patterns.iter().any(|re| re.is_match(value))
    }

    /// Whether free text contains ephemeral content
    pub fn contains_dynamic_content(&self, text: &str) -> bool {
        self.content_patterns.iter().any(|re| re.is_match(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> DynamicClassifier {
        DynamicClassifier::new(&DynamicPatternSet::default()).expect("defaults compile")
    }

    #[test]
    fn test_dynamic_values() {
        let c = classifier();
        for value in [
            "",
            "   ",
            "a1b2c3d4e5f6",
            "item-12345678",
            "post-2024-01-15",
            "updated-12:30",
            "session-box",
            "tmp-wrapper",
            "d41d8cd98f00b204e9800998ecf8427e",
            "css-1q2w3e",
            "sc-bdVaJa",
            "Button_primary__3xK9z",
            "_x7f2k",
            "/static/app.3f9a2c1b.js",
            "row-1234567",
            "2024-01-15T10:30:00Z",
            "QUJDREVGR0hJSktMTU5PUFFSU1RVVldYWVo0MTIzNDU2Nzg5",
        ] {
            assert!(c.is_dynamic_value(value), "{:?} should be dynamic", value);
        }
    }

    #[test]
    fn test_stable_values() {
        let c = classifier();
        for value in [
            "submit-button",
            "btn-submit-42",
            "primary-btn",
            "main-content",
            "chapter-content",
            "nav",
            "card__title",
            "_container",
            "/book/42/chapter-3.html",
            "logo.png",
        ] {
            assert!(!c.is_dynamic_value(value), "{:?} should be stable", value);
        }
    }

    #[test]
    fn test_dynamic_content() {
        let c = classifier();
        assert!(c.contains_dynamic_content("Posted 3 hours ago"));
        assert!(c.contains_dynamic_content("5分钟前"));
        assert!(c.contains_dynamic_content("Chapter 12: The Return"));
        assert!(c.contains_dynamic_content("第十二章 归来"));
        assert!(c.contains_dynamic_content("1,024 views"));
        assert!(c.contains_dynamic_content("Updated 2024-03-01"));
        assert!(c.contains_dynamic_content("at 10:45"));
        assert!(c.contains_dynamic_content("Order 884213"));

        assert!(!c.contains_dynamic_content("Submit"));
        assert!(!c.contains_dynamic_content("Author: Jane"));
        assert!(!c.contains_dynamic_content("Next page"));
    }

    #[test]
    fn test_custom_patterns() {
        let c = DynamicClassifier::new(&DynamicPatternSet {
            value_patterns: vec!["^ng-".to_string()],
            content_patterns: vec![],
        })
        .expect("compile");
        assert!(c.is_dynamic_value("ng-star-inserted"));
        assert!(!c.is_dynamic_value("a1b2c3d4e5f6"));
        assert!(!c.contains_dynamic_content("3 hours ago"));
    }
}
