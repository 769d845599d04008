//! XPath expression fragments
//!
//! Literals always go through [`quote_literal`], so values containing quotes
//! still produce valid expressions.

use xpick_xpath::quote_literal;

use crate::classifier::DynamicClassifier;

/// `@name="value"`
pub fn attr_eq(name: &str, value: &str) -> String {
    format!("@{}={}", name, quote_literal(value))
}

/// `contains(@name, "part")`
pub fn attr_contains(name: &str, part: &str) -> String {
    format!("contains(@{}, {})", name, quote_literal(part))
}

/// `starts-with(@name, "prefix")`
pub fn attr_starts_with(name: &str, prefix: &str) -> String {
    format!("starts-with(@{}, {})", name, quote_literal(prefix))
}

/// Whole-token class membership test
pub fn class_token(class: &str) -> String {
    format!(
        "contains(concat(\" \", normalize-space(@class), \" \"), {})",
        quote_literal(&format!(" {} ", class))
    )
}

/// `contains(normalize-space(.), "text")`
pub fn text_contains(text: &str) -> String {
    format!("contains(normalize-space(.), {})", quote_literal(text))
}

/// `starts-with(normalize-space(.), "text")`
pub fn text_starts_with(text: &str) -> String {
    format!("starts-with(normalize-space(.), {})", quote_literal(text))
}

/// Single step naming an element by its steadiest feature
///
/// Prefers a stable id, then the first stable class, then the bare tag.
pub fn element_step(tag: &str, id: Option<&str>, classes: &[String], classifier: &DynamicClassifier) -> String {
    if let Some(id) = id.filter(|id| !classifier.is_dynamic_value(id)) {
        return format!("{}[{}]", tag, attr_eq("id", id));
    }
    match classes.iter().find(|c| !classifier.is_dynamic_value(c)) {
        Some(class) => format!("{}[{}]", tag, class_token(class)),
        None => tag.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DynamicPatternSet;

    #[test]
    fn test_fragments() {
        assert_eq!(attr_eq("id", "main"), r#"@id="main""#);
        assert_eq!(attr_eq("title", r#"say "hi""#), r#"@title='say "hi"'"#);
        assert_eq!(
            class_token("nav"),
            r#"contains(concat(" ", normalize-space(@class), " "), " nav ")"#
        );
        assert_eq!(text_starts_with("Author:"), r#"starts-with(normalize-space(.), "Author:")"#);
    }

    #[test]
    fn test_element_step_preference() {
        let classifier = DynamicClassifier::new(&DynamicPatternSet::default()).expect("compile");
        let classes = vec!["css-1x9zq2".to_string(), "list".to_string()];
        assert_eq!(element_step("ul", Some("menu"), &classes, &classifier), r#"ul[@id="menu"]"#);
        assert_eq!(
            element_step("ul", Some("a1b2c3d4e5f6"), &classes, &classifier),
            r#"ul[contains(concat(" ", normalize-space(@class), " "), " list ")]"#
        );
        assert_eq!(element_step("ul", None, &[], &classifier), "ul");
    }
}
