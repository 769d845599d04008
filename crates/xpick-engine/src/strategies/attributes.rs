//! Attribute-anchored strategies

use super::{Strategy, StrategyContext, StrategyResult};
use crate::candidate::{adjust_confidence, CandidatePath};
use crate::expr::{attr_contains, attr_eq, attr_starts_with, class_token};
use crate::query::NodeQuery;

/// Attributes that exist only to give tests a handle
pub const TEST_ATTRIBUTES: &[&str] = &["data-testid", "data-test", "data-qa", "data-field", "aria-label"];

const MULTI_ATTRIBUTES: &[&str] = &["name", "type", "rel", "title", "alt"];

const CONTAINS_ATTRIBUTES: &[&str] = &[
    "class", "id", "name", "title", "alt", "href", "src", "data-id", "data-name",
];

const PREFIX_ATTRIBUTES: &[&str] = &["id", "class", "href", "src", "data-id"];

/// Caps on emitted candidates
const MAX_CONTAINS: usize = 5;
const MAX_DATA: usize = 5;

/// Explicit test hooks
pub struct TestAttribute;

impl<D: NodeQuery> Strategy<D> for TestAttribute {
    fn name(&self) -> &'static str {
        "test-attribute"
    }

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult {
        let d = cx.descriptor;
        let mut out = Vec::new();
        for name in TEST_ATTRIBUTES {
            let Some(value) = d.attribute(name) else {
                continue;
            };
            if cx.is_dynamic(value) {
                continue;
            }
            let expression = format!("//*[{}]", attr_eq(name, value));
            let count = cx.match_count(&expression);
            if count == 0 {
                continue;
            }
            let confidence = if count == 1 { 0.95 } else { 0.88 };
            out.push(CandidatePath::new(
                expression,
                Strategy::<D>::name(self),
                format!("test hook {}=\"{}\"", name, value),
                confidence,
                count,
            ));
        }
        Ok(out)
    }
}

/// Stable, non-generated id
pub struct StableId;

impl<D: NodeQuery> Strategy<D> for StableId {
    fn name(&self) -> &'static str {
        "stable-id"
    }

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult {
        let d = cx.descriptor;
        let Some(id) = d.id.as_deref() else {
            return Ok(Vec::new());
        };
        if cx.is_dynamic(id) {
            return Ok(Vec::new());
        }
        let expression = format!("//*[{}]", attr_eq("id", id));
        let count = cx.match_count(&expression);
        if count == 0 {
            return Ok(Vec::new());
        }
        Ok(vec![CandidatePath::new(
            expression,
            Strategy::<D>::name(self),
            format!("id \"{}\"", id),
            0.92,
            count,
        )])
    }
}

/// Conjunction of descriptive attributes
pub struct MultiAttribute;

impl<D: NodeQuery> Strategy<D> for MultiAttribute {
    fn name(&self) -> &'static str {
        "multi-attribute"
    }

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult {
        let d = cx.descriptor;
        let predicates: Vec<String> = MULTI_ATTRIBUTES
            .iter()
            .filter_map(|name| d.attribute(name).map(|value| (*name, value)))
            .filter(|(_, value)| !cx.is_dynamic(value))
            .map(|(name, value)| attr_eq(name, value))
            .collect();
        if predicates.is_empty() {
            return Ok(Vec::new());
        }

        let joined = predicates.join(" and ");
        let expression = format!("//{}[{}]", d.tag, joined);
        let count = cx.match_count(&expression);
        if count == 0 {
            return Ok(Vec::new());
        }
        let name = Strategy::<D>::name(self);
        let description = format!("{} by {} attribute(s)", d.tag, predicates.len());
        if count == 1 {
            return Ok(vec![CandidatePath::new(expression, name, description, 0.75, count)]);
        }

        if let Some(class) = cx.stable_classes().first() {
            let refined = format!("//{}[{} and {}]", d.tag, joined, class_token(class));
            let refined_count = cx.match_count(&refined);
            if refined_count > 0 {
                return Ok(vec![CandidatePath::new(
                    refined,
                    name,
                    format!("{} plus class \"{}\"", description, class),
                    0.60,
                    refined_count,
                )]);
            }
        }
        Ok(vec![CandidatePath::new(expression, name, description, 0.60, count)])
    }
}

/// Substring match on a meaningful token of an attribute value
pub struct AttributeContains;

impl<D: NodeQuery> Strategy<D> for AttributeContains {
    fn name(&self) -> &'static str {
        "attribute-contains"
    }

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult {
        let d = cx.descriptor;
        let mut out = Vec::new();
        for attr in CONTAINS_ATTRIBUTES {
            // Tokens are only taken from values that are stable as a whole
            let value = match *attr {
                "class" => cx.stable_classes().join(" "),
                "id" => d.id.clone().filter(|id| !cx.is_dynamic(id)).unwrap_or_default(),
                other => d
                    .attribute(other)
                    .filter(|v| !cx.is_dynamic(v))
                    .unwrap_or_default()
                    .to_string(),
            };
            let mut seen: Vec<&str> = Vec::new();
            for token in value.split(['-', '_', ' ']) {
                if token.chars().count() < 3
                    || seen.contains(&token)
                    || cx.is_dynamic(token)
                    || cx.config.noise.is_noise(token)
                {
                    continue;
                }
                seen.push(token);
                let expression = format!("//{}[{}]", d.tag, attr_contains(attr, token));
                let count = cx.match_count(&expression);
                if count == 0 || count > 15 {
                    continue;
                }
                out.push(CandidatePath::new(
                    expression,
                    Strategy::<D>::name(self),
                    format!("@{} contains \"{}\"", attr, token),
                    adjust_confidence(0.75, count),
                    count,
                ));
                if out.len() >= MAX_CONTAINS {
                    return Ok(out);
                }
            }
        }
        Ok(out)
    }
}

/// Prefix match on `word-` style attribute values
pub struct AttributeStartsWith;

impl<D: NodeQuery> Strategy<D> for AttributeStartsWith {
    fn name(&self) -> &'static str {
        "attribute-starts-with"
    }

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult {
        let d = cx.descriptor;
        let mut out = Vec::new();
        for attr in PREFIX_ATTRIBUTES {
            let value = match *attr {
                "id" => d.id.as_deref(),
                // The raw attribute is matched, so its first token must be clean
                "class" => match (d.raw_classes.first(), d.classes.first()) {
                    (Some(raw), Some(clean)) if raw == clean => d.attribute("class"),
                    _ => None,
                },
                other => d.attribute(other),
            };
            let Some(value) = value else {
                continue;
            };
            let Some(prefix) = word_dash_prefix(value) else {
                continue;
            };
            let word = prefix.trim_end_matches('-');
            if word.len() < 2 || cx.is_dynamic(word) || cx.config.noise.has_ignored_prefix(prefix) {
                continue;
            }
            let expression = format!("//{}[{}]", d.tag, attr_starts_with(attr, prefix));
            let count = cx.match_count(&expression);
            if count == 0 || count > 30 {
                continue;
            }
            out.push(CandidatePath::new(
                expression,
                Strategy::<D>::name(self),
                format!("@{} starts with \"{}\"", attr, prefix),
                adjust_confidence(0.72, count),
                count,
            ));
        }
        Ok(out)
    }
}

/// Leading `letters-` of a value, dash included
fn word_dash_prefix(value: &str) -> Option<&str> {
    let letters = value.bytes().take_while(u8::is_ascii_alphabetic).count();
    (letters > 0 && value.as_bytes().get(letters) == Some(&b'-')).then(|| &value[..=letters])
}

/// Custom `data-*` attributes, singly and as a pair
pub struct DataAttribute;

impl<D: NodeQuery> Strategy<D> for DataAttribute {
    fn name(&self) -> &'static str {
        "data-attribute"
    }

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult {
        let d = cx.descriptor;
        let data: Vec<(&str, &str)> = d
            .attributes
            .iter()
            .filter(|(name, value)| name.starts_with("data-") && !cx.is_dynamic(value))
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        let name = Strategy::<D>::name(self);
        let mut out = Vec::new();

        if let [(a, av), (b, bv), ..] = data.as_slice() {
            let expression = format!("//{}[{} and {}]", d.tag, attr_eq(a, av), attr_eq(b, bv));
            let count = cx.match_count(&expression);
            if (1..=3).contains(&count) {
                out.push(CandidatePath::new(
                    expression,
                    name,
                    format!("{} and {}", a, b),
                    adjust_confidence(0.94, count),
                    count,
                ));
            }
        }

        for (attr, value) in data {
            if out.len() >= MAX_DATA {
                break;
            }
            let expression = format!("//{}[{}]", d.tag, attr_eq(attr, value));
            let count = cx.match_count(&expression);
            if count == 0 {
                continue;
            }
            out.push(CandidatePath::new(
                expression,
                name,
                format!("{}=\"{}\"", attr, value),
                adjust_confidence(0.91, count),
                count,
            ));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{expressions, run_on};

    #[test]
    fn test_test_attribute() {
        let html = r#"<button id="b" data-testid="submit-button">Go</button>
                      <div data-qa="row"></div><div id="r" data-qa="row"></div>"#;
        let c = run_on(TestAttribute, html, "b");
        assert_eq!(expressions(&c), vec![r#"//*[@data-testid="submit-button"]"#]);
        assert_eq!(c[0].confidence, 0.95);
        assert_eq!(c[0].strategy, "test-attribute");

        let c = run_on(TestAttribute, html, "r");
        assert_eq!(c[0].confidence, 0.88);
        assert_eq!(c[0].match_count, 2);
    }

    #[test]
    fn test_stable_id_skips_generated_and_tool_ids() {
        let c = run_on(StableId, r#"<p id="intro">x</p>"#, "intro");
        assert_eq!(expressions(&c), vec![r#"//*[@id="intro"]"#]);
        assert_eq!(c[0].confidence, 0.92);

        assert!(run_on(StableId, r#"<p id="a1b2c3d4e5f6">x</p>"#, "a1b2c3d4e5f6").is_empty());
        assert!(run_on(StableId, r#"<p id="xpath-12">x</p>"#, "xpath-12").is_empty());
    }

    #[test]
    fn test_stable_id_keeps_padding() {
        let c = run_on(StableId, r#"<p id=" intro ">x</p><p>y</p>"#, " intro ");
        assert_eq!(expressions(&c), vec![r#"//*[@id=" intro "]"#]);
        assert_eq!(c[0].confidence, 0.92);
        assert_eq!(c[0].match_count, 1);
    }

    #[test]
    fn test_word_dash_prefix() {
        assert_eq!(word_dash_prefix("item-7"), Some("item-"));
        assert_eq!(word_dash_prefix("Nav-bar-x"), Some("Nav-"));
        assert_eq!(word_dash_prefix("-item"), None);
        assert_eq!(word_dash_prefix(" item-7"), None);
        assert_eq!(word_dash_prefix("item7-x"), None);
        assert_eq!(word_dash_prefix("item"), None);
    }

    #[test]
    fn test_multi_attribute() {
        let html = r#"<input id="q" name="q" type="search" title="Search">
                      <input name="other" type="search">"#;
        let c = run_on(MultiAttribute, html, "q");
        assert_eq!(
            expressions(&c),
            vec![r#"//input[@name="q" and @type="search" and @title="Search"]"#]
        );
        assert_eq!(c[0].confidence, 0.75);
    }

    #[test]
    fn test_multi_attribute_refines_with_class() {
        let html = r#"<a id="x" class="ext" rel="nofollow">a</a><a class="int" rel="nofollow">b</a>"#;
        let c = run_on(MultiAttribute, html, "x");
        assert_eq!(c.len(), 1);
        assert!(c[0].expression.contains(r#"@rel="nofollow" and contains(concat("#));
        assert_eq!(c[0].confidence, 0.60);
        assert_eq!(c[0].match_count, 1);
    }

    #[test]
    fn test_attribute_contains_tokens() {
        let html = r#"<div id="main-panel" class="panel-wide xpath-hover">x</div>"#;
        let c = run_on(AttributeContains, html, "main-panel");
        let exprs = expressions(&c);
        assert!(exprs.contains(&r#"//div[contains(@class, "panel")]"#));
        assert!(exprs.contains(&r#"//div[contains(@class, "wide")]"#));
        assert!(exprs.contains(&r#"//div[contains(@id, "main")]"#));
        assert!(!exprs.iter().any(|e| e.contains("xpath") || e.contains("hover")));
        assert!(c.len() <= MAX_CONTAINS);
    }

    #[test]
    fn test_attribute_starts_with() {
        let html = r#"<li id="item-7" class="entry-card">a</li><li id="item-8">b</li>"#;
        let c = run_on(AttributeStartsWith, html, "item-7");
        let exprs = expressions(&c);
        assert_eq!(
            exprs,
            vec![
                r#"//li[starts-with(@id, "item-")]"#,
                r#"//li[starts-with(@class, "entry-")]"#,
            ]
        );
        assert_eq!(c[0].confidence, 0.57);
        assert_eq!(c[1].confidence, 0.72);
    }

    #[test]
    fn test_starts_with_skips_noisy_class_head() {
        let html = r#"<li id="t" class="xpath-selected entry-card">a</li>"#;
        let c = run_on(AttributeStartsWith, html, "t");
        assert!(c.iter().all(|c| !c.expression.contains("@class")));
    }

    #[test]
    fn test_data_attributes() {
        let html = r#"<div id="t" data-kind="book" data-slot="left" data-xpath-id="9">x</div>
                      <div data-kind="book"></div>"#;
        let c = run_on(DataAttribute, html, "t");
        assert_eq!(
            expressions(&c),
            vec![
                r#"//div[@data-kind="book" and @data-slot="left"]"#,
                r#"//div[@data-kind="book"]"#,
                r#"//div[@data-slot="left"]"#,
            ]
        );
        assert_eq!(c[0].confidence, 0.94);
        assert_eq!(c[1].confidence, 0.76);
        assert_eq!(c[2].confidence, 0.91);
    }
}
