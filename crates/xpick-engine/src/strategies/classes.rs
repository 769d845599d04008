//! Class-token strategies

use super::{Strategy, StrategyContext, StrategyResult};
use crate::candidate::{adjust_confidence, CandidatePath};
use crate::expr::{class_token, text_contains};
use crate::query::NodeQuery;

/// Longest text used to disambiguate a shared class
const MAX_REFINE_TEXT: usize = 30;

/// One meaningful class per candidate, refined by text when shared
pub struct SemanticClass;

impl<D: NodeQuery> Strategy<D> for SemanticClass {
    fn name(&self) -> &'static str {
        "semantic-class"
    }

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult {
        let d = cx.descriptor;
        let name = Strategy::<D>::name(self);
        let text = d.text.as_str();
        let usable_text = !text.is_empty()
            && text.chars().count() <= MAX_REFINE_TEXT
            && !cx.has_dynamic_content(text)
            && !cx.is_dynamic(text);

        let mut out = Vec::new();
        for class in cx.stable_classes().into_iter().take(2) {
            let expression = format!("//{}[{}]", d.tag, class_token(class));
            let count = cx.match_count(&expression);
            if count == 0 {
                continue;
            }
            if count == 1 {
                out.push(CandidatePath::new(expression, name, format!("class \"{}\"", class), 0.85, count));
                continue;
            }
            if usable_text {
                let refined = format!("//{}[{}][{}]", d.tag, class_token(class), text_contains(text));
                let refined_count = cx.match_count(&refined);
                if refined_count > 0 {
                    out.push(CandidatePath::new(
                        refined,
                        name,
                        format!("class \"{}\" with text \"{}\"", class, text),
                        0.70,
                        refined_count,
                    ));
                    continue;
                }
            }
            out.push(CandidatePath::new(
                expression,
                name,
                format!("class \"{}\" ({} matches)", class, count),
                adjust_confidence(0.85, count),
                count,
            ));
        }
        Ok(out)
    }
}

/// Conjunctions of two and three class tokens
pub struct MultiClass;

impl<D: NodeQuery> Strategy<D> for MultiClass {
    fn name(&self) -> &'static str {
        "multi-class"
    }

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult {
        let d = cx.descriptor;
        let classes = cx.stable_classes();
        let name = Strategy::<D>::name(self);
        let mut out = Vec::new();

        if let [a, b, ..] = classes.as_slice() {
            let expression = format!("//{}[{} and {}]", d.tag, class_token(a), class_token(b));
            let count = cx.match_count(&expression);
            if count > 0 {
                out.push(CandidatePath::new(
                    expression,
                    name,
                    format!("classes \"{}\" and \"{}\"", a, b),
                    adjust_confidence(0.85, count),
                    count,
                ));
            }
        }

        if let [a, b, c, ..] = classes.as_slice() {
            let expression = format!(
                "//{}[{} and {} and {}]",
                d.tag,
                class_token(a),
                class_token(b),
                class_token(c)
            );
            let count = cx.match_count(&expression);
            if (1..=5).contains(&count) {
                out.push(CandidatePath::new(
                    expression,
                    name,
                    format!("classes \"{}\", \"{}\" and \"{}\"", a, b, c),
                    adjust_confidence(0.88, count),
                    count,
                ));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{expressions, run_on};

    #[test]
    fn test_unique_class() {
        let html = r#"<button id="b" class="primary-btn xpath-hover-highlight">Go</button>"#;
        let c = run_on(SemanticClass, html, "b");
        assert_eq!(
            expressions(&c),
            vec![r#"//button[contains(concat(" ", normalize-space(@class), " "), " primary-btn ")]"#]
        );
        assert_eq!(c[0].confidence, 0.85);
    }

    #[test]
    fn test_shared_class_refined_by_text() {
        let html = r#"<a class="nav">Home</a><a id="t" class="nav">About</a>"#;
        let c = run_on(SemanticClass, html, "t");
        assert_eq!(c.len(), 1);
        assert!(c[0].expression.ends_with(r#"[contains(normalize-space(.), "About")]"#));
        assert_eq!(c[0].confidence, 0.70);
        assert_eq!(c[0].match_count, 1);
    }

    #[test]
    fn test_shared_class_without_usable_text() {
        let html = r#"<a class="nav">3 hours ago</a><a id="t" class="nav">5 hours ago</a>"#;
        let c = run_on(SemanticClass, html, "t");
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].match_count, 2);
        assert_eq!(c[0].confidence, 0.70);
    }

    #[test]
    fn test_dynamic_classes_skipped() {
        let html = r#"<div id="t" class="css-8fk2la sc-hKgILt"></div>"#;
        assert!(run_on(SemanticClass, html, "t").is_empty());
        assert!(run_on(MultiClass, html, "t").is_empty());
    }

    #[test]
    fn test_multi_class() {
        let html = r#"<span id="t" class="tag small blue">x</span><span class="tag small">y</span>"#;
        let c = run_on(MultiClass, html, "t");
        assert_eq!(c.len(), 2);
        assert_eq!(c[0].match_count, 2);
        assert_eq!(c[0].confidence, 0.70);
        assert_eq!(c[1].match_count, 1);
        assert_eq!(c[1].confidence, 0.88);
    }
}
