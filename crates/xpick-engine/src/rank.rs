//! Validation and ranking

use std::collections::HashSet;

use tracing::trace;

use crate::candidate::CandidatePath;
use crate::query::NodeQuery;

/// Whether `expression` selects `target`
pub fn validate<D: NodeQuery>(doc: &D, expression: &str, target: D::Node) -> bool {
    validated_count(doc, expression, target).is_some()
}

/// Match count of `expression`, if it selects `target`
pub fn validated_count<D: NodeQuery>(doc: &D, expression: &str, target: D::Node) -> Option<usize> {
    if expression.trim().is_empty() {
        return None;
    }
    match doc.evaluate(expression) {
        Ok(nodes) if nodes.contains(&target) => Some(nodes.len()),
        Ok(_) => {
            trace!("dropping {}: target not selected", expression);
            None
        }
        Err(err) => {
            trace!("dropping {}: {}", expression, err);
            None
        }
    }
}

/// Remove repeated expressions, keeping the first occurrence
pub fn dedupe(candidates: Vec<CandidatePath>) -> Vec<CandidatePath> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.expression.clone()))
        .collect()
}

/// Best first: higher confidence, then fewer matches
///
/// The sort is stable, so equal candidates keep bank order.
pub fn sort(candidates: &mut [CandidatePath]) {
    candidates.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then(a.match_count.cmp(&b.match_count))
    });
}

/// Dedupe then sort
pub fn rank(candidates: Vec<CandidatePath>) -> Vec<CandidatePath> {
    let mut ranked = dedupe(candidates);
    sort(&mut ranked);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(expression: &str, strategy: &'static str, confidence: f64, match_count: usize) -> CandidatePath {
        CandidatePath::new(expression, strategy, "", confidence, match_count)
    }

    #[test]
    fn test_rank_order() {
        let ranked = rank(vec![
            candidate("//a", "tag-only", 0.75, 3),
            candidate("//b", "stable-id", 0.92, 1),
            candidate("//c", "semantic-class", 0.75, 1),
            candidate("//d", "positional", 0.75, 1),
        ]);
        let order: Vec<&str> = ranked.iter().map(|c| c.expression.as_str()).collect();
        assert_eq!(order, vec!["//b", "//c", "//d", "//a"]);
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let ranked = rank(vec![
            candidate("//a", "structural", 0.65, 1),
            candidate("//a", "positional", 0.68, 1),
        ]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].strategy, "structural");
    }

    #[test]
    fn test_validate() {
        let doc = xpick_html::parse(r#"<p id="a">x</p><p>y</p>"#).expect("parse");
        let target = doc.get_element_by_id("a").expect("p");
        assert_eq!(validated_count(&doc, "//p", target), Some(2));
        assert!(validate(&doc, r#"//p[@id="a"]"#, target));
        assert!(!validate(&doc, "//p[2]", target));
        assert!(!validate(&doc, "//p[", target));
        assert!(!validate(&doc, "  ", target));
    }
}
