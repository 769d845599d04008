//! Structure-anchored strategies: containers, parents, ancestors, siblings

use super::{Strategy, StrategyContext, StrategyError, StrategyResult};
use crate::candidate::{adjust_confidence, CandidatePath};
use crate::expr::{class_token, element_step};
use crate::query::NodeQuery;

/// Segments kept in an absolute path before it is cut loose with `//`
const MAX_ABSOLUTE_DEPTH: usize = 8;

/// Ancestor levels tried by [`AncestorPath`]
const MAX_ANCESTOR_DEPTH: usize = 3;

/// Tag under the nearest semantic container
pub struct Structural;

impl<D: NodeQuery> Strategy<D> for Structural {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult {
        let d = cx.descriptor;
        let Some(container) = &d.container else {
            return Ok(Vec::new());
        };
        let scope = element_step(
            &container.tag,
            container.id.as_deref(),
            &container.classes,
            &cx.config.classifier,
        );
        let name = Strategy::<D>::name(self);

        let expression = format!("//{}//{}", scope, d.tag);
        let count = cx.match_count(&expression);
        if count == 0 {
            return Ok(Vec::new());
        }
        let description = format!("{} inside {}", d.tag, container.tag);
        if count == 1 {
            return Ok(vec![CandidatePath::new(expression, name, description, 0.80, count)]);
        }

        let mut out = Vec::new();
        if let Some(class) = cx.stable_classes().first() {
            let refined = format!("//{}//{}[{}]", scope, d.tag, class_token(class));
            let refined_count = cx.match_count(&refined);
            if refined_count > 0 {
                out.push(CandidatePath::new(
                    refined,
                    name,
                    format!("{} with class \"{}\"", description, class),
                    0.65,
                    refined_count,
                ));
                if refined_count == 1 {
                    return Ok(out);
                }
            }
        }
        let indexed = format!("//{}//{}[{}]", scope, d.tag, d.siblings.same_tag_index);
        let indexed_count = cx.match_count(&indexed);
        if indexed_count > 0 {
            out.push(CandidatePath::new(
                indexed,
                name,
                format!("{} #{}", description, d.siblings.same_tag_index),
                0.65,
                indexed_count,
            ));
        }
        Ok(out)
    }
}

/// Child index under a described parent
pub struct Positional;

impl<D: NodeQuery> Strategy<D> for Positional {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult {
        let d = cx.descriptor;
        let Some(parent) = d.parent.as_ref().filter(|p| !p.is_body) else {
            return Ok(Vec::new());
        };
        let scope = element_step(&parent.tag, parent.id.as_deref(), &parent.classes, &cx.config.classifier);
        let name = Strategy::<D>::name(self);
        let pos = d.siblings;

        let mut proposals = Vec::new();
        if pos.index == pos.same_tag_index {
            proposals.push((format!("//{}/{}[{}]", scope, d.tag, pos.index), 0.68));
        } else {
            proposals.push((format!("//{}/*[{}]", scope, pos.index), 0.68));
            proposals.push((format!("//{}/{}[{}]", scope, d.tag, pos.same_tag_index), 0.66));
        }

        let mut out = Vec::new();
        for (expression, confidence) in proposals {
            let count = cx.match_count(&expression);
            if count > 0 {
                out.push(CandidatePath::new(
                    expression,
                    name,
                    format!("child {} of {}", pos.index, parent.tag),
                    confidence,
                    count,
                ));
            }
        }
        Ok(out)
    }
}

/// Bare tag, when it is rare on the page
pub struct TagOnly;

impl<D: NodeQuery> Strategy<D> for TagOnly {
    fn name(&self) -> &'static str {
        "tag-only"
    }

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult {
        let d = cx.descriptor;
        let expression = format!("//{}", d.tag);
        let count = cx.match_count(&expression);
        if !(1..=5).contains(&count) {
            return Ok(Vec::new());
        }
        Ok(vec![CandidatePath::new(
            expression,
            Strategy::<D>::name(self),
            format!("<{}> element", d.tag),
            adjust_confidence(0.90, count),
            count,
        )])
    }
}

/// Chains of up to three ancestors, bare and attributed
pub struct AncestorPath;

impl<D: NodeQuery> Strategy<D> for AncestorPath {
    fn name(&self) -> &'static str {
        "ancestor-path"
    }

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult {
        let d = cx.descriptor;
        let doc = cx.doc;
        let mut ancestors = Vec::new();
        let mut current = doc.parent_element(cx.target);
        while let Some(node) = current {
            if ancestors.len() == MAX_ANCESTOR_DEPTH || doc.is_body(node) || doc.tag_name(node) == Some("html") {
                break;
            }
            ancestors.push(node);
            current = doc.parent_element(node);
        }

        let name = Strategy::<D>::name(self);
        let mut out = Vec::new();
        for depth in 1..=ancestors.len() {
            let chain: Vec<D::Node> = ancestors[..depth].iter().rev().copied().collect();
            let plain_steps: Vec<&str> = chain.iter().filter_map(|n| doc.tag_name(*n)).collect();
            let rich_steps: Vec<String> = chain.iter().filter_map(|n| cx.element_step(*n)).collect();
            let penalty = 0.05 * depth as f64;

            let plain = format!("//{}/{}", plain_steps.join("/"), d.tag);
            let count = cx.match_count(&plain);
            if (1..=20).contains(&count) {
                out.push(CandidatePath::new(
                    plain.clone(),
                    name,
                    format!("{} levels of ancestor tags", depth),
                    0.70 - penalty,
                    count,
                ));
            }

            let rich = format!("//{}/{}", rich_steps.join("/"), d.tag);
            if rich == plain {
                continue;
            }
            let count = cx.match_count(&rich);
            if (1..=10).contains(&count) {
                out.push(CandidatePath::new(
                    rich,
                    name,
                    format!("{} levels of described ancestors", depth),
                    0.75 - penalty,
                    count,
                ));
            }
        }
        Ok(out)
    }
}

/// Full indexed path from the root
pub struct AbsolutePath;

impl<D: NodeQuery> Strategy<D> for AbsolutePath {
    fn name(&self) -> &'static str {
        "absolute-path"
    }

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult {
        let doc = cx.doc;
        let analyzer = cx.analyzer();
        let mut segments = Vec::new();
        let mut node = cx.target;
        loop {
            let tag = doc.tag_name(node).ok_or(StrategyError::Detached)?;
            let Some(parent) = doc.parent_element(node) else {
                segments.push(tag.to_string());
                break;
            };
            let pos = analyzer.position(doc, node);
            if pos.same_tag_total > 1 {
                segments.push(format!("{}[{}]", tag, pos.same_tag_index));
            } else {
                segments.push(tag.to_string());
            }
            node = parent;
        }
        segments.reverse();

        // Root and body never need an index; anything deeper than the cap is anchored loosely
        let below_body = segments.len().saturating_sub(2);
        let expression = if below_body > MAX_ABSOLUTE_DEPTH {
            format!("//{}", segments[segments.len() - MAX_ABSOLUTE_DEPTH..].join("/"))
        } else {
            format!("/{}", segments.join("/"))
        };
        let count = cx.try_match_count(&expression)?;
        if count == 0 {
            return Ok(Vec::new());
        }
        Ok(vec![CandidatePath::new(
            expression,
            Strategy::<D>::name(self),
            "absolute position in the document",
            0.60,
            count,
        )
        .with_warning("absolute path; breaks when the page layout changes")])
    }
}

/// Relative to an adjacent sibling that carries a stable class
pub struct SiblingRelation;

impl<D: NodeQuery> Strategy<D> for SiblingRelation {
    fn name(&self) -> &'static str {
        "sibling-relation"
    }

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult {
        let d = cx.descriptor;
        let name = Strategy::<D>::name(self);
        let mut out = Vec::new();

        let stable_class = |classes: &[String]| -> Option<String> {
            classes
                .iter()
                .find(|c| !cx.config.classifier.is_dynamic_value(c))
                .cloned()
        };
        let after = d
            .previous_sibling
            .as_ref()
            .and_then(|s| stable_class(&s.classes).map(|c| (s.tag.as_str(), c)));
        let before = d
            .next_sibling
            .as_ref()
            .and_then(|s| stable_class(&s.classes).map(|c| (s.tag.as_str(), c)));

        if let Some((tag, class)) = after {
            let expression = format!("//{}[{}]/following-sibling::{}[1]", tag, class_token(&class), d.tag);
            let count = cx.match_count(&expression);
            if count > 0 {
                out.push(CandidatePath::new(
                    expression,
                    name,
                    format!("after {}.{}", tag, class),
                    0.72,
                    count,
                ));
            }
        }
        if let Some((tag, class)) = before {
            let expression = format!("//{}[{}]/preceding-sibling::{}[1]", tag, class_token(&class), d.tag);
            let count = cx.match_count(&expression);
            if (1..=5).contains(&count) {
                out.push(CandidatePath::new(
                    expression,
                    name,
                    format!("before {}.{}", tag, class),
                    0.70,
                    count,
                ));
            }
        }
        Ok(out)
    }
}
