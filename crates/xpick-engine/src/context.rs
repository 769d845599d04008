//! Structural context of a target element
//!
//! The analyzer reads the target once and summarizes everything the
//! strategies need: cleaned identity (id, classes), attributes, trimmed
//! text, parent and sibling position, and the nearest semantic container.

use serde::Serialize;

use crate::config::CompiledConfig;
use crate::query::NodeQuery;

/// Descriptor text is capped at this many characters
pub const MAX_TEXT_CHARS: usize = 200;

/// Filters tool-injected and transient-state tokens out of ids and classes
#[derive(Debug, Clone, Default)]
pub struct NoiseFilter {
    prefixes: Vec<String>,
    transient: Vec<String>,
}

impl NoiseFilter {
    pub fn new(prefixes: &[String], transient: &[String]) -> Self {
        Self {
            prefixes: prefixes.iter().map(|p| p.to_ascii_lowercase()).collect(),
            transient: transient.iter().map(|t| t.to_ascii_lowercase()).collect(),
        }
    }

    /// Whether a class token or id is noise
    pub fn is_noise(&self, token: &str) -> bool {
        let lower = token.to_ascii_lowercase();
        self.prefixes.iter().any(|p| lower.starts_with(p.as_str()))
            || self.transient.iter().any(|t| *t == lower)
    }

    /// Whether a value starts with one of the ignored prefixes
    pub fn has_ignored_prefix(&self, value: &str) -> bool {
        let lower = value.to_ascii_lowercase();
        self.prefixes.iter().any(|p| lower.starts_with(p.as_str()))
    }

    /// Whether an attribute belongs to the selection tool
    ///
    /// `xpath-foo` and `data-xpath-foo` both count.
    pub fn is_tool_attribute(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        let bare = lower.strip_prefix("data-").unwrap_or(&lower);
        self.prefixes
            .iter()
            .any(|p| lower.starts_with(p.as_str()) || bare.starts_with(p.as_str()))
    }

    /// The id as written, `None` if blank or noise
    ///
    /// Padding is kept: `@id="…"` compares against the raw attribute.
    pub fn filter_id(&self, id: &str) -> Option<String> {
        let trimmed = id.trim();
        if trimmed.is_empty() || self.is_noise(trimmed) {
            None
        } else {
            Some(id.to_string())
        }
    }

    /// Cleaned class tokens in source order
    pub fn filter_classes<'a>(&self, classes: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        classes
            .into_iter()
            .filter(|c| !self.is_noise(c))
            .map(String::from)
            .collect()
    }
}

/// Parent summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentDescriptor {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub is_body: bool,
}

/// Adjacent element sibling summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiblingDescriptor {
    pub tag: String,
    pub classes: Vec<String>,
}

/// Position among element siblings, injected wrappers excluded
///
/// Both indices are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SiblingInfo {
    pub total: usize,
    pub same_tag_total: usize,
    pub index: usize,
    pub same_tag_index: usize,
}

/// Nearest semantic container ancestor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerDescriptor {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// Levels above the target (1 = parent)
    pub depth: usize,
}

/// Everything the strategies know about a target
#[derive(Debug, Clone, Serialize)]
pub struct StructuralDescriptor<N> {
    #[serde(skip)]
    pub node: N,
    pub tag: String,
    pub raw_id: Option<String>,
    pub id: Option<String>,
    pub raw_classes: Vec<String>,
    pub classes: Vec<String>,
    /// Attributes in source order, tool-owned ones removed
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub parent: Option<ParentDescriptor>,
    pub siblings: SiblingInfo,
    pub previous_sibling: Option<SiblingDescriptor>,
    pub next_sibling: Option<SiblingDescriptor>,
    pub container: Option<ContainerDescriptor>,
}

impl<N> StructuralDescriptor<N> {
    /// Attribute value by (lowercase) name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Builds [`StructuralDescriptor`]s
pub struct ContextAnalyzer<'a> {
    config: &'a CompiledConfig,
}

impl<'a> ContextAnalyzer<'a> {
    pub fn new(config: &'a CompiledConfig) -> Self {
        Self { config }
    }

    /// Describe a target element; `None` if it is not an element
    pub fn analyze<D: NodeQuery>(&self, doc: &D, target: D::Node) -> Option<StructuralDescriptor<D::Node>> {
        let tag = doc.tag_name(target)?.to_string();
        let noise = &self.config.noise;

        let raw_id = doc.attribute(target, "id").map(String::from);
        let id = raw_id.as_deref().and_then(|id| noise.filter_id(id));
        let raw_classes: Vec<String> = doc
            .attribute(target, "class")
            .map(|c| c.split_whitespace().map(String::from).collect())
            .unwrap_or_default();
        let classes = noise.filter_classes(raw_classes.iter().map(String::as_str));

        let attributes = doc
            .attributes(target)
            .into_iter()
            .filter(|(name, _)| !noise.is_tool_attribute(name))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        let text = truncate_chars(&xpick_xpath::normalize_space(&doc.text_content(target)), MAX_TEXT_CHARS);

        let parent_node = doc.parent_element(target);
        let parent = parent_node.and_then(|p| {
            Some(ParentDescriptor {
                tag: doc.tag_name(p)?.to_string(),
                id: doc.attribute(p, "id").and_then(|id| noise.filter_id(id)),
                classes: self.element_classes(doc, p),
                is_body: doc.is_body(p),
            })
        });

        let siblings = self.meaningful_siblings(doc, target);
        let position = sibling_info(doc, target, &siblings);
        let slot = siblings.iter().position(|s| *s == target);
        let previous_sibling = slot
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| siblings.get(i))
            .and_then(|s| self.sibling_descriptor(doc, *s));
        let next_sibling = slot
            .and_then(|i| siblings.get(i + 1))
            .and_then(|s| self.sibling_descriptor(doc, *s));

        let container = self.find_container(doc, target);

        Some(StructuralDescriptor {
            node: target,
            tag,
            raw_id,
            id,
            raw_classes,
            classes,
            attributes,
            text,
            parent,
            siblings: position,
            previous_sibling,
            next_sibling,
            container,
        })
    }

    /// Element siblings of `node` (itself included), injected wrappers excluded
    pub fn meaningful_siblings<D: NodeQuery>(&self, doc: &D, node: D::Node) -> Vec<D::Node> {
        match doc.parent_element(node) {
            Some(parent) => doc
                .element_children(parent)
                .into_iter()
                .filter(|s| *s == node || !self.is_injected(doc, *s))
                .collect(),
            None => vec![node],
        }
    }

    /// Position of `node` among its meaningful siblings
    pub fn position<D: NodeQuery>(&self, doc: &D, node: D::Node) -> SiblingInfo {
        let siblings = self.meaningful_siblings(doc, node);
        sibling_info(doc, node, &siblings)
    }

    fn is_injected<D: NodeQuery>(&self, doc: &D, node: D::Node) -> bool {
        doc.attribute(node, "id")
            .is_some_and(|id| self.config.is_wrapper_id(id))
    }

    fn element_classes<D: NodeQuery>(&self, doc: &D, node: D::Node) -> Vec<String> {
        let raw = doc.attribute(node, "class").unwrap_or_default();
        self.config.noise.filter_classes(raw.split_whitespace())
    }

    fn sibling_descriptor<D: NodeQuery>(&self, doc: &D, node: D::Node) -> Option<SiblingDescriptor> {
        Some(SiblingDescriptor {
            tag: doc.tag_name(node)?.to_string(),
            classes: self.element_classes(doc, node),
        })
    }

    fn find_container<D: NodeQuery>(&self, doc: &D, target: D::Node) -> Option<ContainerDescriptor> {
        let mut current = doc.parent_element(target);
        let mut depth = 1;
        while let Some(node) = current {
            if depth > self.config.container_depth {
                break;
            }
            let tag = doc.tag_name(node)?;
            let classes = self.element_classes(doc, node);
            let semantic_tag = self.config.container_tags.iter().any(|t| t == tag);
            let semantic_class = classes.iter().any(|c| self.config.container_class.is_match(c));
            if semantic_tag || semantic_class {
                return Some(ContainerDescriptor {
                    tag: tag.to_string(),
                    id: doc.attribute(node, "id").and_then(|id| self.config.noise.filter_id(id)),
                    classes,
                    depth,
                });
            }
            current = doc.parent_element(node);
            depth += 1;
        }
        None
    }
}

fn sibling_info<D: NodeQuery>(doc: &D, node: D::Node, siblings: &[D::Node]) -> SiblingInfo {
    let tag = doc.tag_name(node);
    let same_tag: Vec<D::Node> = siblings
        .iter()
        .copied()
        .filter(|s| doc.tag_name(*s) == tag)
        .collect();
    SiblingInfo {
        total: siblings.len(),
        same_tag_total: same_tag.len(),
        index: siblings.iter().position(|s| *s == node).map_or(1, |i| i + 1),
        same_tag_index: same_tag.iter().position(|s| *s == node).map_or(1, |i| i + 1),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
