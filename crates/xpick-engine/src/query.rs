//! Document query seam
//!
//! The engine never walks a concrete DOM. Everything it needs from the host
//! document goes through [`NodeQuery`], so the same strategies run over the
//! bundled arena DOM or any other tree that can evaluate XPath.

use std::fmt::Debug;

use xpick_dom::{Document, NodeId};
use xpick_xpath::XPathError;

/// Query error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("cannot evaluate `{expression}`: {source}")]
    XPath {
        expression: String,
        #[source]
        source: XPathError,
    },

    #[error("cannot evaluate `{expression}`: {message}")]
    Host { expression: String, message: String },
}

/// Read-only view of a document the engine can inspect and query
pub trait NodeQuery {
    /// Node handle; cheap to copy and compare
    type Node: Copy + Eq + Debug;

    /// Lowercase tag name, `None` for non-element nodes
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    /// Attribute value by name
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// All attributes in source order
    fn attributes(&self, node: Self::Node) -> Vec<(&str, &str)>;

    /// Concatenated descendant text
    fn text_content(&self, node: Self::Node) -> String;

    /// Parent, if it is an element
    fn parent_element(&self, node: Self::Node) -> Option<Self::Node>;

    /// Element children in document order
    fn element_children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Evaluate an XPath expression against the whole document
    ///
    /// Results are in document order with duplicates removed.
    fn evaluate(&self, expression: &str) -> Result<Vec<Self::Node>, QueryError>;

    fn is_body(&self, node: Self::Node) -> bool {
        self.tag_name(node) == Some("body")
    }
}

impl NodeQuery for Document {
    type Node = NodeId;

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.tree().tag_name(node)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.tree().element(node)?.get_attr(name)
    }

    fn attributes(&self, node: NodeId) -> Vec<(&str, &str)> {
        match self.tree().element(node) {
            Some(element) => element
                .attrs
                .iter()
                .map(|attr| (attr.name.as_str(), attr.value.as_str()))
                .collect(),
            None => Vec::new(),
        }
    }

    fn text_content(&self, node: NodeId) -> String {
        self.tree().text_content(node)
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.tree().parent_element(node)
    }

    fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree().element_children(node).collect()
    }

    fn evaluate(&self, expression: &str) -> Result<Vec<NodeId>, QueryError> {
        xpick_xpath::evaluate(self, expression).map_err(|source| QueryError::XPath {
            expression: expression.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_query() {
        let doc = xpick_html::parse(
            r#"<div id="a" class="x y"><span>one</span><span>two</span></div>"#,
        )
        .expect("parse");
        let div = doc.get_element_by_id("a").expect("div");
        assert_eq!(NodeQuery::tag_name(&doc, div), Some("div"));
        assert_eq!(doc.attribute(div, "class"), Some("x y"));
        assert_eq!(doc.attributes(div), vec![("id", "a"), ("class", "x y")]);
        assert_eq!(NodeQuery::text_content(&doc, div), "onetwo");
        assert_eq!(doc.element_children(div).len(), 2);

        let body = NodeQuery::parent_element(&doc, div).expect("body");
        assert!(doc.is_body(body));
        assert_eq!(NodeQuery::evaluate(&doc, "//span").expect("eval").len(), 2);
    }

    #[test]
    fn test_bad_expression_reports_source() {
        let doc = xpick_html::parse("<p>x</p>").expect("parse");
        let err = NodeQuery::evaluate(&doc, "//p[").expect_err("invalid");
        assert!(matches!(err, QueryError::XPath { ref expression, .. } if expression == "//p["));
    }
}
