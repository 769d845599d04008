//! Document - High-level document API

use crate::{DomTree, Node, NodeId};

/// HTML Document
#[derive(Debug, Clone)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl Document {
    /// Create a new document with an html/head/body skeleton
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        tree.append_child(tree.root(), html);
        tree.append_child(html, head);
        tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
        }
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        }
    }

    /// Locate the html/head/body elements after the tree was built externally
    pub fn finalize(&mut self) {
        self.html_element = self
            .tree
            .element_children(NodeId::ROOT)
            .find(|&id| self.tree.tag_name(id) == Some("html"))
            .unwrap_or(NodeId::NONE);

        self.head_element = NodeId::NONE;
        self.body_element = NodeId::NONE;
        if self.html_element.is_valid() {
            for child in self.tree.element_children(self.html_element) {
                match self.tree.tag_name(child) {
                    Some("head") if !self.head_element.is_valid() => self.head_element = child,
                    Some("body") if !self.body_element.is_valid() => self.body_element = child,
                    _ => {}
                }
            }
        }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get document title
    pub fn title(&self) -> String {
        // Find <title> in <head>
        if !self.head_element.is_valid() {
            return String::new();
        }

        self.tree
            .element_children(self.head_element)
            .find(|&id| self.tree.tag_name(id) == Some("title"))
            .map(|id| self.tree.text_content(id).trim().to_string())
            .unwrap_or_default()
    }

    /// Get <html> element
    pub fn document_element(&self) -> Option<NodeId> {
        self.html_element.to_option()
    }

    /// Get <head> element
    pub fn head(&self) -> Option<NodeId> {
        self.head_element.to_option()
    }

    /// Get <body> element
    pub fn body(&self) -> Option<NodeId> {
        self.body_element.to_option()
    }

    /// Get the first element carrying `id`, in document order
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(NodeId::ROOT)
            .find(|&node| self.tree.element(node).and_then(|e| e.id()) == Some(id))
    }

    /// All elements with the given tag name, in document order
    pub fn get_elements_by_tag_name<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.tree
            .descendants(NodeId::ROOT)
            .filter(move |&node| {
                self.tree
                    .get(node)
                    .and_then(Node::as_element)
                    .is_some_and(|e| e.name.eq_ignore_ascii_case(tag))
            })
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_skeleton() {
        let doc = Document::new("about:blank");
        assert!(doc.body().is_some());
        assert_eq!(doc.tree().tag_name(doc.body().unwrap_or(NodeId::NONE)), Some("body"));
        assert_eq!(doc.title(), "");
    }

    #[test]
    fn test_get_element_by_id() {
        let mut doc = Document::new("about:blank");
        let body = doc.body().unwrap_or(NodeId::NONE);
        let div = doc.tree_mut().create_element_with_attrs("div", &[("id", "main")]);
        doc.tree_mut().append_child(body, div);
        assert_eq!(doc.get_element_by_id("main"), Some(div));
        assert_eq!(doc.get_element_by_id("missing"), None);
        assert_eq!(doc.get_elements_by_tag_name("DIV").count(), 1);
    }

    #[test]
    fn test_finalize_locates_skeleton() {
        let mut doc = Document::empty("file:///x.html");
        let tree = doc.tree_mut();
        let html = tree.create_element("html");
        let body = tree.create_element("body");
        tree.append_child(NodeId::ROOT, html);
        tree.append_child(html, body);
        doc.finalize();
        assert_eq!(doc.document_element(), Some(html));
        assert_eq!(doc.body(), Some(body));
        assert_eq!(doc.head(), None);
    }
}
