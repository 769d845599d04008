//! xpick XPath
//!
//! An XPath 1.0 subset evaluated directly over the arena DOM: location paths
//! with the common axes, predicates, comparisons, unions and the core string
//! and boolean functions. Enough to run every expression the selector engine
//! emits, and to test hand-written ones.
//!
//! # Example
//! ```rust,ignore
//! let doc = xpick_html::parse("<ul><li>a</li><li>b</li></ul>")?;
//! let second = xpick_xpath::evaluate(&doc, "//ul/li[2]")?;
//! assert_eq!(second.len(), 1);
//! ```

pub mod ast;
mod eval;
mod lexer;
mod parser;

use xpick_dom::{Document, NodeId};

pub use eval::normalize_space;

use eval::{Evaluator, Item};

/// XPath error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum XPathError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{found}' at offset {offset}")]
    UnexpectedChar { offset: usize, found: char },

    #[error("unterminated string literal starting at offset {offset}")]
    UnterminatedLiteral { offset: usize },

    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { offset: usize, text: String },

    #[error("unexpected token '{found}' at offset {offset}")]
    UnexpectedToken { offset: usize, found: String },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("unsupported axis '{0}'")]
    UnsupportedAxis(String),

    #[error("function {name}() expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: String,
        found: usize,
    },

    #[error("function {function} is missing argument {index}")]
    MissingArgument { function: String, index: usize },

    #[error("expression does not evaluate to a node-set")]
    NotANodeSet,

    #[error("expression selects attribute nodes, not elements")]
    AttributeResult,
}

/// A compiled XPath expression
#[derive(Debug, Clone, PartialEq)]
pub struct XPath {
    source: String,
    expr: ast::Expr,
}

impl XPath {
    /// Parse an expression
    pub fn compile(source: &str) -> Result<Self, XPathError> {
        let expr = parser::parse(source)?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    /// Expression text as compiled
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Syntax tree
    pub fn expr(&self) -> &ast::Expr {
        &self.expr
    }

    /// Evaluate against the whole document
    pub fn evaluate(&self, doc: &Document) -> Result<Vec<NodeId>, XPathError> {
        self.evaluate_from(doc, NodeId::ROOT)
    }

    /// Evaluate with `context` as the context node
    pub fn evaluate_from(&self, doc: &Document, context: NodeId) -> Result<Vec<NodeId>, XPathError> {
        let items = Evaluator::new(doc).select(&self.expr, context)?;
        let nodes = items
            .into_iter()
            .map(|item| match item {
                Item::Node(id) => Ok(id),
                Item::Attr(..) => Err(XPathError::AttributeResult),
            })
            .collect::<Result<Vec<_>, _>>()?;
        tracing::trace!("xpath {} -> {} node(s)", self.source, nodes.len());
        Ok(nodes)
    }
}

/// Compile and evaluate an expression against a document
pub fn evaluate(doc: &Document, expression: &str) -> Result<Vec<NodeId>, XPathError> {
    XPath::compile(expression)?.evaluate(doc)
}

/// Number of nodes an expression selects
pub fn count(doc: &Document, expression: &str) -> Result<usize, XPathError> {
    evaluate(doc, expression).map(|nodes| nodes.len())
}

/// Quote a value as an XPath string literal
///
/// Double quotes are preferred; values containing `"` fall back to single
/// quotes, and values containing both are assembled with `concat()`.
pub fn quote_literal(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{}\"", value)
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        let parts: Vec<String> = value.split('"').map(|part| format!("\"{}\"", part)).collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("plain"), r#""plain""#);
        assert_eq!(quote_literal(r#"say "hi""#), r#"'say "hi"'"#);
        assert_eq!(
            quote_literal(r#"it's "x""#),
            r#"concat("it's ", '"', "x", '"', "")"#
        );
    }

    #[test]
    fn test_compile_keeps_source() {
        let xpath = XPath::compile("//a").expect("compile");
        assert_eq!(xpath.source(), "//a");
        assert!(matches!(xpath.expr(), ast::Expr::Path(_)));
    }
}
