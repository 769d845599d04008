//! xpick HTML Parser
//!
//! HTML5 parsing built on html5ever, producing an `xpick-dom` document.

mod parser;

pub use parser::HtmlParser;
pub use xpick_dom::Document;

/// Parse an HTML string into a document
pub fn parse(html: &str) -> Result<Document, ParseError> {
    HtmlParser::new().parse(html)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    #[error("document has no <body> element")]
    MissingBody,
}
