//! Comprehensive tests for xpick-html
//!
//! Parsing edge cases and the shape of the resulting tree.

use xpick_html::{HtmlParser, ParseError};

#[test]
fn test_parse_minimal_html() {
    let doc = HtmlParser::new().parse("").expect("empty input still yields a body");
    assert!(doc.body().is_some());
    assert!(doc.head().is_some());
}

#[test]
fn test_parse_text_only() {
    let doc = HtmlParser::new().parse("Hello World").expect("parse");
    let body = doc.body().expect("body");
    assert_eq!(doc.tree().text_content(body), "Hello World");
}

#[test]
fn test_parse_void_elements() {
    let html = r#"<br><hr><img src="test.png"><input type="text">"#;
    let doc = HtmlParser::new().parse(html).expect("parse");
    let img = doc.get_elements_by_tag_name("img").next().expect("img");
    assert_eq!(doc.tree().children(img).count(), 0);
    assert_eq!(doc.tree().element(img).and_then(|e| e.get_attr("src")), Some("test.png"));
}

#[test]
fn test_parse_nested_structure() {
    let html = r#"
        <html>
            <head>
                <title>Test Page</title>
                <meta charset="utf-8">
            </head>
            <body>
                <div id="container">
                    <h1>Welcome</h1>
                    <p class="intro">This is a test.</p>
                    <ul>
                        <li>Item 1</li>
                        <li>Item 2</li>
                        <li>Item 3</li>
                    </ul>
                </div>
            </body>
        </html>
    "#;

    let doc = HtmlParser::new().parse(html).expect("parse");
    assert_eq!(doc.title(), "Test Page");
    let container = doc.get_element_by_id("container").expect("container");
    let ul = doc.get_elements_by_tag_name("ul").next().expect("ul");
    assert_eq!(doc.tree().element_children(ul).count(), 3);
    assert!(doc.tree().ancestors(ul).any(|a| a == container));
}

#[test]
fn test_parse_malformed_html() {
    let html = r#"
        <div>
            <p>Unclosed paragraph
            <span>Unclosed span
        </div>
        <p>Another paragraph without closing
    "#;

    let doc = HtmlParser::new().parse(html).expect("parse");
    assert_eq!(doc.get_elements_by_tag_name("p").count(), 2);
}

#[test]
fn test_parse_attributes_lowercased() {
    let html = r#"<DIV ID="main" Class="container primary" data-Value="123"></DIV>"#;
    let doc = HtmlParser::new().parse(html).expect("parse");
    let div = doc.get_element_by_id("main").expect("div");
    let elem = doc.tree().element(div).expect("element");
    assert_eq!(elem.name, "div");
    assert_eq!(elem.get_attr("data-value"), Some("123"));
    assert_eq!(elem.classes().collect::<Vec<_>>(), vec!["container", "primary"]);
}

#[test]
fn test_parse_preserves_comments() {
    let doc = HtmlParser::new().parse("<p>a<!-- note -->b</p>").expect("parse");
    let p = doc.get_elements_by_tag_name("p").next().expect("p");
    assert_eq!(doc.tree().children(p).count(), 3);
    assert_eq!(doc.tree().text_content(p), "ab");
}

#[test]
fn test_frameset_has_no_body() {
    let html = "<html><frameset><frame src=a.html></frameset></html>";
    let result = HtmlParser::new().parse(html);
    assert!(matches!(result, Err(ParseError::MissingBody)));
}

#[test]
fn test_parse_with_url() {
    let doc = HtmlParser::new()
        .parse_with_url("<p>x</p>", "https://example.com/book/1")
        .expect("parse");
    assert_eq!(doc.url(), "https://example.com/book/1");
}
