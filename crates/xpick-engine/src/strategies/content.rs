//! Text, form and link/image strategies

use super::{Strategy, StrategyContext, StrategyResult};
use crate::candidate::CandidatePath;
use crate::expr::{attr_contains, attr_eq, text_contains, text_starts_with};
use crate::query::NodeQuery;

const FORM_TAGS: &[&str] = &["input", "textarea", "select", "button"];

/// Visible text: `Label:` prefixes, else a keyword
pub struct TextContent;

impl<D: NodeQuery> Strategy<D> for TextContent {
    fn name(&self) -> &'static str {
        "text-content"
    }

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult {
        let d = cx.descriptor;
        let text = d.text.as_str();
        let len = text.chars().count();
        if !(3..=50).contains(&len) || cx.has_dynamic_content(text) {
            return Ok(Vec::new());
        }
        let name = Strategy::<D>::name(self);

        if let Some((label, prefix)) = split_label(text) {
            let label_len = label.chars().count();
            if (2..=10).contains(&label_len) && !cx.is_dynamic(label) {
                let expression = format!("//{}[{}]", d.tag, text_starts_with(prefix));
                let count = cx.match_count(&expression);
                if count > 0 {
                    let confidence = if count == 1 { 0.55 } else { 0.50 };
                    return Ok(vec![CandidatePath::new(
                        expression,
                        name,
                        format!("text label \"{}\"", prefix),
                        confidence,
                        count,
                    )]);
                }
            }
        }

        let keyword = text
            .split_whitespace()
            .filter(|w| w.chars().count() >= 3 && !cx.is_dynamic(w))
            .max_by_key(|w| w.chars().count());
        let Some(keyword) = keyword else {
            return Ok(Vec::new());
        };
        let expression = format!("//{}[{}]", d.tag, text_contains(keyword));
        let count = cx.match_count(&expression);
        if count == 0 {
            return Ok(Vec::new());
        }
        Ok(vec![CandidatePath::new(
            expression,
            name,
            format!("text contains \"{}\"", keyword),
            0.25,
            count,
        )])
    }
}

/// Label and the literal text prefix up to and including its separator
fn split_label(text: &str) -> Option<(&str, &str)> {
    let (at, sep) = text.char_indices().find(|(_, c)| *c == ':' || *c == '：')?;
    Some((text[..at].trim(), &text[..at + sep.len_utf8()]))
}

/// Form controls by name, placeholder and type
pub struct FormField;

impl<D: NodeQuery> Strategy<D> for FormField {
    fn name(&self) -> &'static str {
        "form-field"
    }

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult {
        let d = cx.descriptor;
        if !FORM_TAGS.contains(&d.tag.as_str()) {
            return Ok(Vec::new());
        }
        let field_name = d.attribute("name").filter(|v| !cx.is_dynamic(v));
        let placeholder = d
            .attribute("placeholder")
            .filter(|v| v.chars().count() <= 30 && !cx.is_dynamic(v));
        let field_type = d.attribute("type").filter(|v| !cx.is_dynamic(v));

        let mut proposals = Vec::new();
        if let Some(value) = field_name {
            proposals.push((attr_eq("name", value), format!("field name \"{}\"", value), 0.90));
        }
        if let Some(value) = placeholder {
            proposals.push((attr_eq("placeholder", value), format!("placeholder \"{}\"", value), 0.85));
        }
        if let (Some(t), Some(n)) = (field_type, field_name) {
            proposals.push((
                format!("{} and {}", attr_eq("type", t), attr_eq("name", n)),
                format!("{} field \"{}\"", t, n),
                0.88,
            ));
        }

        let name = Strategy::<D>::name(self);
        let mut out = Vec::new();
        for (predicate, description, confidence) in proposals {
            let expression = format!("//{}[{}]", d.tag, predicate);
            let count = cx.match_count(&expression);
            if count > 0 {
                out.push(CandidatePath::new(expression, name, description, confidence, count));
            }
        }
        Ok(out)
    }
}

/// Links by href, images by alt and source filename
pub struct LinkImage;

impl<D: NodeQuery> Strategy<D> for LinkImage {
    fn name(&self) -> &'static str {
        "link-image"
    }

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult {
        let d = cx.descriptor;
        let mut proposals = Vec::new();
        match d.tag.as_str() {
            "a" => {
                if let Some(href) = d.attribute("href").filter(|h| !h.is_empty() && !cx.is_dynamic(h)) {
                    proposals.push((attr_eq("href", href), format!("href \"{}\"", href), 0.87));
                    if let Some(segment) = last_path_segment(href)
                        .filter(|s| s.chars().count() <= 20 && s != &href && !cx.is_dynamic(s))
                    {
                        proposals.push((
                            attr_contains("href", segment),
                            format!("href ends in \"{}\"", segment),
                            0.75,
                        ));
                    }
                }
            }
            "img" => {
                if let Some(alt) = d
                    .attribute("alt")
                    .filter(|a| a.chars().count() <= 50 && !cx.is_dynamic(a))
                {
                    proposals.push((attr_eq("alt", alt), format!("alt \"{}\"", alt), 0.86));
                }
                if let Some(file) = d
                    .attribute("src")
                    .and_then(last_path_segment)
                    .filter(|f| f.chars().count() <= 10 && !cx.is_dynamic(f))
                {
                    proposals.push((attr_contains("src", file), format!("image \"{}\"", file), 0.70));
                }
            }
            _ => return Ok(Vec::new()),
        }

        let name = Strategy::<D>::name(self);
        let mut out = Vec::new();
        for (predicate, description, confidence) in proposals {
            let expression = format!("//{}[{}]", d.tag, predicate);
            let count = cx.match_count(&expression);
            if count > 0 {
                out.push(CandidatePath::new(expression, name, description, confidence, count));
            }
        }
        Ok(out)
    }
}

/// Final path segment of a URL, without query or fragment
fn last_path_segment(url: &str) -> Option<&str> {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    url[..end]
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{expressions, run_on};

    #[test]
    fn test_label_prefix() {
        let html = r#"<p id="t">Author: <b>Jane</b></p><p>Updated: today</p>"#;
        let c = run_on(TextContent, html, "t");
        assert_eq!(expressions(&c), vec![r#"//p[starts-with(normalize-space(.), "Author:")]"#]);
        assert_eq!(c[0].confidence, 0.55);
    }

    #[test]
    fn test_spaced_label() {
        let html = r#"<p id="t">Author : <b>Jane</b></p><p>Editor : Sam</p>"#;
        let c = run_on(TextContent, html, "t");
        assert_eq!(expressions(&c), vec![r#"//p[starts-with(normalize-space(.), "Author :")]"#]);
        assert_eq!(c[0].confidence, 0.55);
    }

    #[test]
    fn test_split_label() {
        assert_eq!(split_label("Author : Jane"), Some(("Author", "Author :")));
        assert_eq!(split_label("作者：张三"), Some(("作者", "作者：")));
        assert_eq!(split_label("no label"), None);
    }

    #[test]
    fn test_shared_label() {
        let html = r#"<span id="t">Status: open</span><span>Status: closed</span>"#;
        let c = run_on(TextContent, html, "t");
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].match_count, 2);
        assert_eq!(c[0].confidence, 0.50);
    }

    #[test]
    fn test_keyword() {
        let html = r#"<button id="t">Load more stories</button>"#;
        let c = run_on(TextContent, html, "t");
        assert_eq!(expressions(&c), vec![r#"//button[contains(normalize-space(.), "stories")]"#]);
        assert_eq!(c[0].confidence, 0.25);
    }

    #[test]
    fn test_text_rejected() {
        assert!(run_on(TextContent, r#"<p id="t">ok</p>"#, "t").is_empty());
        assert!(run_on(TextContent, r#"<p id="t">Posted 3 hours ago</p>"#, "t").is_empty());
        let long = format!(r#"<p id="t">{}</p>"#, "lorem ipsum ".repeat(10));
        assert!(run_on(TextContent, &long, "t").is_empty());
    }

    #[test]
    fn test_form_field() {
        let html = r#"<input id="t" type="email" name="email" placeholder="you@example.com">"#;
        let c = run_on(FormField, html, "t");
        assert_eq!(
            expressions(&c),
            vec![
                r#"//input[@name="email"]"#,
                r#"//input[@placeholder="you@example.com"]"#,
                r#"//input[@type="email" and @name="email"]"#,
            ]
        );
        assert_eq!(c[0].confidence, 0.90);
        assert_eq!(c[1].confidence, 0.85);
        assert_eq!(c[2].confidence, 0.88);

        assert!(run_on(FormField, r#"<div id="t" name="x"></div>"#, "t").is_empty());
    }

    #[test]
    fn test_link() {
        let html = r#"<a id="t" href="/book/42/chapter-3.html?ref=nav">Next</a>"#;
        let c = run_on(LinkImage, html, "t");
        assert_eq!(
            expressions(&c),
            vec![
                r#"//a[@href="/book/42/chapter-3.html?ref=nav"]"#,
                r#"//a[contains(@href, "chapter-3.html")]"#,
            ]
        );
    }

    #[test]
    fn test_image() {
        let html = r#"<img id="t" src="/img/logo.png" alt="Company logo">
                      <img src="/static/hero.3f9a2c1b.jpg">"#;
        let c = run_on(LinkImage, html, "t");
        assert_eq!(
            expressions(&c),
            vec![r#"//img[@alt="Company logo"]"#, r#"//img[contains(@src, "logo.png")]"#]
        );
        assert_eq!(c[0].confidence, 0.86);
        assert_eq!(c[1].confidence, 0.70);
    }

    #[test]
    fn test_last_path_segment() {
        assert_eq!(last_path_segment("/a/b/c.html#top"), Some("c.html"));
        assert_eq!(last_path_segment("https://x.org/docs/"), Some("docs"));
        assert_eq!(last_path_segment("/"), None);
    }
}
