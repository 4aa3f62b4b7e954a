//! Markdown document parser.

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

use crate::frontmatter::{extract_frontmatter, Attributes, FrontmatterError};

/// A parsed source document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Frontmatter attributes (empty if the file has none)
    pub attributes: Attributes,

    /// Body rendered to HTML
    pub content: String,

    /// Text of the first heading, used as a fallback title
    pub title: Option<String>,
}

/// Errors that can occur when parsing a document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

/// Parse a source file into attributes and rendered HTML.
pub fn parse_document(source: &str) -> Result<Document, ParseError> {
    let (attributes, body) = extract_frontmatter(source)?;
    let (content, title) = render_markdown(body);

    Ok(Document {
        attributes,
        content,
        title,
    })
}

/// Render a markdown body to HTML, picking up the first heading's text.
fn render_markdown(body: &str) -> (String, Option<String>) {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let mut title: Option<String> = None;
    let mut current_heading: Option<String> = None;
    let mut events = Vec::new();

    for event in Parser::new_ext(body, options) {
        match &event {
            Event::Start(Tag::Heading { .. }) if title.is_none() => {
                current_heading = Some(String::new());
            }

            Event::Text(text) | Event::Code(text) => {
                if let Some(heading_text) = current_heading.as_mut() {
                    heading_text.push_str(text);
                }
            }

            Event::End(TagEnd::Heading(_)) => {
                if let Some(text) = current_heading.take() {
                    title = Some(text).filter(|t| !t.trim().is_empty());
                }
            }

            _ => {}
        }

        events.push(event);
    }

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());

    (html_output, title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_complete_document() {
        let source = r#"---
title: Button
---

# Button

A clickable button.

## Variants

Different button styles.
"#;

        let doc = parse_document(source).unwrap();

        assert_eq!(doc.attributes["title"], json!("Button"));
        assert!(doc.content.contains("<h1>Button</h1>"));
        assert!(doc.content.contains("<p>A clickable button.</p>"));
        assert!(doc.content.contains("<h2>Variants</h2>"));
        assert_eq!(doc.title.as_deref(), Some("Button"));
    }

    #[test]
    fn title_comes_from_first_heading() {
        let doc = parse_document("Intro\n\n## `Awesome` Input\n\n# Later").unwrap();

        assert_eq!(doc.title.as_deref(), Some("Awesome Input"));
    }

    #[test]
    fn no_heading_means_no_title() {
        let doc = parse_document("Only a paragraph.").unwrap();

        assert!(doc.attributes.is_empty());
        assert_eq!(doc.title, None);
    }

    #[test]
    fn propagates_frontmatter_errors() {
        let result = parse_document("---\ntitle: [x\n---\n");

        assert!(matches!(
            result,
            Err(ParseError::Frontmatter(FrontmatterError::InvalidYaml(_)))
        ));
    }
}
