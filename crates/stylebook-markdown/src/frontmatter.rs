//! Frontmatter extraction and parsing.

use serde_json::{Map, Value};

/// Free-form attributes parsed from a frontmatter block.
pub type Attributes = Map<String, Value>;

/// Extract frontmatter from a source file.
///
/// Returns the parsed attributes and the remaining body after the frontmatter
/// block. The block opens with a line that is exactly `---` and ends at the
/// next such line. A file without a complete block (including one starting
/// with a thematic break) yields empty attributes and the untouched source.
pub fn extract_frontmatter(source: &str) -> Result<(Attributes, &str), FrontmatterError> {
    let Some((yaml_content, remaining)) = split_block(source.trim_start()) else {
        return Ok((Attributes::new(), source));
    };

    let yaml_content = yaml_content.trim();
    let attributes = if yaml_content.is_empty() {
        Attributes::new()
    } else {
        let value: Value = serde_yaml::from_str(yaml_content)
            .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

        match value {
            Value::Object(map) => map,
            Value::Null => Attributes::new(),
            _ => return Err(FrontmatterError::NotAMapping),
        }
    };

    Ok((attributes, remaining.trim_start()))
}

/// Split `source` into the frontmatter content and the body after the
/// closing delimiter.
fn split_block(source: &str) -> Option<(&str, &str)> {
    let (opening, rest) = source.split_once('\n')?;
    if !is_delimiter(opening) {
        return None;
    }

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if is_delimiter(line) {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),

    #[error("Frontmatter must be a mapping of attributes")]
    NotAMapping,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn extracts_valid_frontmatter() {
        let source = r#"---
title: Button
context:
  label: Click me
order: 1
---

# Button Component
"#;

        let (attributes, body) = extract_frontmatter(source).unwrap();

        assert_eq!(attributes["title"], json!("Button"));
        assert_eq!(attributes["context"], json!({ "label": "Click me" }));
        assert_eq!(attributes["order"], json!(1));
        assert!(body.starts_with("# Button Component"));
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter here.";

        let (attributes, body) = extract_frontmatter(source).unwrap();

        assert!(attributes.is_empty());
        assert_eq!(body, source);
    }

    #[test]
    fn handles_empty_frontmatter() {
        let (attributes, body) = extract_frontmatter("---\n---\nBody").unwrap();

        assert!(attributes.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn unclosed_block_is_body() {
        let source = "---\ntitle: Test\n# No closing";

        let (attributes, body) = extract_frontmatter(source).unwrap();

        assert!(attributes.is_empty());
        assert_eq!(body, source);
    }

    #[test]
    fn leading_thematic_break_is_body() {
        let source = "---\n\nA button for forms.\n";

        let (attributes, body) = extract_frontmatter(source).unwrap();

        assert!(attributes.is_empty());
        assert_eq!(body, source);
    }

    #[test]
    fn delimiters_must_be_whole_lines() {
        let source = "---\ntitle: Test\n----\n\n# Body";

        let (attributes, body) = extract_frontmatter(source).unwrap();
        assert!(attributes.is_empty());
        assert_eq!(body, source);

        let (attributes, body) =
            extract_frontmatter("---\r\ntitle: Test\r\n---\r\n# Body").unwrap();
        assert_eq!(attributes["title"], json!("Test"));
        assert_eq!(body, "# Body");
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let source = "---\ntitle: [invalid yaml\n---\n";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }

    #[test]
    fn errors_on_scalar_frontmatter() {
        let result = extract_frontmatter("---\njust a string\n---\n");

        assert!(matches!(result, Err(FrontmatterError::NotAMapping)));
    }
}
