//! Stripping of omit regions.
//!
//! Templates can mark parts that should not show up in the published output:
//!
//! ```html
//! <!-- omit:code:start -->only rendered, not listed<!-- omit:code:end -->
//! <!-- omit:preview:start -->only listed, not rendered<!-- omit:preview:end -->
//! ```
//!
//! The raw template text is stripped with the `code` mark, the rendered HTML
//! with the `preview` mark. Leftover omit markers of other marks are removed
//! as well.

use std::sync::LazyLock;

use regex::Regex;

/// Mark stripped from the raw template source.
pub const CODE: &str = "code";

/// Mark stripped from the rendered preview.
pub const PREVIEW: &str = "preview";

static MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*?<!--\s?omit:.*?\s?-->").unwrap());

/// Remove all regions marked with `mark` and any remaining omit markers.
pub fn omit(mark: &str, input: &str) -> String {
    let pattern = format!(
        r"(?is)\s*?<!--\s?omit:{mark}:start\s?-->.*?<!--\s?omit:{mark}:end\s?-->",
        mark = regex::escape(mark)
    );

    let stripped = match Regex::new(&pattern) {
        Ok(regions) => regions.replace_all(input, "").into_owned(),
        Err(e) => {
            tracing::warn!("Invalid omit mark {:?}: {}", mark, e);
            input.to_string()
        }
    };

    MARKERS.replace_all(&stripped, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_marked_region() {
        let input = "A<!-- omit:code:start -->SECRET<!-- omit:code:end -->B";

        assert_eq!(omit(CODE, input), "AB");
    }

    #[test]
    fn stripping_is_idempotent() {
        let input = "A<!-- omit:code:start -->SECRET<!-- omit:code:end -->B";

        let once = omit(CODE, input);
        assert_eq!(omit(CODE, &once), once);
    }

    #[test]
    fn strips_multiline_regions_with_leading_whitespace() {
        let input = "<div>\n  <!-- omit:preview:start -->\n  <script>x()</script>\n  <!-- omit:preview:end -->\n</div>";

        assert_eq!(omit(PREVIEW, input), "<div>\n</div>");
    }

    #[test]
    fn keeps_regions_of_other_marks_but_drops_their_markers() {
        let input = "A<!-- omit:preview:start -->B<!-- omit:preview:end -->C";

        assert_eq!(omit(CODE, input), "ABC");
    }

    #[test]
    fn leaves_plain_comments_alone() {
        let input = "<!-- a comment --><p>x</p>";

        assert_eq!(omit(CODE, input), input);
    }
}
