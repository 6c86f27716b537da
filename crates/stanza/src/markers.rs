//! Block row marker scanning and extraction.
//!
//! A block row is a region of template content delimited by a pair of HTML
//! comment markers carrying the same name:
//!
//! ```text
//! <ul>
//! <!-- BEGIN item -->  <li>{label}</li>
//! <!-- END item -->
//! </ul>
//! ```
//!
//! Marker names are any run of non-whitespace characters and are matched
//! exactly and case-sensitively. A name must also be a valid placeholder
//! identifier (`item_row`, not `item-row`), since extraction refers to the
//! block through `{name}`.
//!
//! Extraction lifts the region out of the content and leaves a `{name}`
//! placeholder in its place, so the owning template's ordinary substitution
//! re-inserts whatever the block later renders to.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, TemplateError};
use crate::scanner::is_identifier;

static BEGIN_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!-- BEGIN (\S+) -->").expect("begin marker pattern is valid"));

static END_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!-- END (\S+) -->").expect("end marker pattern is valid"));

/// The opening marker for a block named `name`.
pub fn begin_marker(name: &str) -> String {
    format!("<!-- BEGIN {name} -->")
}

/// The closing marker for a block named `name`.
pub fn end_marker(name: &str) -> String {
    format!("<!-- END {name} -->")
}

/// Lists the block names declared in `text`, in extraction order.
///
/// Names come back distinct and in reverse order of their first BEGIN
/// marker's appearance, reading from the end of the text: the last BEGIN
/// found is listed first.
///
/// # Errors
///
/// - [`TemplateError::InvalidNesting`] if any name appears only in BEGIN
///   markers or only in END markers. The error lists every such name.
/// - [`TemplateError::InvalidBlockName`] if a paired name is not a valid
///   placeholder identifier
pub fn block_names(text: &str) -> Result<Vec<String>> {
    let begins: Vec<&str> = capture_names(&BEGIN_MARKER, text);
    let ends: Vec<&str> = capture_names(&END_MARKER, text);

    let begin_set: HashSet<&str> = begins.iter().copied().collect();
    let end_set: HashSet<&str> = ends.iter().copied().collect();

    let mut orphans: Vec<String> = Vec::new();
    for name in begins.iter().filter(|n| !end_set.contains(*n)) {
        push_unique(&mut orphans, name);
    }
    for name in ends.iter().filter(|n| !begin_set.contains(*n)) {
        push_unique(&mut orphans, name);
    }
    if !orphans.is_empty() {
        return Err(TemplateError::InvalidNesting { names: orphans });
    }

    let mut names: Vec<String> = Vec::with_capacity(begins.len());
    for name in begins.iter().rev() {
        check_name(name)?;
        push_unique(&mut names, name);
    }
    Ok(names)
}

fn capture_names<'t>(pattern: &Regex, text: &'t str) -> Vec<&'t str> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

fn check_name(name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(TemplateError::InvalidBlockName {
            name: name.to_string(),
        })
    }
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

/// Result of lifting one block region out of a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRegion {
    /// The captured region. Whitespace inside the region is kept verbatim.
    pub inner: String,
    /// The source text with the region replaced by `{name}`.
    pub rewritten: String,
}

/// Lifts the block named `name` out of `text`.
///
/// The region runs from the first `BEGIN name` marker to the first `END name`
/// marker after it. When `remove_markers` is true the two marker strings are
/// stripped from the captured text; otherwise the capture includes them.
///
/// Every further region with the same name is also replaced by `{name}`; only
/// the first one is captured.
///
/// # Errors
///
/// - [`TemplateError::InvalidBlockName`] if `name` is not a valid placeholder
///   identifier
/// - [`TemplateError::BlockRegionNotFound`] if no BEGIN/END span exists
pub fn extract_region(text: &str, name: &str, remove_markers: bool) -> Result<BlockRegion> {
    check_name(name)?;
    let begin = begin_marker(name);
    let end = end_marker(name);
    let placeholder = format!("{{{name}}}");

    let mut captured: Option<&str> = None;
    let mut rewritten = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(&begin) {
        let body = start + begin.len();
        let Some(offset) = rest[body..].find(&end) else {
            break;
        };
        let stop = body + offset + end.len();

        captured.get_or_insert(&rest[start..stop]);
        rewritten.push_str(&rest[..start]);
        rewritten.push_str(&placeholder);
        rest = &rest[stop..];
    }

    let Some(region) = captured else {
        return Err(TemplateError::BlockRegionNotFound {
            name: name.to_string(),
        });
    };
    rewritten.push_str(rest);

    let inner = if remove_markers {
        region.replace(&begin, "").replace(&end, "")
    } else {
        region.to_string()
    };

    Ok(BlockRegion { inner, rewritten })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        assert_eq!(begin_marker("row"), "<!-- BEGIN row -->");
        assert_eq!(end_marker("row"), "<!-- END row -->");
    }

    #[test]
    fn test_names_in_reverse_order() {
        let text = "<!-- BEGIN a -->1<!-- END a --><!-- BEGIN b -->2<!-- END b -->\
                    <!-- BEGIN c -->3<!-- END c -->";
        assert_eq!(block_names(text).unwrap(), ["c", "b", "a"]);
    }

    #[test]
    fn test_names_are_distinct() {
        let text = "<!-- BEGIN a -->1<!-- END a --><!-- BEGIN b -->2<!-- END b -->\
                    <!-- BEGIN a -->3<!-- END a -->";
        assert_eq!(block_names(text).unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_no_blocks() {
        assert!(block_names("plain {text}").unwrap().is_empty());
    }

    #[test]
    fn test_orphan_begin() {
        let err = block_names("<!-- BEGIN x --> body").unwrap_err();
        match err {
            TemplateError::InvalidNesting { names } => assert_eq!(names, ["x"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_orphans_reported_together() {
        let text = "<!-- BEGIN x -->a<!-- END y --><!-- BEGIN z -->b<!-- END z -->";
        let err = block_names(text).unwrap_err();
        match err {
            TemplateError::InvalidNesting { names } => assert_eq!(names, ["x", "y"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_markers_are_case_sensitive() {
        let text = "<!-- BEGIN Row -->a<!-- END row -->";
        assert!(matches!(
            block_names(text),
            Err(TemplateError::InvalidNesting { .. })
        ));
    }

    #[test]
    fn test_extract_removes_markers() {
        let text = "head\n<!-- BEGIN row -->\n  <li>{v}</li>\n<!-- END row -->\ntail";
        let region = extract_region(text, "row", true).unwrap();
        assert_eq!(region.inner, "\n  <li>{v}</li>\n");
        assert_eq!(region.rewritten, "head\n{row}\ntail");
    }

    #[test]
    fn test_extract_keeps_markers() {
        let text = "a<!-- BEGIN row -->x<!-- END row -->b";
        let region = extract_region(text, "row", false).unwrap();
        assert_eq!(region.inner, "<!-- BEGIN row -->x<!-- END row -->");
        assert_eq!(region.rewritten, "a{row}b");
    }

    #[test]
    fn test_extract_shortest_span() {
        let text = "<!-- BEGIN r -->1<!-- END r -->mid<!-- BEGIN r -->2<!-- END r -->";
        let region = extract_region(text, "r", true).unwrap();
        assert_eq!(region.inner, "1");
        assert_eq!(region.rewritten, "{r}mid{r}");
    }

    #[test]
    fn test_extract_leaves_other_blocks() {
        let text = "<!-- BEGIN a -->A<!-- END a --><!-- BEGIN b -->B<!-- END b -->";
        let region = extract_region(text, "b", true).unwrap();
        assert_eq!(region.inner, "B");
        assert_eq!(region.rewritten, "<!-- BEGIN a -->A<!-- END a -->{b}");
    }

    #[test]
    fn test_extract_missing() {
        let err = extract_region("nothing here", "row", true).unwrap_err();
        assert!(matches!(err, TemplateError::BlockRegionNotFound { name } if name == "row"));
    }

    #[test]
    fn test_extract_end_before_begin() {
        let text = "<!-- END row -->x<!-- BEGIN row -->";
        assert!(matches!(
            extract_region(text, "row", true),
            Err(TemplateError::BlockRegionNotFound { .. })
        ));
    }

    #[test]
    fn test_extract_rejects_non_identifier_name() {
        let text = "<!-- BEGIN a.b* -->x<!-- END a.b* -->";
        let err = extract_region(text, "a.b*", true).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidBlockName { name } if name == "a.b*"));
    }

    #[test]
    fn test_names_reject_hyphenated_block() {
        let text = "<ul><!-- BEGIN item-row --><li>{v}</li><!-- END item-row --></ul>";
        let err = block_names(text).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidBlockName { name } if name == "item-row"));
    }

    #[test]
    fn test_orphans_win_over_bad_names() {
        let text = "<!-- BEGIN item-row -->x";
        assert!(matches!(
            block_names(text),
            Err(TemplateError::InvalidNesting { .. })
        ));
    }
}
