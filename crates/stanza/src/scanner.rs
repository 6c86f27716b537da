//! Placeholder scanning.
//!
//! A placeholder is an identifier wrapped in braces: `{name}`. Identifiers
//! start with an ASCII letter, an underscore or any character at or above
//! `U+007F`, followed by any number of ASCII letters, digits, underscores or
//! characters at or above `U+007F`.
//!
//! Pattern: `\{[A-Za-z_\x7f-\xff][A-Za-z0-9_\x7f-\xff]*\}`, read per byte of UTF-8.
//!
//! Anything else in braces (`{3rd}`, `{ name }`, `{a.b}`, `{}`) is inert
//! literal text: it is never reported, substituted or stripped.
//!
//! # Example
//!
//! ```rust
//! use stanza::scanner::{find_placeholders, template_var_definitions};
//!
//! let text = "{greeting}, {name}! {3rd} {name}";
//! let names: Vec<_> = find_placeholders(text).map(|p| p.name).collect();
//! assert_eq!(names, ["greeting", "name", "name"]);
//!
//! let defs = template_var_definitions(text);
//! assert_eq!(defs.get("name"), Some(2));
//! assert_eq!(defs.get("3rd"), None);
//! ```

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{CaptureMatches, Captures, Regex};

/// Identifier grammar shared by every placeholder operation.
///
/// Characters at or above `U+007F` are accepted anywhere, which keeps the
/// grammar byte-compatible: every byte of a multi-byte UTF-8 sequence is in
/// the `0x80..=0xFF` range.
pub const IDENTIFIER_PATTERN: &str =
    r"[A-Za-z_\x{7f}-\x{10FFFF}][A-Za-z0-9_\x{7f}-\x{10FFFF}]*";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\{{({IDENTIFIER_PATTERN})\}}"))
        .expect("placeholder pattern is a valid regex")
});

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\A{IDENTIFIER_PATTERN}\z")).expect("identifier pattern is a valid regex")
});

/// Returns true if `name` can appear between braces as a placeholder.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// A single `{identifier}` occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// The identifier between the braces.
    pub name: &'a str,
    /// Byte offset of the opening brace.
    pub start: usize,
    /// Byte offset one past the closing brace.
    pub end: usize,
}

/// Iterator over the placeholders of a string, left to right.
///
/// Created by [`find_placeholders`].
pub struct Placeholders<'a> {
    inner: CaptureMatches<'static, 'a>,
}

impl<'a> Iterator for Placeholders<'a> {
    type Item = Placeholder<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let caps = self.inner.next()?;
        let whole = caps.get(0)?;
        let name = caps.get(1)?;
        Some(Placeholder {
            name: name.as_str(),
            start: whole.start(),
            end: whole.end(),
        })
    }
}

/// Finds every placeholder in `text`.
///
/// Matches are non-overlapping and reported in order of appearance. The
/// iterator is lazy; calling this again restarts the scan.
pub fn find_placeholders(text: &str) -> Placeholders<'_> {
    Placeholders {
        inner: PLACEHOLDER.captures_iter(text),
    }
}

/// Returns true if `text` contains at least one placeholder.
pub fn has_placeholders(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}

/// Removes every placeholder from `text`, resolved or not.
pub fn strip_placeholders(text: &str) -> String {
    PLACEHOLDER.replace_all(text, "").into_owned()
}

/// Replaces every placeholder whose identifier is a key of `values`.
///
/// Unknown placeholders are left untouched. Inserted values are not scanned
/// again within the same pass. Returns `None` when nothing was replaced.
pub(crate) fn substitute(text: &str, values: &HashMap<String, String>) -> Option<String> {
    let mut replaced = 0usize;
    let out = PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| {
        match values.get(&caps[1]) {
            Some(value) => {
                replaced += 1;
                value.clone()
            }
            None => caps[0].to_string(),
        }
    });
    if replaced == 0 {
        None
    } else {
        Some(out.into_owned())
    }
}

/// Occurrence counts of each placeholder identifier, in first-seen order.
///
/// Created by [`template_var_definitions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarDefinitions {
    entries: Vec<(String, usize)>,
}

impl VarDefinitions {
    /// Number of occurrences of `name`, if it appears at all.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, count)| *count)
    }

    /// Identifiers in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// `(identifier, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), *c))
    }

    /// Number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Counts the placeholders in `text`, duplicates included.
pub fn template_var_definitions(text: &str) -> VarDefinitions {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut defs = VarDefinitions::default();
    for placeholder in find_placeholders(text) {
        match index.get(placeholder.name) {
            Some(&i) => defs.entries[i].1 += 1,
            None => {
                index.insert(placeholder.name, defs.entries.len());
                defs.entries.push((placeholder.name.to_string(), 1));
            }
        }
    }
    defs
}
