//! Property-based tests for scanning and rendering using proptest.

use std::collections::HashMap;

use proptest::prelude::*;
use stanza::{template_var_definitions, Template};

// ============================================================================
// Strategies
// ============================================================================

fn identifier() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]{0,8}"
}

/// Plain text that cannot form or break a placeholder.
fn filler() -> impl Strategy<Value = String> {
    "[a-z0-9 .,;:!-]{0,12}"
}

/// Distinct identifiers with a use count each.
fn usage() -> impl Strategy<Value = HashMap<String, usize>> {
    prop::collection::hash_map(identifier(), 1usize..5, 0..6)
}

fn build_text(usage: &HashMap<String, usize>, filler: &[String]) -> String {
    let mut tokens: Vec<&str> = Vec::new();
    for (name, count) in usage {
        for _ in 0..*count {
            tokens.push(name);
        }
    }
    let mut text = String::new();
    for (i, name) in tokens.iter().enumerate() {
        text.push_str(filler.get(i).map(String::as_str).unwrap_or(" "));
        text.push('{');
        text.push_str(name);
        text.push('}');
    }
    text
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Every identifier is counted exactly as often as it is used.
    #[test]
    fn var_definitions_count_every_use(
        usage in usage(),
        filler in prop::collection::vec(filler(), 0..30),
    ) {
        let text = build_text(&usage, &filler);
        let defs = template_var_definitions(&text);

        prop_assert_eq!(defs.len(), usage.len());
        for (name, count) in &usage {
            prop_assert_eq!(defs.get(name), Some(*count));
        }
    }

    /// Identifiers starting with a digit are never reported.
    #[test]
    fn leading_digit_is_never_a_placeholder(
        digit in 0u8..10,
        rest in "[a-z0-9_]{0,8}",
    ) {
        let text = format!("{{{digit}{rest}}}");
        prop_assert!(template_var_definitions(&text).is_empty());
    }

    /// Once every placeholder has a value, stripping changes nothing.
    #[test]
    fn full_resolution_is_strip_independent(
        usage in usage(),
        filler in prop::collection::vec(filler(), 0..30),
        value in filler(),
    ) {
        let text = build_text(&usage, &filler);
        let mut t = Template::named("main").with_content(text);
        for name in usage.keys() {
            t.add_variable(name.as_str(), value.as_str(), true).unwrap();
        }
        prop_assert_eq!(t.render(true), t.render(false));
    }

    /// Unset placeholders survive a non-stripping render verbatim.
    #[test]
    fn unset_placeholders_are_preserved(
        usage in usage(),
        filler in prop::collection::vec(filler(), 0..30),
    ) {
        let text = build_text(&usage, &filler);
        let t = Template::named("main").with_content(text.clone());
        let out = t.render(false);

        prop_assert_eq!(&out, &text);
        for name in usage.keys() {
            let token = format!("{{{name}}}");
            prop_assert!(out.contains(&token));
        }
    }

    /// A self-referencing value expands exactly once per pass.
    #[test]
    fn self_reference_stops_at_depth(
        depth in 1i64..40,
        unit in "[a-z]{1,4}",
    ) {
        let mut t = Template::named("main").with_content("{a}");
        t.set_recursion_depth(depth).unwrap();
        t.add_variable("a", format!("{unit}{{a}}"), false).unwrap();

        prop_assert_eq!(t.render(true), unit.repeat(depth as usize));
    }

    /// Row expansion is plain concatenation of each record's render.
    #[test]
    fn rows_concatenate_in_order(
        values in prop::collection::vec("[a-z]{0,5}", 1..10),
    ) {
        let mut row = Template::named("row").with_content("<{v}>");
        let records: Vec<_> = values
            .iter()
            .map(|v| {
                let mut record = serde_json::Map::new();
                record.insert("v".to_string(), serde_json::Value::from(v.as_str()));
                record
            })
            .collect();

        let expected: String = values.iter().map(|v| format!("<{v}>")).collect();
        prop_assert_eq!(row.render_rows(&records).unwrap(), expected);
    }
}
