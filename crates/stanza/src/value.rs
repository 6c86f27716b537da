//! Child values and variable normalization.

use serde_json::Value;

use crate::error::{Result, TemplateError};
use crate::template::Template;

/// A flat mapping of variable name to value, as consumed by row expansion.
pub type Record = serde_json::Map<String, Value>;

/// A value attached to a template under a name.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    /// Text used as-is when substituted. It may still contain placeholders,
    /// which later substitution passes resolve against the parent.
    Literal(String),
    /// A nested template, rendered every time the parent renders.
    Node(Box<Template>),
}

impl Child {
    /// Returns the literal text, or `None` for a nested node.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Child::Literal(text) => Some(text),
            Child::Node(_) => None,
        }
    }

    /// Returns the nested node, or `None` for a literal.
    pub fn as_node(&self) -> Option<&Template> {
        match self {
            Child::Literal(_) => None,
            Child::Node(node) => Some(node),
        }
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Literal(text)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Literal(text.to_string())
    }
}

impl From<Template> for Child {
    fn from(node: Template) -> Self {
        Child::Node(Box::new(node))
    }
}

/// Converts a scalar variable value into template text.
///
/// - strings are used verbatim
/// - integers use their decimal text (`42`)
/// - floats use their shortest round-trip form, without a trailing `.0`
///   when integral (`19.99`, `1.0` becomes `1`)
/// - `true` becomes `1`, `false` becomes `0`
/// - `null` becomes the empty string
///
/// # Errors
///
/// [`TemplateError::InvalidVariableValue`] for arrays and objects.
pub fn normalize_scalar(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        }),
        Value::Bool(true) => Ok("1".to_string()),
        Value::Bool(false) => Ok("0".to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => Err(TemplateError::InvalidVariableValue {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Interprets a dynamic value as an ordered record set.
///
/// Accepts an array of objects, or an object whose values are all objects (its
/// keys are ignored and its order kept).
///
/// # Errors
///
/// - [`TemplateError::EmptyRecordSet`] if there are no records
/// - [`TemplateError::MalformedRecordSet`] for any other shape
pub fn records_from_value(value: &Value) -> Result<Vec<Record>> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        other => {
            return Err(TemplateError::MalformedRecordSet {
                reason: format!("expected a sequence of records, got {}", kind_of(other)),
            })
        }
    };

    if items.is_empty() {
        return Err(TemplateError::EmptyRecordSet);
    }

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) => Ok(record.clone()),
            other => Err(TemplateError::MalformedRecordSet {
                reason: format!("record {i} is {}, not a mapping", kind_of(other)),
            }),
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
