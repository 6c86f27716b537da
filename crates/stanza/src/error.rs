//! Error types for the stanza crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building, extracting or rendering templates.
///
/// Every error is reported at the point it is detected and aborts the
/// operation that raised it.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// BEGIN and END marker names do not pair up.
    #[error("invalidly nested block rows: {}", .names.join(", "))]
    InvalidNesting {
        /// Every name that appears only as a BEGIN or only as an END marker.
        names: Vec<String>,
    },

    /// A `BEGIN name ... END name` region could not be located in the content.
    #[error("could not find block region '{name}' in template content")]
    BlockRegionNotFound { name: String },

    /// A block name is not a valid placeholder identifier, so the `{name}`
    /// left by extraction could never be substituted.
    #[error("block row name '{name}' is not a valid placeholder identifier")]
    InvalidBlockName { name: String },

    /// A block row handle was requested that has not been extracted.
    #[error("block row '{handle}' does not exist")]
    BlockHandleNotFound { handle: String },

    /// A variable was given a value that is neither a scalar nor null.
    #[error("value for '{name}' was not appropriate: {value}")]
    InvalidVariableValue { name: String, value: String },

    /// A child template was attached without a name.
    #[error("template is missing a name")]
    MissingName,

    /// The recursion depth was zero, negative or not a number.
    #[error("recursion depth must be a positive integer, got '{value}'")]
    InvalidRecursionDepth { value: String },

    /// Row expansion was asked to render zero records.
    #[error("invalid or empty record set")]
    EmptyRecordSet,

    /// Row expansion input was not an ordered sequence of mappings.
    #[error("malformed record set: {reason}")]
    MalformedRecordSet { reason: String },

    /// A content source could not resolve the reference.
    #[error("template source does not exist ({reference})")]
    SourceNotFound { reference: String },

    /// Reading template content from disk failed.
    #[error("failed to read template '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_nesting_lists_every_name() {
        let err = TemplateError::InvalidNesting {
            names: vec!["rows".to_string(), "footer".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("rows"));
        assert!(msg.contains("footer"));
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error as _;

        let err = TemplateError::Io {
            path: PathBuf::from("/tmp/missing.tmpl"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("missing.tmpl"));
    }
}
