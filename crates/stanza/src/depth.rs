//! Recursion depth bound for the substitution loop.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use crate::error::{Result, TemplateError};

/// Maximum number of substitution passes a render performs.
///
/// Always at least one. The default is 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecursionDepth(NonZeroUsize);

impl RecursionDepth {
    pub const DEFAULT: RecursionDepth = RecursionDepth(match NonZeroUsize::new(10) {
        Some(n) => n,
        None => unreachable!(),
    });

    /// Validates a depth.
    ///
    /// # Errors
    ///
    /// [`TemplateError::InvalidRecursionDepth`] for zero or negative values.
    pub fn new(depth: i64) -> Result<Self> {
        usize::try_from(depth)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(RecursionDepth)
            .ok_or_else(|| TemplateError::InvalidRecursionDepth {
                value: depth.to_string(),
            })
    }

    /// The number of passes.
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for RecursionDepth {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for RecursionDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecursionDepth {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self> {
        let depth: i64 = s
            .trim()
            .parse()
            .map_err(|_| TemplateError::InvalidRecursionDepth {
                value: s.to_string(),
            })?;
        Self::new(depth)
    }
}

impl TryFrom<i64> for RecursionDepth {
    type Error = TemplateError;

    fn try_from(depth: i64) -> Result<Self> {
        Self::new(depth)
    }
}
