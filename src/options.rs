//! Limits applied while compiling lambdas.

use serde::{Deserialize, Serialize};

use crate::parser::DEFAULT_MAX_DEPTH;

/// Compile-time limits.
///
/// Deserializes from partial JSON: missing fields keep their defaults.
///
/// ```
/// use linq_core::CompileOptions;
///
/// let opts = CompileOptions::from_json_str(r#"{"max_depth": 8}"#).unwrap();
/// assert_eq!(opts.max_depth, 8);
/// assert_eq!(opts.max_source_len, CompileOptions::default().max_source_len);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Deepest syntax tree a lambda body may produce.
    pub max_depth: usize,
    /// Longest lambda source accepted, in characters.
    pub max_source_len: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            max_source_len: 4096,
        }
    }
}

impl CompileOptions {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = CompileOptions::default();
        assert_eq!(opts.max_depth, 64);
        assert_eq!(opts.max_source_len, 4096);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let opts = CompileOptions::from_json_str(r#"{"max_source_len": 100}"#).unwrap();
        assert_eq!(opts.max_source_len, 100);
        assert_eq!(opts.max_depth, 64);

        let opts = CompileOptions::from_json_str("{}").unwrap();
        assert_eq!(opts, CompileOptions::default());
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(CompileOptions::from_json_str(r#"{"max_depth": "deep"}"#).is_err());
    }
}
