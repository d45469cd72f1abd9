//! Error types for the query operators and the lambda compiler.

use thiserror::Error;

use crate::evaluator::EvaluatorError;
use crate::parser::ParserError;

/// Errors surfaced by [`compile`](crate::compile) and every [`Sequence`](crate::Sequence)
/// operator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The lambda text is not `param => expr`, or the body does not parse.
    #[error("malformed expression: {0}")]
    MalformedExpression(String),

    /// The body referenced a name other than the declared parameter.
    #[error("unbound identifier: {0}")]
    UnboundIdentifier(String),

    /// A value was used where its type is not accepted.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// `remove_at` was given a position outside `[0, len)`.
    #[error("index {index} is out of range for a sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// An aggregate with no identity value was requested over zero elements.
    #[error("{0} of an empty sequence")]
    EmptySequence(&'static str),
}

impl From<ParserError> for Error {
    fn from(e: ParserError) -> Self {
        Error::MalformedExpression(e.to_string())
    }
}

impl From<EvaluatorError> for Error {
    fn from(e: EvaluatorError) -> Self {
        match e {
            EvaluatorError::ReferenceError(name) => Error::UnboundIdentifier(name),
            EvaluatorError::TypeError(msg) => Error::TypeMismatch(msg),
        }
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_errors_are_malformed() {
        let err: Error = ParserError::UnexpectedEnd.into();
        assert!(matches!(err, Error::MalformedExpression(_)));
    }

    #[test]
    fn test_evaluator_errors_map_by_kind() {
        let err: Error = EvaluatorError::ReferenceError("y".to_string()).into();
        assert_eq!(err, Error::UnboundIdentifier("y".to_string()));

        let err: Error = EvaluatorError::TypeError("bad".to_string()).into();
        assert_eq!(err, Error::TypeMismatch("bad".to_string()));
    }

    #[test]
    fn test_display() {
        let err = Error::IndexOutOfRange { index: 4, len: 3 };
        assert_eq!(err.to_string(), "index 4 is out of range for a sequence of length 3");
        assert_eq!(Error::EmptySequence("avg").to_string(), "avg of an empty sequence");
    }
}
