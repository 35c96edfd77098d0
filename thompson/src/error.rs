#[cfg(test)]
use serde::Serialize;
use thiserror::Error;

/// Problems found in the infix expression itself, positions are char indexes
/// into the expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(test, derive(Serialize))]
pub enum SyntaxError {
    #[error("unbalanced parentheses at position {position}")]
    UnbalancedParentheses { position: usize },
    #[error("unsupported character '{ch}' at position {position}")]
    UnsupportedCharacter { ch: char, position: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(test, derive(Serialize))]
pub enum RegexError {
    #[error("malformed expression: {0}")]
    MalformedExpression(#[from] SyntaxError),
    #[error("malformed postfix: expected exactly one fragment, got {fragments}")]
    MalformedPostfix { fragments: usize },
    /// `position` is the index of the operator in the postfix stream.
    #[error(
        "stack underflow: '{operator}' at position {position} needs {required} operand(s), found {available}"
    )]
    StackUnderflow {
        operator: char,
        position: usize,
        required: usize,
        available: usize,
    },
}

impl RegexError {
    pub(crate) fn unbalanced(position: usize) -> Self {
        RegexError::MalformedExpression(SyntaxError::UnbalancedParentheses { position })
    }

    pub(crate) fn unsupported(ch: char, position: usize) -> Self {
        RegexError::MalformedExpression(SyntaxError::UnsupportedCharacter { ch, position })
    }
}
