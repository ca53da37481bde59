//! Error taxonomy for the configuration language.
//!
//! # Design Decisions
//! - One constructor per error class (unexpected, unrecognized, invalid)
//! - Positions are captured when the token is read, not when the error is built
//! - I/O failures carry no position and are passed through unchanged

use std::fmt;
use thiserror::Error;

/// 1-based line and column of the first character of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Failure to unescape a literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnescapeError {
    #[error("quoted string literal not terminated")]
    Unterminated,

    #[error("{0} is not a recognized escape sequence")]
    UnrecognizedEscape(String),

    #[error("escape sequence incomplete")]
    IncompleteEscape,
}

/// Error produced while parsing a configuration source.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A specific token or token class was required.
    #[error("{position}: unexpected {found}, {expected} was expected")]
    UnexpectedToken {
        position: Position,
        found: String,
        expected: String,
    },

    /// A field name or endpoint type that the grammar does not know.
    #[error("{position}: {found} is not a recognized {context}")]
    Unrecognized {
        position: Position,
        found: String,
        context: String,
    },

    /// A syntactically valid value that fails semantic checks.
    #[error("{position}: invalid {context}: {reason}")]
    Invalid {
        position: Position,
        context: String,
        reason: String,
    },

    /// Bad quoting or escaping inside a literal.
    #[error("{position}: {source}")]
    Lexical {
        position: Position,
        source: UnescapeError,
    },

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    pub fn unexpected(position: Position, found: impl Into<String>, expected: impl Into<String>) -> Self {
        ParseError::UnexpectedToken {
            position,
            found: found.into(),
            expected: expected.into(),
        }
    }

    pub fn unrecognized(position: Position, found: impl Into<String>, context: impl Into<String>) -> Self {
        ParseError::Unrecognized {
            position,
            found: found.into(),
            context: context.into(),
        }
    }

    pub fn invalid(position: Position, context: impl Into<String>, reason: impl Into<String>) -> Self {
        ParseError::Invalid {
            position,
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub fn lexical(position: Position, source: UnescapeError) -> Self {
        ParseError::Lexical { position, source }
    }

    /// Source position of the offending token, if the error has one.
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::Unrecognized { position, .. }
            | ParseError::Invalid { position, .. }
            | ParseError::Lexical { position, .. } => Some(*position),
            ParseError::Io(_) => None,
        }
    }
}
