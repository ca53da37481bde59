//! Grammar-aware cursor over the token stream.
//!
//! # Responsibilities
//! - Offer typed read primitives (exact token, literal, name, string, separator)
//! - Parse `{ ... }` blocks of named fields through a single combinator
//! - Remember the position of the last token for diagnostics

use std::io::BufRead;

use crate::lang::error::{ParseError, Position};
use crate::lang::lexer::Tokenizer;
use crate::lang::token::Token;

/// Field name token handed to a block handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: Token,
    pub position: Position,
}

impl Field {
    /// Error reporting this field as unknown in `context`.
    pub fn unrecognized(&self, context: &str) -> ParseError {
        ParseError::unrecognized(self.position, self.name.quoted(), context)
    }

    /// Field name with quotes and escapes resolved.
    pub fn unescaped(&self) -> Result<String, ParseError> {
        self.name
            .unescape()
            .map_err(|e| ParseError::lexical(self.position, e))
    }
}

pub struct Reader<R> {
    tokens: Tokenizer<R>,
    position: Position,
}

impl<R: BufRead> Reader<R> {
    pub fn new(source: R) -> Self {
        Self {
            tokens: Tokenizer::new(source),
            position: Position::default(),
        }
    }

    /// Position of the most recently read token.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Reads the next token. Past the end of input this keeps returning EOF.
    pub fn read_next(&mut self) -> Result<Token, ParseError> {
        let (token, position) = self.tokens.next_token()?;
        self.position = position;
        Ok(token)
    }

    /// Reads the next token and checks that it equals `expected`.
    ///
    /// An empty `expected` means EOF.
    pub fn expect_exact(&mut self, expected: &str) -> Result<(), ParseError> {
        let token = self.read_next()?;
        if token != expected {
            return Err(self.unexpected(&token, Token::from(expected).quoted()));
        }
        Ok(())
    }

    /// Reads the next token and checks that it is a literal.
    pub fn read_literal(&mut self) -> Result<Token, ParseError> {
        let token = self.read_next()?;
        if !token.is_literal() {
            return Err(self.unexpected(&token, "a value"));
        }
        Ok(token)
    }

    /// Reads a literal made of letters, digits and underscores.
    pub fn read_name(&mut self) -> Result<Token, ParseError> {
        let token = self.read_next()?;
        if !token.is_name() {
            return Err(self.unexpected(&token, "a name"));
        }
        Ok(token)
    }

    pub fn read_separator(&mut self) -> Result<(), ParseError> {
        self.expect_exact(":")
    }

    /// Reads a literal and unescapes it.
    pub fn read_string(&mut self) -> Result<String, ParseError> {
        let token = self.read_literal()?;
        token
            .unescape()
            .map_err(|e| ParseError::lexical(self.position, e))
    }

    /// Reads `: value` and returns the unescaped value.
    pub fn read_property(&mut self) -> Result<String, ParseError> {
        self.read_separator()?;
        self.read_string()
    }

    /// Reads a `{ ... }` block, passing each field name to `parse_field`.
    ///
    /// ```text
    /// {
    ///   field_a [rest consumed by parse_field]
    ///   field_b [...]
    /// }
    /// ```
    pub fn read_block<F>(&mut self, mut parse_field: F) -> Result<(), ParseError>
    where
        F: FnMut(&mut Self, Field) -> Result<(), ParseError>,
    {
        self.expect_exact("{")?;
        loop {
            let token = self.read_next()?;
            if token == "}" {
                return Ok(());
            }
            if !token.is_literal() {
                return Err(self.unexpected(&token, "property name or '}'"));
            }
            let field = Field {
                name: token,
                position: self.position,
            };
            parse_field(self, field)?;
        }
    }

    fn unexpected(&self, token: &Token, expected: impl Into<String>) -> ParseError {
        ParseError::unexpected(self.position, token.quoted(), expected)
    }
}
