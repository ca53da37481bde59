//! Lexical tokens.

use std::fmt;

use crate::lang::error::UnescapeError;

/// Characters that always form a token of their own.
const STRUCTURAL: [char; 3] = ['{', '}', ':'];

/// Returns true for `{`, `}` and `:`.
pub fn is_structural_char(c: char) -> bool {
    STRUCTURAL.contains(&c)
}

/// Returns true for the characters that open a quoted literal.
pub fn is_quote_char(c: char) -> bool {
    c == '"' || c == '\''
}

/// Token classification derived from the token value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Structural,
    Literal,
}

/// A single lexeme. The empty token is EOF.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub const EOF: Token = Token(String::new());

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn kind(&self) -> TokenKind {
        let mut chars = self.0.chars();
        match (chars.next(), chars.next()) {
            (None, _) => TokenKind::Eof,
            (Some(c), None) if is_structural_char(c) => TokenKind::Structural,
            _ => TokenKind::Literal,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind() == TokenKind::Eof
    }

    pub fn is_structural(&self) -> bool {
        self.kind() == TokenKind::Structural
    }

    pub fn is_literal(&self) -> bool {
        self.kind() == TokenKind::Literal
    }

    /// Checks whether the token can be used as a name.
    ///
    /// A name is a literal of ASCII letters, digits and underscores.
    pub fn is_name(&self) -> bool {
        self.is_literal()
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Form used in diagnostics: `EOF` or the value in single quotes.
    pub fn quoted(&self) -> String {
        if self.is_eof() {
            "EOF".to_string()
        } else {
            format!("'{}'", self.0)
        }
    }

    /// Strips surrounding quotes and resolves escaped quote characters.
    ///
    /// Only the escaped form of the enclosing quote is allowed; any other
    /// backslash, including one in an unquoted literal, is rejected.
    pub fn unescape(&self) -> Result<String, UnescapeError> {
        let value = self.0.as_str();
        let quote = value.chars().next().filter(|c| is_quote_char(*c));

        let body = match quote {
            Some(q) => {
                let inner = &value[q.len_utf8()..];
                let Some(inner) = inner.strip_suffix(q) else {
                    return Err(UnescapeError::Unterminated);
                };
                let trailing = inner.chars().rev().take_while(|c| *c == '\\').count();
                if trailing % 2 == 1 {
                    return Err(UnescapeError::Unterminated);
                }
                inner
            }
            None => value,
        };

        let mut out = String::with_capacity(body.len());
        let mut chars = body.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some(next) if Some(next) == quote => out.push(next),
                Some(next) => return Err(UnescapeError::UnrecognizedEscape(format!("\\{next}"))),
                None => return Err(UnescapeError::IncompleteEscape),
            }
        }
        Ok(out)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<char> for Token {
    fn from(value: char) -> Self {
        Self(value.to_string())
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(Token::EOF.kind(), TokenKind::Eof);
        assert_eq!(Token::from("{").kind(), TokenKind::Structural);
        assert_eq!(Token::from(":").kind(), TokenKind::Structural);
        assert_eq!(Token::from("::").kind(), TokenKind::Literal);
        assert_eq!(Token::from("/path").kind(), TokenKind::Literal);
    }

    #[test]
    fn test_is_name() {
        let cases = [
            ("name", true),
            ("_camelCase_95", true),
            ("}", false),
            ("name\\:", false),
            ("with space", false),
            ("'quoted'", false),
            ("dash-ed", false),
            ("", false),
        ];
        for (value, want) in cases {
            assert_eq!(Token::from(value).is_name(), want, "is_name({value:?})");
        }
    }

    #[test]
    fn test_quoted() {
        assert_eq!(Token::EOF.quoted(), "EOF");
        assert_eq!(Token::from("files").quoted(), "'files'");
    }

    #[test]
    fn test_unescape_plain_and_quoted() {
        assert_eq!(Token::from("string").unescape().unwrap(), "string");
        assert_eq!(Token::from("'two words'").unescape().unwrap(), "two words");
        assert_eq!(Token::from("\"\"").unescape().unwrap(), "");
        assert_eq!(Token::from("\"it's\"").unescape().unwrap(), "it's");
    }

    #[test]
    fn test_unescape_quote_escapes() {
        assert_eq!(Token::from(r#""two\"words""#).unescape().unwrap(), "two\"words");
        assert_eq!(Token::from(r"'it\'s'").unescape().unwrap(), "it's");
        // only the enclosing quote may be escaped
        assert_eq!(
            Token::from(r#"'say \"hi\"'"#).unescape(),
            Err(UnescapeError::UnrecognizedEscape("\\\"".to_string()))
        );
    }

    #[test]
    fn test_unescape_errors() {
        assert_eq!(Token::from("'string").unescape(), Err(UnescapeError::Unterminated));
        assert_eq!(Token::from("\"").unescape(), Err(UnescapeError::Unterminated));
        assert_eq!(Token::from(r#""open\""#).unescape(), Err(UnescapeError::Unterminated));
        assert_eq!(
            Token::from(r"C:\path").unescape(),
            Err(UnescapeError::UnrecognizedEscape("\\p".to_string()))
        );
        assert_eq!(Token::from(r"trailing\").unescape(), Err(UnescapeError::IncompleteEscape));
    }
}
