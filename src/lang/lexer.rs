//! Tokenizer for the configuration language.
//!
//! # Responsibilities
//! - Decode the byte stream as UTF-8 characters
//! - Split characters into literals, quoted literals and structural tokens
//! - Drop whitespace and `#` line comments
//! - Track the position of the first character of every token
//!
//! # Design Decisions
//! - Quoted literals are emitted with their quotes; unescaping happens later
//! - A newline inside a quote ends the token, unescaping rejects it
//! - After the input is exhausted every call returns EOF

use std::io::{self, BufRead};

use crate::lang::error::Position;
use crate::lang::token::{is_quote_char, is_structural_char, Token};

/// Lazy, forward-only token stream over a character source.
pub struct Tokenizer<R> {
    source: R,
    /// Literal being accumulated.
    literal: String,
    literal_start: Position,
    /// Line and column of the last character read.
    cursor: Position,
    /// Structural token held back while the literal before it is returned.
    pending: Option<(Token, Position)>,
    /// Previous character inside a quote was a backslash.
    escaped: bool,
}

impl<R: BufRead> Tokenizer<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            literal: String::new(),
            literal_start: Position::default(),
            cursor: Position::new(1, 0),
            pending: None,
            escaped: false,
        }
    }

    /// Reads the next token and the position of its first character.
    pub fn next_token(&mut self) -> io::Result<(Token, Position)> {
        if let Some(pending) = self.pending.take() {
            return Ok(pending);
        }

        loop {
            let Some(c) = self.read_char()? else {
                return Ok(self.finish());
            };

            if let Some(quote) = self.open_quote() {
                if c == '\n' {
                    let token = self.take_literal();
                    self.escaped = false;
                    self.cursor.line += 1;
                    self.cursor.column = 0;
                    return Ok(token);
                }
                self.literal.push(c);
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == quote {
                    return Ok(self.take_literal());
                }
                continue;
            }

            match c {
                c if is_quote_char(c) => {
                    let flushed = self.flush();
                    self.push_char(c);
                    if let Some(token) = flushed {
                        return Ok(token);
                    }
                }
                ' ' | '\t' | '\r' | '\n' => {
                    if c == '\n' {
                        self.cursor.line += 1;
                        self.cursor.column = 0;
                    }
                    if let Some(token) = self.flush() {
                        return Ok(token);
                    }
                }
                '#' => {
                    self.skip_comment()?;
                    if let Some(token) = self.flush() {
                        return Ok(token);
                    }
                }
                c if is_structural_char(c) => {
                    let structural = (Token::from(c), self.cursor);
                    match self.flush() {
                        Some(token) => {
                            self.pending = Some(structural);
                            return Ok(token);
                        }
                        None => return Ok(structural),
                    }
                }
                c => self.push_char(c),
            }
        }
    }

    /// Quote character of the literal being accumulated, if it is quoted.
    fn open_quote(&self) -> Option<char> {
        self.literal.chars().next().filter(|c| is_quote_char(*c))
    }

    fn push_char(&mut self, c: char) {
        if self.literal.is_empty() {
            self.literal_start = self.cursor;
        }
        self.literal.push(c);
    }

    fn take_literal(&mut self) -> (Token, Position) {
        (Token::new(std::mem::take(&mut self.literal)), self.literal_start)
    }

    fn flush(&mut self) -> Option<(Token, Position)> {
        if self.literal.is_empty() {
            None
        } else {
            Some(self.take_literal())
        }
    }

    fn finish(&mut self) -> (Token, Position) {
        self.escaped = false;
        self.flush().unwrap_or_else(|| {
            (
                Token::EOF,
                Position::new(self.cursor.line, self.cursor.column + 1),
            )
        })
    }

    /// Consumes characters through the end of the line.
    fn skip_comment(&mut self) -> io::Result<()> {
        while let Some(c) = self.read_char()? {
            if c == '\n' {
                self.cursor.line += 1;
                self.cursor.column = 0;
                break;
            }
        }
        Ok(())
    }

    fn read_char(&mut self) -> io::Result<Option<char>> {
        let Some(first) = self.read_byte()? else {
            return Ok(None);
        };

        let width = utf8_width(first);
        if width == 0 {
            return Err(invalid_utf8());
        }

        let mut buf = [first, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            *slot = self.read_byte()?.ok_or_else(invalid_utf8)?;
        }

        let decoded = std::str::from_utf8(&buf[..width]).map_err(|_| invalid_utf8())?;
        self.cursor.column += 1;
        Ok(decoded.chars().next())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.source.fill_buf() {
                Ok([]) => return Ok(None),
                Ok(buf) => {
                    let byte = buf[0];
                    self.source.consume(1);
                    return Ok(Some(byte));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

fn utf8_width(first: u8) -> usize {
    match first {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

fn invalid_utf8() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "configuration is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<String> {
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        let mut out = Vec::new();
        loop {
            let (token, _) = tokenizer.next_token().unwrap();
            let eof = token.is_eof();
            out.push(token.into_string());
            if eof {
                return out;
            }
        }
    }

    fn positioned(input: &str) -> Vec<(String, usize, usize)> {
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        let mut out = Vec::new();
        loop {
            let (token, pos) = tokenizer.next_token().unwrap();
            let eof = token.is_eof();
            out.push((token.into_string(), pos.line, pos.column));
            if eof {
                return out;
            }
        }
    }

    #[test]
    fn test_literals() {
        assert_eq!(tokens("test case"), ["test", "case", ""]);
        assert_eq!(tokens(""), [""]);
        assert_eq!(tokens("  \n\t "), [""]);
    }

    #[test]
    fn test_structural_split() {
        assert_eq!(tokens("a:b{c}"), ["a", ":", "b", "{", "c", "}", ""]);
        assert_eq!(tokens("test:{case }"), ["test", ":", "{", "case", "}", ""]);
        assert_eq!(tokens("{}"), ["{", "}", ""]);
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut tokenizer = Tokenizer::new("x".as_bytes());
        assert_eq!(tokenizer.next_token().unwrap().0, "x");
        for _ in 0..3 {
            assert!(tokenizer.next_token().unwrap().0.is_eof());
        }
    }

    #[test]
    fn test_quotes() {
        assert_eq!(tokens("'two words'"), ["'two words'", ""]);
        assert_eq!(tokens("\"E:/test website/\""), ["\"E:/test website/\"", ""]);
        assert_eq!(tokens("ab'cd'"), ["ab", "'cd'", ""]);
        assert_eq!(tokens("'a'b"), ["'a'", "b", ""]);
        assert_eq!(tokens(r#""two\"words" x"#), [r#""two\"words""#, "x", ""]);
        assert_eq!(tokens("\"it's # not a comment\""), ["\"it's # not a comment\"", ""]);
    }

    #[test]
    fn test_newline_ends_quote() {
        assert_eq!(tokens("'open\nnext"), ["'open", "next", ""]);
    }

    #[test]
    fn test_comments() {
        assert_eq!(tokens("# only a comment"), [""]);
        assert_eq!(tokens("a # comment { }\nb"), ["a", "b", ""]);
        assert_eq!(tokens("a#comment\nb"), ["a", "b", ""]);
        assert_eq!(tokens("a#comment"), ["a", ""]);
    }

    #[test]
    fn test_positions() {
        assert_eq!(
            positioned("server {\n  a: b\n}"),
            [
                ("server".to_string(), 1, 1),
                ("{".to_string(), 1, 8),
                ("a".to_string(), 2, 3),
                (":".to_string(), 2, 4),
                ("b".to_string(), 2, 6),
                ("}".to_string(), 3, 1),
                (String::new(), 3, 2),
            ]
        );
    }

    #[test]
    fn test_positions_after_comment_and_unicode() {
        let got = positioned("# note\nключ: 'знач'");
        assert_eq!(got[0], ("ключ".to_string(), 2, 1));
        assert_eq!(got[1], (":".to_string(), 2, 5));
        assert_eq!(got[2], ("'знач'".to_string(), 2, 7));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut tokenizer = Tokenizer::new(&[b'a', 0xFF][..]);
        let err = tokenizer.next_token().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
