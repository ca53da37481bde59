//! Configuration language front-end.
//!
//! # Data Flow
//! ```text
//! raw config bytes
//!     → lexer.rs (characters → positioned tokens, comments, quoting)
//!     → token.rs (classification, unescaping)
//!     → reader.rs (grammar-aware cursor, `{ }` block combinator)
//!     → grammar-specific parser (config::parser)
//! ```
//!
//! # Design Decisions
//! - Tokens are produced lazily; the source is never rewound
//! - Reading past the end keeps yielding EOF instead of failing
//! - Every error carries the position of the offending token
//! - The first error abandons the whole parse

pub mod error;
pub mod lexer;
pub mod reader;
pub mod token;

pub use error::{ParseError, Position, UnescapeError};
pub use lexer::Tokenizer;
pub use reader::{Field, Reader};
pub use token::{Token, TokenKind};
