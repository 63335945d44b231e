//! SQL Lexer/Tokenizer
//!
//! A small hand-written lexer that turns SELECT text into a stream of tokens.
//! It never fails: malformed input produces [`TokenKind::Error`] tokens and
//! scanning continues.

mod cursor;
mod span;
mod token;
mod tokenizer;

pub use cursor::Cursor;
pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
