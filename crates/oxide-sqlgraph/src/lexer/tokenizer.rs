//! SQL Tokenizer implementation.

use super::{Cursor, Keyword, Span, Token, TokenKind};

/// A lexer that tokenizes SQL input.
pub struct Lexer<'a> {
    /// Cursor over the input source.
    cursor: Cursor<'a>,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            cursor: Cursor::new(input),
            start: 0,
        }
    }

    /// Skips whitespace and comments.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.cursor.eat_while(char::is_whitespace);

            // Single-line comments (-- ...)
            if self.cursor.peek() == Some('-') && self.cursor.peek_next() == Some('-') {
                self.cursor.eat_while(|c| c != '\n');
                continue;
            }

            // Multi-line comments (/* ... */)
            if self.cursor.peek() == Some('/') && self.cursor.peek_next() == Some('*') {
                self.cursor.advance();
                self.cursor.advance();
                loop {
                    match self.cursor.advance() {
                        Some('*') if self.cursor.peek() == Some('/') => {
                            self.cursor.advance();
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }
                continue;
            }

            break;
        }
    }

    /// Creates a token spanning from the token start to the current position.
    const fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.cursor.pos()))
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> Token {
        self.cursor
            .eat_while(|c| c.is_alphanumeric() || c == '_' || c == '$');
        let text = self.cursor.slice_from(self.start);

        match Keyword::from_str(text) {
            Some(keyword) => self.make_token(TokenKind::Keyword(keyword)),
            None => self.make_token(TokenKind::Identifier(text.to_string())),
        }
    }

    /// Scans a quoted identifier (`"name"`, `` `name` `` or `[name]`).
    ///
    /// Like string literals, double-quoted names accept backslash escapes;
    /// backtick and bracket names only take a doubled closing quote.
    fn scan_quoted_identifier(&mut self, close: char) -> Token {
        self.cursor.advance(); // opening quote
        let mut value = String::new();

        loop {
            match self.cursor.peek() {
                Some(c) if c == close => {
                    // A doubled closing quote is an escaped quote
                    if close != ']' && self.cursor.peek_next() == Some(close) {
                        value.push(close);
                        self.cursor.advance();
                        self.cursor.advance();
                    } else {
                        break;
                    }
                }
                Some('\\') if close == '"' => {
                    self.cursor.advance();
                    if let Some(escaped) = self.cursor.advance() {
                        value.push(escaped);
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.cursor.advance();
                }
                None => {
                    return self.make_token(TokenKind::Error(String::from(
                        "Unterminated quoted identifier",
                    )));
                }
            }
        }

        self.cursor.advance(); // closing quote
        self.make_token(TokenKind::QuotedIdentifier(value))
    }

    /// Scans a number, keeping its literal text.
    fn scan_number(&mut self) -> Token {
        self.cursor.eat_while(|c| c.is_ascii_digit());

        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }

        if self.cursor.peek().is_some_and(|c| c == 'e' || c == 'E') {
            let before_exponent = self.cursor.pos();
            self.cursor.advance();
            if self.cursor.peek().is_some_and(|c| c == '+' || c == '-') {
                self.cursor.advance();
            }
            if self.cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.cursor.eat_while(|c| c.is_ascii_digit());
            } else {
                // `1e` followed by a non-digit: the `e` starts the next token
                self.cursor.reset(before_exponent);
            }
        }

        let text = self.cursor.slice_from(self.start).to_string();
        self.make_token(TokenKind::Number(text))
    }

    /// Scans a single-quoted string literal.
    ///
    /// Both the standard doubled quote (`''`) and a backslash escape (`\'`)
    /// are accepted.
    fn scan_string(&mut self) -> Token {
        self.cursor.advance(); // opening quote
        let mut value = String::new();

        loop {
            match self.cursor.peek() {
                Some('\'') => {
                    if self.cursor.peek_next() == Some('\'') {
                        value.push('\'');
                        self.cursor.advance();
                        self.cursor.advance();
                    } else {
                        break;
                    }
                }
                Some('\\') => {
                    self.cursor.advance();
                    if let Some(escaped) = self.cursor.advance() {
                        value.push(escaped);
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.cursor.advance();
                }
                None => {
                    return self.make_token(TokenKind::Error(String::from(
                        "Unterminated string literal",
                    )));
                }
            }
        }

        self.cursor.advance(); // closing quote
        self.make_token(TokenKind::String(value))
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        self.start = self.cursor.pos();

        let Some(c) = self.cursor.peek() else {
            return self.make_token(TokenKind::Eof);
        };

        match c {
            '\'' => return self.scan_string(),
            '"' => return self.scan_quoted_identifier('"'),
            '`' => return self.scan_quoted_identifier('`'),
            '[' => return self.scan_quoted_identifier(']'),
            c if c.is_ascii_digit() => return self.scan_number(),
            c if c.is_alphabetic() || c == '_' => return self.scan_identifier(),
            _ => {}
        }

        self.cursor.advance();
        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => TokenKind::Eq,
            '<' => match self.cursor.peek() {
                Some('=') => {
                    self.cursor.advance();
                    TokenKind::LtEq
                }
                Some('>') => {
                    self.cursor.advance();
                    TokenKind::NotEq
                }
                _ => TokenKind::Lt,
            },
            '>' => {
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            '!' if self.cursor.peek() == Some('=') => {
                self.cursor.advance();
                TokenKind::NotEq
            }
            '|' if self.cursor.peek() == Some('|') => {
                self.cursor.advance();
                TokenKind::Concat
            }
            other => TokenKind::Punct(other),
        };
        self.make_token(kind)
    }

    /// Tokenizes the entire input and returns all tokens, ending with EOF.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}
