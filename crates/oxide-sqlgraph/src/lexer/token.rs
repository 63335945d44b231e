//! Token types for the SQL lexer.

use super::Span;

/// SQL keywords recognized by the analyzer.
///
/// Only words that shape a SELECT statement are listed; everything else is
/// lexed as an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Query clauses
    Select,
    Distinct,
    All,
    From,
    Where,
    Group,
    By,
    Having,
    Order,
    Limit,
    Offset,
    With,

    // Joins
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    Natural,
    On,
    Using,

    // Set operations
    Union,
    Intersect,
    Except,

    // Statements the analyzer refuses
    Insert,
    Update,
    Delete,

    // Operators
    And,
    Or,
    Not,
    In,
    Between,
    Like,
    Is,
    Null,
    Exists,

    // Expressions
    As,
    Case,
    When,
    Then,
    Else,
    End,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SELECT" => Some(Self::Select),
            "DISTINCT" => Some(Self::Distinct),
            "ALL" => Some(Self::All),
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "GROUP" => Some(Self::Group),
            "BY" => Some(Self::By),
            "HAVING" => Some(Self::Having),
            "ORDER" => Some(Self::Order),
            "LIMIT" => Some(Self::Limit),
            "OFFSET" => Some(Self::Offset),
            "WITH" => Some(Self::With),
            "JOIN" => Some(Self::Join),
            "INNER" => Some(Self::Inner),
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            "FULL" => Some(Self::Full),
            "OUTER" => Some(Self::Outer),
            "CROSS" => Some(Self::Cross),
            "NATURAL" => Some(Self::Natural),
            "ON" => Some(Self::On),
            "USING" => Some(Self::Using),
            "UNION" => Some(Self::Union),
            "INTERSECT" => Some(Self::Intersect),
            "EXCEPT" => Some(Self::Except),
            "INSERT" => Some(Self::Insert),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            "IN" => Some(Self::In),
            "BETWEEN" => Some(Self::Between),
            "LIKE" => Some(Self::Like),
            "IS" => Some(Self::Is),
            "NULL" => Some(Self::Null),
            "EXISTS" => Some(Self::Exists),
            "AS" => Some(Self::As),
            "CASE" => Some(Self::Case),
            "WHEN" => Some(Self::When),
            "THEN" => Some(Self::Then),
            "ELSE" => Some(Self::Else),
            "END" => Some(Self::End),
            _ => None,
        }
    }

    /// Returns the keyword as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Distinct => "DISTINCT",
            Self::All => "ALL",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Group => "GROUP",
            Self::By => "BY",
            Self::Having => "HAVING",
            Self::Order => "ORDER",
            Self::Limit => "LIMIT",
            Self::Offset => "OFFSET",
            Self::With => "WITH",
            Self::Join => "JOIN",
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Full => "FULL",
            Self::Outer => "OUTER",
            Self::Cross => "CROSS",
            Self::Natural => "NATURAL",
            Self::On => "ON",
            Self::Using => "USING",
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::In => "IN",
            Self::Between => "BETWEEN",
            Self::Like => "LIKE",
            Self::Is => "IS",
            Self::Null => "NULL",
            Self::Exists => "EXISTS",
            Self::As => "AS",
            Self::Case => "CASE",
            Self::When => "WHEN",
            Self::Then => "THEN",
            Self::Else => "ELSE",
            Self::End => "END",
        }
    }

    /// Keywords that end the FROM/JOIN region of a SELECT.
    #[must_use]
    pub const fn is_clause_boundary(&self) -> bool {
        matches!(
            self,
            Self::Where
                | Self::Group
                | Self::Having
                | Self::Order
                | Self::Limit
                | Self::Offset
                | Self::Union
                | Self::Intersect
                | Self::Except
        )
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    /// Numeric literal, kept as written (e.g., 42, 3.14, 1e10)
    Number(String),
    /// String literal with escapes resolved (e.g., 'hello')
    String(String),

    // Identifiers and keywords
    /// Bare identifier (e.g., column_name)
    Identifier(String),
    /// Quoted identifier with the quotes removed (e.g., "Order Items")
    QuotedIdentifier(String),
    /// SQL keyword
    Keyword(Keyword),

    // Operators
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// =
    Eq,
    /// != or <>
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// ||
    Concat,

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,
    /// Any other punctuation (e.g., `:`, `@`, `?`)
    Punct(char),

    // Special
    /// End of input
    Eof,
    /// Malformed input (e.g., an unterminated string literal)
    Error(String),
}

/// A token with its span in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source text.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    /// Returns true if this token is the given keyword.
    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.as_keyword() == Some(keyword)
    }

    /// Returns the identifier text for bare or quoted identifiers.
    #[must_use]
    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) | TokenKind::QuotedIdentifier(name) => Some(name),
            _ => None,
        }
    }
}
