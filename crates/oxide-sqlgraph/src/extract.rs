//! Clause extraction: SELECT list, FROM list and JOIN clauses.
//!
//! Extraction runs over the token stream rather than raw text, so keywords
//! nested inside parentheses (subqueries, function calls) or quotes never act
//! as clause boundaries.

use tracing::trace;

use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};
use crate::model::JoinType;
use crate::split::split_top_level;

/// One `[type] JOIN table [ON condition | USING (columns)]` fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    /// The kind of join.
    pub join_type: JoinType,
    /// The joined table expression, alias included.
    pub table_expr: String,
    /// The ON condition text; empty when there is none.
    pub on_text: String,
    /// Columns listed in a `USING (...)` clause.
    pub using_columns: Vec<String>,
    /// Comma-separated FROM items written after this join, as in
    /// `JOIN b ON a.id = b.a_id, c`.
    pub trailing_tables: Vec<String>,
}

/// Everything the later stages need from one SELECT statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clauses {
    /// Whether a SELECT keyword was found.
    pub has_select: bool,
    /// Whether a FROM keyword belonging to that SELECT was found.
    pub has_from: bool,
    /// The leading keyword when the statement is not a query (e.g. `UPDATE`).
    pub other_statement: Option<Keyword>,
    /// SELECT list text, DISTINCT/ALL removed.
    pub select_part: String,
    /// Comma-separated FROM items, before the first join.
    pub from_tables: Vec<String>,
    /// Join clauses in source order.
    pub joins: Vec<JoinClause>,
    /// Lexer errors such as unterminated literals.
    pub lex_errors: Vec<String>,
}

impl Clauses {
    /// Extracts the clauses of the outermost SELECT in `sql`.
    #[must_use]
    pub fn extract(sql: &str) -> Self {
        let scanned = Scanned::new(sql);
        let mut clauses = Self {
            lex_errors: scanned.errors(),
            ..Self::default()
        };

        let Some(select) = scanned.outermost_select() else {
            clauses.other_statement = scanned
                .tokens
                .first()
                .and_then(Token::as_keyword)
                .filter(|kw| matches!(kw, Keyword::Insert | Keyword::Update | Keyword::Delete));
            return clauses;
        };
        clauses.has_select = true;
        let depth = scanned.depths[select];

        let Some(from) = scanned.find_at_depth(select + 1, depth, |t| t.is_keyword(Keyword::From))
        else {
            trace!("no FROM after SELECT");
            return clauses;
        };
        clauses.has_from = true;

        let mut list_start = select + 1;
        if scanned.tokens[list_start].is_keyword(Keyword::Distinct)
            || scanned.tokens[list_start].is_keyword(Keyword::All)
        {
            list_start += 1;
        }
        clauses.select_part = scanned.text_between(list_start.min(from), from).to_string();

        let region_end = scanned.region_end(from + 1, depth);
        let joins_start = (from + 1..region_end)
            .find(|&i| scanned.depths[i] == depth && scanned.join_at(i).is_some())
            .unwrap_or(region_end);

        clauses.from_tables = split_top_level(scanned.text_between(from + 1, joins_start), ',')
            .into_iter()
            .filter(|item| !item.is_empty())
            .collect();
        clauses.joins = scanned.joins(joins_start, region_end, depth);

        trace!(
            from_items = clauses.from_tables.len(),
            joins = clauses.joins.len(),
            "extracted clauses"
        );
        clauses
    }
}

/// Returns the SELECT list text between `SELECT` and `FROM`, with a leading
/// `DISTINCT` removed. Empty when there is no FROM.
#[must_use]
pub fn extract_select_part(sql: &str) -> String {
    Clauses::extract(sql).select_part
}

/// Returns the comma-separated FROM items, up to the first join or
/// top-level clause keyword.
#[must_use]
pub fn extract_from_tables(sql: &str) -> Vec<String> {
    Clauses::extract(sql).from_tables
}

/// Returns the JOIN clauses of the outermost SELECT, in source order.
#[must_use]
pub fn extract_join_clauses(sql: &str) -> Vec<JoinClause> {
    Clauses::extract(sql).joins
}

/// Tokens of a statement annotated with their parenthesis depth.
///
/// A `(` and its matching `)` share the same depth; the depth never drops
/// below zero on unbalanced input.
struct Scanned<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    depths: Vec<usize>,
}

impl<'a> Scanned<'a> {
    fn new(source: &'a str) -> Self {
        let tokens = Lexer::new(source).tokenize();
        let mut depths = Vec::with_capacity(tokens.len());
        let mut depth = 0usize;
        for token in &tokens {
            match token.kind {
                TokenKind::LeftParen => {
                    depths.push(depth);
                    depth += 1;
                }
                TokenKind::RightParen => {
                    depth = depth.saturating_sub(1);
                    depths.push(depth);
                }
                _ => depths.push(depth),
            }
        }
        Self {
            source,
            tokens,
            depths,
        }
    }

    fn errors(&self) -> Vec<String> {
        self.tokens
            .iter()
            .filter_map(|t| match &t.kind {
                TokenKind::Error(msg) => Some(format!("{msg} at position {}", t.span.start)),
                _ => None,
            })
            .collect()
    }

    /// The first SELECT at the shallowest depth any SELECT appears.
    fn outermost_select(&self) -> Option<usize> {
        let selects = || {
            self.tokens
                .iter()
                .enumerate()
                .filter(|(_, t)| t.is_keyword(Keyword::Select))
                .map(|(i, _)| i)
        };
        let min_depth = selects().map(|i| self.depths[i]).min()?;
        selects().find(|&i| self.depths[i] == min_depth)
    }

    /// Finds the first token at `depth` matching `pred`, giving up when the
    /// enclosing parenthesis closes or a set operation starts another query.
    fn find_at_depth(
        &self,
        start: usize,
        depth: usize,
        pred: impl Fn(&Token) -> bool,
    ) -> Option<usize> {
        for i in start..self.tokens.len() {
            if self.depths[i] < depth {
                return None;
            }
            if self.depths[i] != depth {
                continue;
            }
            let token = &self.tokens[i];
            if pred(token) {
                return Some(i);
            }
            if matches!(token.kind, TokenKind::Semicolon)
                || matches!(
                    token.as_keyword(),
                    Some(Keyword::Union | Keyword::Intersect | Keyword::Except)
                )
            {
                return None;
            }
        }
        None
    }

    /// Index of the first token that closes the FROM/JOIN region.
    fn region_end(&self, start: usize, depth: usize) -> usize {
        (start..self.tokens.len())
            .find(|&i| {
                let token = &self.tokens[i];
                token.is_eof()
                    || self.depths[i] < depth
                    || (self.depths[i] == depth
                        && (matches!(token.kind, TokenKind::Semicolon)
                            || token.as_keyword().is_some_and(|kw| kw.is_clause_boundary())))
            })
            .unwrap_or(self.tokens.len() - 1)
    }

    /// Source text from the start of token `from` to the start of token `to`.
    fn text_between(&self, from: usize, to: usize) -> &'a str {
        if from >= to {
            return "";
        }
        Span::new(self.tokens[from].span.start, self.tokens[to].span.start).text(self.source)
    }

    fn keyword_at(&self, i: usize) -> Option<Keyword> {
        self.tokens.get(i).and_then(Token::as_keyword)
    }

    /// Matches a join keyword sequence starting at `i`, most specific form
    /// first. Returns the join type and the index just past `JOIN`.
    fn join_at(&self, i: usize) -> Option<(JoinType, usize)> {
        let mut next = i + 1;
        let join_type = match self.keyword_at(i)? {
            Keyword::Join => return Some((JoinType::Plain, next)),
            Keyword::Inner => JoinType::Inner,
            Keyword::Cross => JoinType::Cross,
            kw @ (Keyword::Left | Keyword::Right | Keyword::Full) => {
                if self.keyword_at(next) == Some(Keyword::Outer) {
                    next += 1;
                }
                match kw {
                    Keyword::Left => JoinType::Left,
                    Keyword::Right => JoinType::Right,
                    _ => JoinType::Full,
                }
            }
            Keyword::Natural => {
                if matches!(
                    self.keyword_at(next),
                    Some(Keyword::Left | Keyword::Right | Keyword::Full | Keyword::Inner)
                ) {
                    next += 1;
                }
                if self.keyword_at(next) == Some(Keyword::Outer) {
                    next += 1;
                }
                JoinType::Natural
            }
            _ => return None,
        };
        (self.keyword_at(next) == Some(Keyword::Join)).then_some((join_type, next + 1))
    }

    fn joins(&self, start: usize, end: usize, depth: usize) -> Vec<JoinClause> {
        let mut joins = Vec::new();
        let mut i = start;

        while i < end {
            let Some((join_type, body_start)) = self.join_at(i) else {
                break;
            };
            let body_end = (body_start..end)
                .find(|&j| self.depths[j] == depth && self.join_at(j).is_some())
                .unwrap_or(end);
            // A top-level comma ends the join and starts more FROM items
            let comma = (body_start..body_end).find(|&j| {
                self.depths[j] == depth && matches!(self.tokens[j].kind, TokenKind::Comma)
            });
            let mut clause =
                self.join_clause(join_type, body_start, comma.unwrap_or(body_end), depth);
            if let Some(comma) = comma {
                clause.trailing_tables =
                    split_top_level(self.text_between(comma + 1, body_end), ',')
                        .into_iter()
                        .filter(|item| !item.is_empty())
                        .collect();
            }
            joins.push(clause);
            i = body_end;
        }

        joins
    }

    fn join_clause(
        &self,
        join_type: JoinType,
        start: usize,
        end: usize,
        depth: usize,
    ) -> JoinClause {
        let at_depth = |kw: Keyword| {
            (start..end).find(|&j| self.depths[j] == depth && self.tokens[j].is_keyword(kw))
        };

        if let Some(on) = at_depth(Keyword::On) {
            return JoinClause {
                join_type,
                table_expr: self.text_between(start, on).to_string(),
                on_text: self.text_between(on + 1, end).to_string(),
                using_columns: Vec::new(),
                trailing_tables: Vec::new(),
            };
        }

        if let Some(using) = at_depth(Keyword::Using) {
            let using_columns = (using + 1..end)
                .take_while(|&j| self.depths[j] > depth || j == using + 1)
                .filter(|&j| self.depths[j] == depth + 1)
                .filter_map(|j| self.tokens[j].as_identifier().map(str::to_string))
                .collect();
            return JoinClause {
                join_type,
                table_expr: self.text_between(start, using).to_string(),
                on_text: String::new(),
                using_columns,
                trailing_tables: Vec::new(),
            };
        }

        JoinClause {
            join_type,
            table_expr: self.text_between(start, end).to_string(),
            on_text: String::new(),
            using_columns: Vec::new(),
            trailing_tables: Vec::new(),
        }
    }
}
