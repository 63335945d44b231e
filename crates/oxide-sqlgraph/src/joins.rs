//! Join-condition decomposition into graph edges.
//!
//! Conditions are flattened: `AND` and `OR` are both plain separators and no
//! precedence tree is built, so `a.x = b.x OR (c.y = d.y)` yields one atom
//! per top-level comparison.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::extract::JoinClause;
use crate::graph::{EdgeEnd, GraphBuilder};
use crate::lexer::{Keyword, Lexer, TokenKind};
use crate::resolve::{last_segment, unquote_identifier, IDENT};

/// `left <op> right`, the operator found at the leftmost position.
static COMPARISON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(.+?)\s*(<>|!=|<=|>=|=|<|>|\bnot\s+in\b|\bnot\s+like\b|\blike\b|\bin\b)\s*(.+)$")
        .expect("valid comparison regex")
});

/// A dotted column reference: qualifier path, then column.
static COLUMN_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^((?:{IDENT}\s*\.\s*)*{IDENT})\s*\.\s*({IDENT})$"
    ))
    .expect("valid column reference regex")
});

/// One atomic comparison from an ON clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// Left-hand side as written.
    pub left: String,
    /// Lowercased operator with single spaces (`=`, `not in`, ...).
    pub operator: String,
    /// Right-hand side as written.
    pub right: String,
}

/// Flattens an ON condition into its atomic comparisons.
///
/// `AND` and `OR` split the condition, and a group wrapped in parentheses is
/// opened up and split the same way, so `(a.x = b.x AND (a.y = b.y OR
/// a.z = b.z))` yields three atoms. The `AND` of a `BETWEEN x AND y` is not
/// a split point, and nothing inside quotes or function-call parentheses is
/// split.
#[must_use]
pub fn split_conditions(on_text: &str) -> Vec<String> {
    let mut atoms = Vec::new();
    flatten_into(on_text, &mut atoms);
    atoms
}

fn flatten_into(text: &str, atoms: &mut Vec<String>) {
    for piece in split_on_connectives(text) {
        let inner = strip_wrapping_parens(&piece);
        if inner.len() < piece.len() {
            flatten_into(inner, atoms);
        } else {
            atoms.push(piece);
        }
    }
}

/// Splits on `AND`/`OR` at parenthesis depth 0 only.
fn split_on_connectives(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut piece_start = 0;
    let mut in_between = false;

    for token in Lexer::new(text).tokenize() {
        match &token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Keyword(Keyword::Between) if depth == 0 => in_between = true,
            TokenKind::Keyword(Keyword::And) if depth == 0 && in_between => in_between = false,
            TokenKind::Keyword(Keyword::And | Keyword::Or) if depth == 0 => {
                pieces.push(text[piece_start..token.span.start].trim().to_string());
                piece_start = token.span.end;
            }
            TokenKind::Eof => {
                pieces.push(text[piece_start..].trim().to_string());
            }
            _ => {}
        }
    }

    pieces.retain(|piece| !piece.is_empty());
    pieces
}

/// Parses one atom into its comparison parts.
#[must_use]
pub fn parse_comparison(atom: &str) -> Option<Comparison> {
    let atom = strip_wrapping_parens(atom.trim());
    let caps = COMPARISON.captures(atom)?;
    let operator = caps[2]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    Some(Comparison {
        left: caps[1].trim().to_string(),
        operator,
        right: caps[3].trim().to_string(),
    })
}

/// Removes parentheses that wrap the whole atom, e.g. `(a.id = b.id)`.
fn strip_wrapping_parens(mut atom: &str) -> &str {
    while let Some(inner) = atom.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        // `(a) = (b)` starts and ends with parens without being wrapped
        let balanced = inner.chars().try_fold(0usize, |depth, c| match c {
            '(' => Some(depth + 1),
            ')' => depth.checked_sub(1),
            _ => Some(depth),
        });
        if balanced != Some(0) {
            break;
        }
        atom = inner.trim();
    }
    atom
}

/// Splits `alias.column` into `(qualifier, column)`; unqualified or
/// non-column operands yield `None`.
#[must_use]
pub fn split_column_reference(operand: &str) -> Option<(String, String)> {
    let caps = COLUMN_REFERENCE.captures(operand.trim())?;
    Some((
        last_segment(&caps[1]).to_string(),
        unquote_identifier(&caps[2]).to_string(),
    ))
}

fn resolve_end(builder: &GraphBuilder, operand: &str) -> Option<EdgeEnd> {
    let (qualifier, column) = split_column_reference(operand)?;
    let table = builder.registry.resolve(&qualifier)?;
    Some(EdgeEnd { table, column })
}

/// Turns a join's ON (or USING) condition into edges.
///
/// `previous` is the id of the table registered just before the joined
/// table; it is the left side of `USING` columns. Atoms whose sides do not
/// both resolve to different known tables produce nothing.
pub fn decompose_join(
    join: &JoinClause,
    target: &str,
    previous: Option<&str>,
    builder: &mut GraphBuilder,
) {
    for atom in split_conditions(&join.on_text) {
        let Some(comparison) = parse_comparison(&atom) else {
            trace!(%atom, "not a comparison");
            continue;
        };
        let (Some(source), Some(dest)) = (
            resolve_end(builder, &comparison.left),
            resolve_end(builder, &comparison.right),
        ) else {
            trace!(%atom, "unresolved side, skipping");
            continue;
        };
        builder.add_edge(join.join_type, source, dest, &comparison.operator, &atom);
    }

    let Some(previous) = previous else {
        return;
    };
    for column in &join.using_columns {
        let condition = format!("{previous}.{column} = {target}.{column}");
        builder.add_edge(
            join.join_type,
            EdgeEnd {
                table: previous.to_string(),
                column: column.clone(),
            },
            EdgeEnd {
                table: target.to_string(),
                column: column.clone(),
            },
            "=",
            &condition,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JoinType;
    use crate::resolve::parse_table_and_alias;

    fn comparison(left: &str, operator: &str, right: &str) -> Option<Comparison> {
        Some(Comparison {
            left: left.to_string(),
            operator: operator.to_string(),
            right: right.to_string(),
        })
    }

    fn join(on_text: &str) -> JoinClause {
        JoinClause {
            join_type: JoinType::Inner,
            table_expr: String::new(),
            on_text: on_text.to_string(),
            using_columns: Vec::new(),
            trailing_tables: Vec::new(),
        }
    }

    #[test]
    fn test_split_conditions_flattens_and_or() {
        assert_eq!(
            split_conditions("a.id = b.id AND a.t = b.t or a.x > 1"),
            vec!["a.id = b.id", "a.t = b.t", "a.x > 1"]
        );
    }

    #[test]
    fn test_split_conditions_opens_parenthesized_groups() {
        assert_eq!(
            split_conditions("a.d BETWEEN b.lo AND b.hi AND (a.x = 1 OR a.y = 2)"),
            vec!["a.d BETWEEN b.lo AND b.hi", "a.x = 1", "a.y = 2"]
        );
        assert_eq!(
            split_conditions("(a.id = b.id AND (a.t = b.t OR ((a.u = b.u))))"),
            vec!["a.id = b.id", "a.t = b.t", "a.u = b.u"]
        );
        assert_eq!(
            split_conditions("(a.d BETWEEN b.lo AND b.hi)"),
            vec!["a.d BETWEEN b.lo AND b.hi"]
        );
    }

    #[test]
    fn test_split_conditions_keeps_calls_and_literals_whole() {
        assert_eq!(split_conditions("a.s = 'x and y'"), vec!["a.s = 'x and y'"]);
        assert_eq!(
            split_conditions("a.n IN (1, 2) AND coalesce(a.x, b.x) = b.y"),
            vec!["a.n IN (1, 2)", "coalesce(a.x, b.x) = b.y"]
        );
        assert_eq!(split_conditions("(a) = (b)"), vec!["(a) = (b)"]);
        assert!(split_conditions("").is_empty());
        assert!(split_conditions("()").is_empty());
    }

    #[test]
    fn test_parse_comparison_operators() {
        assert_eq!(parse_comparison("u.id = o.user_id"), comparison("u.id", "=", "o.user_id"));
        assert_eq!(parse_comparison("a.x<>b.y"), comparison("a.x", "<>", "b.y"));
        assert_eq!(parse_comparison("a.x != b.y"), comparison("a.x", "!=", "b.y"));
        assert_eq!(parse_comparison("a.x <= b.y"), comparison("a.x", "<=", "b.y"));
        assert_eq!(parse_comparison("a.x >= b.y"), comparison("a.x", ">=", "b.y"));
        assert_eq!(parse_comparison("a.x < b.y"), comparison("a.x", "<", "b.y"));
        assert_eq!(parse_comparison("a.x > b.y"), comparison("a.x", ">", "b.y"));
        assert_eq!(parse_comparison("a.n LIKE b.p"), comparison("a.n", "like", "b.p"));
        assert_eq!(parse_comparison("a.n IN (1, 2)"), comparison("a.n", "in", "(1, 2)"));
        assert_eq!(parse_comparison("a.n NOT  IN b.s"), comparison("a.n", "not in", "b.s"));
        assert_eq!(parse_comparison("(a.id = b.id)"), comparison("a.id", "=", "b.id"));
        assert_eq!(parse_comparison("a.flag"), None);
    }

    #[test]
    fn test_in_inside_identifier_is_not_an_operator() {
        assert_eq!(
            parse_comparison("a.line_item = b.id"),
            comparison("a.line_item", "=", "b.id")
        );
    }

    #[test]
    fn test_split_column_reference() {
        assert_eq!(
            split_column_reference("o.user_id"),
            Some(("o".to_string(), "user_id".to_string()))
        );
        assert_eq!(
            split_column_reference("s.t.\"Col\""),
            Some(("t".to_string(), "Col".to_string()))
        );
        assert_eq!(split_column_reference("user_id"), None);
        assert_eq!(split_column_reference("1"), None);
    }

    #[test]
    fn test_decompose_emits_only_cross_table_edges() {
        let mut builder = GraphBuilder::new();
        builder.registry.register(&parse_table_and_alias("a"));
        builder.registry.register(&parse_table_and_alias("b"));
        decompose_join(
            &join("a.id = b.a_id AND b.kind = b.other AND z.id = a.id AND b.flag = 1"),
            "b",
            Some("a"),
            &mut builder,
        );

        let result = builder.finish();
        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.edges[0].source, "a");
        assert_eq!(result.edges[0].target, "b");
        assert_eq!(result.edges[0].condition, "a.id = b.a_id");
        assert_eq!(result.edges[0].join_type, JoinType::Inner);
    }

    #[test]
    fn test_decompose_using_columns() {
        let mut builder = GraphBuilder::new();
        builder.registry.register(&parse_table_and_alias("a"));
        builder.registry.register(&parse_table_and_alias("b"));
        let clause = JoinClause {
            using_columns: vec!["id".to_string()],
            ..join("")
        };
        decompose_join(&clause, "b", Some("a"), &mut builder);

        let result = builder.finish();
        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.edges[0].condition, "a.id = b.id");
        assert_eq!(result.edges[0].operator, "=");
    }
}
