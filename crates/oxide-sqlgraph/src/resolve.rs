//! Table expressions, aliases and identifier normalization.

use std::sync::LazyLock;

use regex::Regex;

use crate::lexer::{Keyword, Lexer, TokenKind};
use crate::split::split_top_level;

/// One identifier: bare, or quoted with `"`, `` ` `` or `[]`.
pub(crate) const IDENT: &str = r#"(?:[\p{L}_][\w$]*|"[^"]*"|`[^`]*`|\[[^\]]*\])"#;

/// "text then trailing identifier", optionally with `AS`.
static TRAILING_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?is)^(.+?)\s+(?:as\s+)?({IDENT})$")).expect("valid alias regex")
});

/// A single, possibly schema-qualified, identifier.
static DOTTED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{IDENT}(?:\s*\.\s*{IDENT})*$")).expect("valid dotted name regex")
});

static DOT_SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\.\s*").expect("valid dot spacing regex"));

/// What follows a subquery's closing parenthesis.
static SUBQUERY_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^(?:as\s+)?({IDENT})$")).expect("valid subquery alias regex")
});

/// A FROM or JOIN item split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    /// Table name as written, or the parenthesized subquery.
    pub name: String,
    /// Alias as written.
    pub alias: Option<String>,
    /// Whether the item is a derived table.
    pub is_subquery: bool,
}

impl ParsedTable {
    /// The registry key for this table.
    #[must_use]
    pub fn id(&self) -> String {
        table_id(&self.name, self.alias.as_deref())
    }
}

/// Splits a FROM/JOIN item into name, alias and subquery flag.
///
/// A parenthesized item is an opaque subquery whose trailing identifier is
/// its alias. Otherwise `name alias` / `name AS alias` is tried, then a lone
/// dotted name; anything else becomes the name verbatim.
#[must_use]
pub fn parse_table_and_alias(expr: &str) -> ParsedTable {
    let expr = expr.trim();

    if expr.starts_with('(') {
        return parse_subquery(expr);
    }

    if let Some((name, alias)) = split_trailing_alias(expr) {
        return ParsedTable {
            name: name.to_string(),
            alias: Some(alias.to_string()),
            is_subquery: false,
        };
    }

    if DOTTED_NAME.is_match(expr) {
        return ParsedTable {
            name: DOT_SPACING.replace_all(expr, ".").into_owned(),
            alias: None,
            is_subquery: false,
        };
    }

    ParsedTable {
        name: expr.to_string(),
        alias: None,
        is_subquery: false,
    }
}

fn parse_subquery(expr: &str) -> ParsedTable {
    let mut depth = 0usize;
    let mut close = None;
    for token in Lexer::new(expr).tokenize() {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    close = Some(token.span.end);
                    break;
                }
            }
            _ => {}
        }
    }

    let Some(close) = close else {
        return ParsedTable {
            name: expr.to_string(),
            alias: None,
            is_subquery: true,
        };
    };

    let alias = SUBQUERY_ALIAS
        .captures(expr[close..].trim())
        .map(|caps| caps[1].to_string())
        .filter(|alias| is_usable_alias(alias));

    ParsedTable {
        name: expr[..close].to_string(),
        alias,
        is_subquery: true,
    }
}

/// Splits `expr alias` or `expr AS alias` into its two halves.
///
/// The alias must be an identifier that is not a reserved keyword, and the
/// expression half must not end in an operator, a dot or a keyword, so
/// `a + b`, `NOT active` and `x IS NULL` keep no alias. `END` may precede an
/// alias since it closes a `CASE`.
pub(crate) fn split_trailing_alias(expr: &str) -> Option<(&str, &str)> {
    let caps = TRAILING_ALIAS.captures(expr)?;
    let head = caps.get(1)?.as_str().trim_end();
    let alias = caps.get(2)?.as_str();

    if !is_usable_alias(alias) {
        return None;
    }
    if head.ends_with(['.', '+', '-', '*', '/', '%', '=', '<', '>', '|', '&', ',', '(']) {
        return None;
    }
    let last_word = head
        .rsplit(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .next()
        .unwrap_or(head);
    if Keyword::from_str(last_word).is_some_and(|kw| kw != Keyword::End) {
        return None;
    }
    Some((head.trim(), alias))
}

/// Removes one pair of surrounding quotes from an identifier.
#[must_use]
pub fn unquote_identifier(ident: &str) -> &str {
    let ident = ident.trim();
    for (open, close) in [('"', '"'), ('`', '`'), ('[', ']')] {
        if let Some(inner) = ident
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner;
        }
    }
    ident
}

/// Whether `candidate` can be an alias: quoted names always can, bare
/// words only when they are not reserved keywords.
pub(crate) fn is_usable_alias(candidate: &str) -> bool {
    is_quoted(candidate) || Keyword::from_str(candidate).is_none()
}

fn is_quoted(ident: &str) -> bool {
    matches!(ident.chars().next(), Some('"' | '`' | '['))
}

/// Strips quote characters and lowercases, for case-insensitive matching.
#[must_use]
pub fn normalize_identifier(ident: &str) -> String {
    ident
        .trim()
        .chars()
        .filter(|c| !matches!(c, '"' | '`' | '[' | ']'))
        .collect::<String>()
        .to_lowercase()
}

/// The last dot-separated segment of a name; dots inside quotes or
/// parentheses do not count.
#[must_use]
pub fn last_segment(name: &str) -> &str {
    let Some(last) = split_top_level(name, '.').pop() else {
        return name.trim();
    };
    let trimmed = name.trim();
    trimmed
        .rfind(last.as_str())
        .map_or(trimmed, |at| &trimmed[at..at + last.len()])
}

/// The registry key: the normalized alias if present, else the normalized
/// last segment of the name. A name ending in a dot keys on the whole name.
#[must_use]
pub fn table_id(name: &str, alias: Option<&str>) -> String {
    if let Some(alias) = alias {
        return normalize_identifier(alias);
    }
    let id = normalize_identifier(last_segment(name));
    if id.is_empty() {
        normalize_identifier(name)
    } else {
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(name: &str, alias: Option<&str>, is_subquery: bool) -> ParsedTable {
        ParsedTable {
            name: name.to_string(),
            alias: alias.map(str::to_string),
            is_subquery,
        }
    }

    #[test]
    fn test_bare_table() {
        assert_eq!(parse_table_and_alias("users"), parsed("users", None, false));
    }

    #[test]
    fn test_bare_alias() {
        assert_eq!(parse_table_and_alias("users u"), parsed("users", Some("u"), false));
    }

    #[test]
    fn test_as_alias_any_case() {
        assert_eq!(parse_table_and_alias("users AS u"), parsed("users", Some("u"), false));
        assert_eq!(parse_table_and_alias("users as u"), parsed("users", Some("u"), false));
    }

    #[test]
    fn test_schema_qualified() {
        assert_eq!(
            parse_table_and_alias("public.users"),
            parsed("public.users", None, false)
        );
        assert_eq!(
            parse_table_and_alias("public.users pu"),
            parsed("public.users", Some("pu"), false)
        );
    }

    #[test]
    fn test_spaced_dots_are_one_name() {
        assert_eq!(
            parse_table_and_alias("public . users"),
            parsed("public.users", None, false)
        );
    }

    #[test]
    fn test_quoted_names() {
        assert_eq!(
            parse_table_and_alias("\"Order Items\" oi"),
            parsed("\"Order Items\"", Some("oi"), false)
        );
        assert_eq!(
            parse_table_and_alias("sales.`line items`"),
            parsed("sales.`line items`", None, false)
        );
    }

    #[test]
    fn test_keyword_is_not_an_alias() {
        assert_eq!(
            parse_table_and_alias("users where"),
            parsed("users where", None, false)
        );
    }

    #[test]
    fn test_subquery_with_alias() {
        assert_eq!(
            parse_table_and_alias("(SELECT id FROM t) m"),
            parsed("(SELECT id FROM t)", Some("m"), true)
        );
        assert_eq!(
            parse_table_and_alias("(SELECT (1) FROM t) AS m"),
            parsed("(SELECT (1) FROM t)", Some("m"), true)
        );
    }

    #[test]
    fn test_subquery_without_alias() {
        assert_eq!(
            parse_table_and_alias("(SELECT id FROM t)"),
            parsed("(SELECT id FROM t)", None, true)
        );
    }

    #[test]
    fn test_unbalanced_subquery() {
        assert_eq!(
            parse_table_and_alias("(SELECT id FROM t"),
            parsed("(SELECT id FROM t", None, true)
        );
    }

    #[test]
    fn test_split_trailing_alias_guards() {
        assert_eq!(split_trailing_alias("count(*) total"), Some(("count(*)", "total")));
        assert_eq!(split_trailing_alias("a.b AS \"Label\""), Some(("a.b", "\"Label\"")));
        assert_eq!(
            split_trailing_alias("CASE WHEN x THEN 1 END status"),
            Some(("CASE WHEN x THEN 1 END", "status"))
        );
        assert_eq!(split_trailing_alias("a + b"), None);
        assert_eq!(split_trailing_alias("NOT active"), None);
        assert_eq!(split_trailing_alias("x IS NULL"), None);
        assert_eq!(split_trailing_alias("CASE WHEN x THEN 1 END"), None);
        assert_eq!(split_trailing_alias("u.id"), None);
    }

    #[test]
    fn test_unquote_identifier() {
        assert_eq!(unquote_identifier("\"Name\""), "Name");
        assert_eq!(unquote_identifier("[x y]"), "x y");
        assert_eq!(unquote_identifier("plain"), "plain");
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("\"Users\""), "users");
        assert_eq!(normalize_identifier("`MyTable`"), "mytable");
        assert_eq!(normalize_identifier("[dbo]"), "dbo");
        assert_eq!(normalize_identifier(" U "), "u");
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("users"), "users");
        assert_eq!(last_segment("public.users"), "users");
        assert_eq!(last_segment("\"my.schema\".\"t\""), "\"t\"");
    }

    #[test]
    fn test_table_id() {
        assert_eq!(table_id("public.Users", None), "users");
        assert_eq!(table_id("users", Some("\"U\"")), "u");
        assert_eq!(parse_table_and_alias("db.sales.Orders O").id(), "o");
        assert_eq!(table_id("t.", None), "t.");
    }
}
