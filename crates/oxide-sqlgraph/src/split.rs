//! Top-level splitting that respects parentheses and quoting.

use crate::lexer::Cursor;

/// Which quote, if any, the scanner is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Single,
    Double,
    Backtick,
}

impl Quote {
    const fn from_char(c: char) -> Option<Self> {
        match c {
            '\'' => Some(Self::Single),
            '"' => Some(Self::Double),
            '`' => Some(Self::Backtick),
            _ => None,
        }
    }
}

/// Splits `text` on `separator`, but only where the separator sits outside
/// every parenthesis and quote.
///
/// Pieces are trimmed. Empty pieces are kept so that joining the result with
/// the separator reproduces the input modulo whitespace; a blank input
/// yields no pieces at all. Unbalanced parentheses are tolerated: the depth
/// never drops below zero.
///
/// ```
/// use oxide_sqlgraph::split_top_level;
///
/// let items = split_top_level("a, coalesce(b, c), 'x,y'", ',');
/// assert_eq!(items, vec!["a", "coalesce(b, c)", "'x,y'"]);
/// ```
#[must_use]
pub fn split_top_level(text: &str, separator: char) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut cursor = Cursor::new(text);
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<Quote> = None;
    let mut piece_start = 0;

    while let Some(c) = cursor.peek() {
        let at = cursor.pos();
        cursor.advance();

        if c == '\\' && matches!(quote, Some(Quote::Single | Quote::Double)) {
            // An escaped character never toggles quote state
            cursor.advance();
            continue;
        }

        match quote {
            Some(active) => {
                if Quote::from_char(c) == Some(active) {
                    quote = None;
                }
            }
            None => {
                if let Some(opening) = Quote::from_char(c) {
                    quote = Some(opening);
                } else if c == '(' {
                    depth += 1;
                } else if c == ')' {
                    depth = depth.saturating_sub(1);
                } else if c == separator && depth == 0 {
                    pieces.push(text[piece_start..at].trim().to_string());
                    piece_start = cursor.pos();
                }
            }
        }
    }

    pieces.push(text[piece_start..].trim().to_string());
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input_yields_nothing() {
        assert!(split_top_level("", ',').is_empty());
        assert!(split_top_level("   ", ',').is_empty());
    }

    #[test]
    fn test_simple_list() {
        assert_eq!(split_top_level("a, b ,c", ','), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_respects_parentheses() {
        assert_eq!(
            split_top_level("count(a, b), (SELECT x, y FROM t) s", ','),
            vec!["count(a, b)", "(SELECT x, y FROM t) s"]
        );
    }

    #[test]
    fn test_respects_all_quote_styles() {
        assert_eq!(
            split_top_level(r#"'a,b', "c,d", `e,f`, g"#, ','),
            vec!["'a,b'", "\"c,d\"", "`e,f`", "g"]
        );
    }

    #[test]
    fn test_quote_styles_are_exclusive() {
        assert_eq!(
            split_top_level(r#"'say "hi", then', x"#, ','),
            vec![r#"'say "hi", then'"#, "x"]
        );
    }

    #[test]
    fn test_escaped_quotes_do_not_toggle() {
        assert_eq!(
            split_top_level(r"'it\'s, fine', b", ','),
            vec![r"'it\'s, fine'", "b"]
        );
    }

    #[test]
    fn test_backslash_is_literal_inside_backticks() {
        assert_eq!(
            split_top_level(r#""a\",b", `c\`, d"#, ','),
            vec![r#""a\",b""#, r"`c\`", "d"]
        );
    }

    #[test]
    fn test_parenthesis_inside_quotes_ignored() {
        assert_eq!(split_top_level("')', a, b", ','), vec!["')'", "a", "b"]);
    }

    #[test]
    fn test_unbalanced_parentheses_tolerated() {
        assert_eq!(split_top_level("a), b, (c, d", ','), vec!["a)", "b", "(c, d"]);
    }

    #[test]
    fn test_keeps_empty_pieces() {
        assert_eq!(split_top_level("a,,b,", ','), vec!["a", "", "b", ""]);
    }

    #[test]
    fn test_other_separator() {
        assert_eq!(
            split_top_level("s.t; (x; y)", ';'),
            vec!["s.t", "(x; y)"]
        );
    }
}
