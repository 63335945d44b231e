//! Query normalization: comment removal and whitespace collapsing.

use crate::lexer::Cursor;

/// Removes `--` and `/* */` comments and collapses every whitespace run to a
/// single space, trimming both ends.
///
/// Quoted literals and identifiers are copied verbatim, so comment markers
/// or repeated spaces inside `'...'`, `"..."` or `` `...` `` survive. An
/// unterminated block comment swallows the rest of the input.
#[must_use]
pub fn normalize(sql: &str) -> String {
    let mut cursor = Cursor::new(sql);
    let mut out = String::with_capacity(sql.len());
    let mut pending_space = false;

    while let Some(c) = cursor.peek() {
        if c == '-' && cursor.peek_next() == Some('-') {
            cursor.eat_while(|c| c != '\n');
            pending_space = true;
            continue;
        }
        if c == '/' && cursor.peek_next() == Some('*') {
            skip_block_comment(&mut cursor);
            pending_space = true;
            continue;
        }
        if c.is_whitespace() {
            cursor.advance();
            pending_space = true;
            continue;
        }

        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;

        if matches!(c, '\'' | '"' | '`') {
            copy_quoted(&mut cursor, &mut out, c);
        } else {
            out.push(c);
            cursor.advance();
        }
    }

    out
}

fn skip_block_comment(cursor: &mut Cursor<'_>) {
    cursor.advance();
    cursor.advance();
    loop {
        match cursor.advance() {
            Some('*') if cursor.peek() == Some('/') => {
                cursor.advance();
                return;
            }
            None => return,
            _ => {}
        }
    }
}

/// Copies a quoted run including both quotes; stops at end of input when the
/// quote is never closed.
fn copy_quoted(cursor: &mut Cursor<'_>, out: &mut String, quote: char) {
    let start = cursor.pos();
    cursor.advance();
    loop {
        match cursor.advance() {
            Some('\\') if quote != '`' => {
                cursor.advance();
            }
            Some(c) if c == quote => {
                if cursor.peek() == Some(quote) {
                    cursor.advance();
                } else {
                    break;
                }
            }
            Some(_) => {}
            None => break,
        }
    }
    out.push_str(cursor.slice_from(start));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(
            normalize("  SELECT  a,\n\tb\r\nFROM   t  "),
            "SELECT a, b FROM t"
        );
    }

    #[test]
    fn test_strips_line_comments() {
        assert_eq!(
            normalize("SELECT a -- the a column\nFROM t -- trailing"),
            "SELECT a FROM t"
        );
    }

    #[test]
    fn test_strips_block_comments() {
        assert_eq!(
            normalize("SELECT /* cols\n spanning lines */ a FROM/**/t"),
            "SELECT a FROM t"
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert_eq!(normalize("SELECT a FROM t /* never closed"), "SELECT a FROM t");
    }

    #[test]
    fn test_backslash_escape_rule_matches_lexer() {
        assert_eq!(normalize(r#"SELECT "a\"  b" FROM t"#), r#"SELECT "a\"  b" FROM t"#);
        assert_eq!(normalize("SELECT `c\\`  --x\n FROM t"), "SELECT `c\\` FROM t");
    }

    #[test]
    fn test_preserves_quoted_text() {
        assert_eq!(
            normalize("SELECT '--  not a comment', \"a  b\" FROM t"),
            "SELECT '--  not a comment', \"a  b\" FROM t"
        );
        assert_eq!(normalize(r"SELECT 'it\'s -- x' FROM t"), r"SELECT 'it\'s -- x' FROM t");
    }
}
