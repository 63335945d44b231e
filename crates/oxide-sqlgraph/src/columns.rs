//! SELECT-list parsing and column-to-table attribution.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::graph::GraphBuilder;
use crate::model::ColumnRef;
use crate::resolve::{last_segment, split_trailing_alias, unquote_identifier, IDENT};
use crate::split::split_top_level;

/// `table.column`, `schema.table.column` or `table.*`.
static QUALIFIED_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^((?:{IDENT}\s*\.\s*)*{IDENT})\s*\.\s*({IDENT}|\*)$"
    ))
    .expect("valid qualified column regex")
});

/// An identifier immediately followed by an opening parenthesis.
static FUNCTION_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}_][\w$]*\s*\(").expect("valid function call regex")
});

/// One parsed SELECT item before attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// The table qualifier as written, for qualified columns.
    pub qualifier: Option<String>,
    /// The column itself.
    pub column: ColumnRef,
}

/// Parses one SELECT item.
///
/// Classification order: qualified reference, then function call, then
/// bare column.
#[must_use]
pub fn parse_select_item(item: &str) -> ColumnDescriptor {
    let item = item.trim();
    let (expression, alias) = match split_trailing_alias(item) {
        Some((expression, alias)) => (expression, Some(unquote_identifier(alias).to_string())),
        None => (item, None),
    };

    if let Some(caps) = QUALIFIED_COLUMN.captures(expression) {
        return ColumnDescriptor {
            qualifier: Some(last_segment(&caps[1]).to_string()),
            column: ColumnRef::named(unquote_identifier(&caps[2]), expression).with_alias(alias),
        };
    }

    if FUNCTION_CALL.is_match(expression) {
        return ColumnDescriptor {
            qualifier: None,
            column: ColumnRef::function(expression).with_alias(alias),
        };
    }

    ColumnDescriptor {
        qualifier: None,
        column: ColumnRef::named(unquote_identifier(expression), expression).with_alias(alias),
    }
}

/// Parses the whole SELECT list.
///
/// A bare `*` or an empty list yields the single wildcard descriptor.
#[must_use]
pub fn parse_select_list(select_part: &str) -> Vec<ColumnDescriptor> {
    let select_part = select_part.trim();
    if select_part.is_empty() || select_part == "*" {
        return vec![ColumnDescriptor {
            qualifier: None,
            column: ColumnRef::wildcard(),
        }];
    }
    split_top_level(select_part, ',')
        .iter()
        .filter(|item| !item.is_empty())
        .map(|item| parse_select_item(item))
        .collect()
}

/// Parses the SELECT list and attaches every column to a table.
///
/// Qualified columns go to the table their qualifier resolves to, or to a
/// new orphan table when it resolves to nothing. Unqualified columns and
/// function expressions go to the unspecified bucket. A bare `*`, alone or
/// mixed with other items, is attached to every FROM/JOIN table, or to the
/// bucket when there are none.
pub fn attribute_columns(select_part: &str, builder: &mut GraphBuilder) {
    for descriptor in parse_select_list(select_part) {
        let id = match &descriptor.qualifier {
            Some(qualifier) => match builder.registry.resolve(qualifier) {
                Some(id) => id,
                None => {
                    debug!(%qualifier, "unknown column qualifier, creating orphan table");
                    builder.diagnostic(format!(
                        "Unknown table reference '{qualifier}' in column '{}'",
                        descriptor.column.expression
                    ));
                    builder.registry.orphan(qualifier)
                }
            },
            None if descriptor.column == ColumnRef::wildcard() => {
                attach_wildcard(builder);
                continue;
            }
            None => builder.registry.unspecified(),
        };
        builder.registry.add_column(&id, descriptor.column);
    }
}

fn attach_wildcard(builder: &mut GraphBuilder) {
    let ids = builder.registry.real_ids();
    if ids.is_empty() {
        let bucket = builder.registry.unspecified();
        builder.registry.add_column(&bucket, ColumnRef::wildcard());
    }
    for id in ids {
        builder.registry.add_column(&id, ColumnRef::wildcard());
    }
}
