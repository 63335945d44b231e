//! Data model produced by the analyzer.
//!
//! Every type here is plain data: it derives `serde` traits with camelCase
//! field names so a rendering front end can consume it as JSON directly.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the synthetic table that collects unqualified columns.
pub const UNSPECIFIED_TABLE_ID: &str = "__unspecified__";

/// Display name of the synthetic table that collects unqualified columns.
pub const UNSPECIFIED_TABLE_NAME: &str = "(unspecified)";

/// A column expression from the SELECT list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRef {
    /// Column name without its qualifier; `None` for function expressions.
    pub name: Option<String>,
    /// Output alias (`AS alias` or a trailing bare identifier).
    pub alias: Option<String>,
    /// The select item as written, without its alias.
    pub expression: String,
    /// Whether the expression is a function call.
    pub is_function: bool,
}

impl ColumnRef {
    /// A plain column reference.
    #[must_use]
    pub fn named(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            alias: None,
            expression: expression.into(),
            is_function: false,
        }
    }

    /// A function-call expression such as `count(*)`.
    #[must_use]
    pub fn function(expression: impl Into<String>) -> Self {
        Self {
            name: None,
            alias: None,
            expression: expression.into(),
            is_function: true,
        }
    }

    /// The `*` wildcard.
    #[must_use]
    pub fn wildcard() -> Self {
        Self::named("*", "*")
    }

    /// Sets the output alias.
    #[must_use]
    pub fn with_alias(mut self, alias: Option<String>) -> Self {
        self.alias = alias;
        self
    }

    /// The label a diagram shows for this column.
    #[must_use]
    pub fn label(&self) -> &str {
        self.alias
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.expression)
    }
}

/// A table (or subquery, or synthetic bucket) in the diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    /// Normalized alias-or-name; unique within one analysis.
    pub id: String,
    /// Table name as written (schema-qualified names included), or the
    /// parenthesized body of a subquery.
    pub name: String,
    /// Alias as written.
    pub alias: Option<String>,
    /// Whether this entry is a derived table.
    pub is_subquery: bool,
    /// Whether this is the bucket for unqualified columns.
    pub is_virtual: bool,
    /// Whether this entry was synthesized for an unknown column qualifier.
    pub is_orphan: bool,
    /// Columns attributed to this table, in SELECT order.
    pub columns: Vec<ColumnRef>,
}

impl TableRef {
    /// Returns true for tables that appear in FROM or JOIN.
    #[must_use]
    pub const fn is_real(&self) -> bool {
        !self.is_virtual && !self.is_orphan
    }
}

/// The kind of join that produced an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    /// `INNER JOIN`
    #[serde(rename = "inner join")]
    Inner,
    /// `LEFT [OUTER] JOIN`
    #[serde(rename = "left join")]
    Left,
    /// `RIGHT [OUTER] JOIN`
    #[serde(rename = "right join")]
    Right,
    /// `FULL [OUTER] JOIN`
    #[serde(rename = "full join")]
    Full,
    /// `CROSS JOIN`
    #[serde(rename = "cross join")]
    Cross,
    /// `NATURAL [...] JOIN`
    #[serde(rename = "natural join")]
    Natural,
    /// Bare `JOIN`
    #[serde(rename = "join")]
    Plain,
}

impl JoinType {
    /// The lowercase label used in diagrams and JSON.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "inner join",
            Self::Left => "left join",
            Self::Right => "right join",
            Self::Full => "full join",
            Self::Cross => "cross join",
            Self::Natural => "natural join",
            Self::Plain => "join",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed relationship derived from one atomic join condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Unique edge identifier within one analysis.
    pub id: String,
    /// Id of the table on the left-hand side of the condition.
    pub source: String,
    /// Id of the table on the right-hand side of the condition.
    pub target: String,
    /// The join that carried the condition.
    pub join_type: JoinType,
    /// The atomic condition as written, e.g. `u.id = o.user_id`.
    pub condition: String,
    /// Column on the source side.
    pub source_column: String,
    /// Column on the target side.
    pub target_column: String,
    /// Comparison operator, lowercased (`=`, `<>`, `like`, `not in`, ...).
    pub operator: String,
}

/// The outcome of analyzing one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Tables in registration order.
    pub tables: Vec<TableRef>,
    /// Join edges in source order.
    pub edges: Vec<Edge>,
    /// Human-readable, non-fatal problems found during analysis.
    pub diagnostics: Vec<String>,
}

impl AnalysisResult {
    /// A result carrying only a diagnostic.
    #[must_use]
    pub fn from_diagnostic(message: impl Into<String>) -> Self {
        Self {
            diagnostics: vec![message.into()],
            ..Self::default()
        }
    }

    /// Looks up a table by id.
    #[must_use]
    pub fn table(&self, id: &str) -> Option<&TableRef> {
        self.tables.iter().find(|t| t.id == id)
    }
}

/// A table placed on the diagram canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedTable {
    /// The table being placed.
    #[serde(flatten)]
    pub table: TableRef,
    /// Horizontal coordinate of the table's center.
    pub x: f64,
    /// Vertical coordinate of the table's center.
    pub y: f64,
}
