//! # oxide-sqlgraph
//!
//! A structural analyzer for SQL SELECT statements.
//!
//! The analyzer turns a raw, possibly malformed query into a graph of tables,
//! the columns selected from them, and the join conditions relating them,
//! ready to be drawn as a diagram. It is not a full SQL parser: it extracts
//! just enough structure for a picture and never rejects input.
//!
//! This crate provides:
//! - A small tolerant lexer and a top-level splitter aware of parentheses
//!   and quoting
//! - Clause extraction for SELECT, FROM and JOIN
//! - Alias resolution and column-to-table attribution
//! - Join-condition decomposition into directed edges
//! - A deterministic circular layout
//!
//! ## Example
//!
//! ```rust
//! use oxide_sqlgraph::{analyze, layout, LayoutOptions};
//!
//! let result = analyze(
//!     "SELECT x.y FROM a LEFT JOIN b ON a.id = b.a_id WHERE 1=1",
//! );
//!
//! // `x` is not a known table, so it shows up as an orphan
//! let ids: Vec<_> = result.tables.iter().map(|t| t.id.as_str()).collect();
//! assert_eq!(ids, ["a", "b", "x"]);
//! assert!(result.tables[2].is_orphan);
//! assert_eq!(result.edges[0].join_type.as_str(), "left join");
//!
//! let positions = layout(&result.tables, &LayoutOptions::default());
//! assert_eq!(positions.len(), 3);
//! ```
//!
//! ## Graceful degradation
//!
//! Problems never surface as errors. Empty input, a missing FROM, unknown
//! qualifiers or unterminated literals each add a human-readable entry to
//! [`AnalysisResult::diagnostics`] and analysis continues with what it has.

pub mod analyzer;
pub mod columns;
pub mod error;
pub mod extract;
pub mod graph;
pub mod joins;
pub mod layout;
pub mod lexer;
pub mod model;
pub mod normalize;
pub mod resolve;
pub mod split;

pub use analyzer::{analyze, try_analyze};
pub use error::{AnalyzeError, Result};
pub use extract::{extract_from_tables, extract_join_clauses, extract_select_part, JoinClause};
pub use layout::{layout, LayoutOptions};
pub use model::{
    AnalysisResult, ColumnRef, Edge, JoinType, PositionedTable, TableRef, UNSPECIFIED_TABLE_ID,
};
pub use normalize::normalize;
pub use resolve::{parse_table_and_alias, ParsedTable};
pub use split::split_top_level;
