//! Table registry and graph assembly.
//!
//! The registry is the single accumulator threaded through the pipeline: FROM
//! items, JOIN targets, orphans and the unspecified bucket are all keyed by
//! table id here, and the first registration of an id wins.

use std::collections::HashMap;

use tracing::debug;

use crate::model::{
    AnalysisResult, ColumnRef, Edge, JoinType, TableRef, UNSPECIFIED_TABLE_ID,
    UNSPECIFIED_TABLE_NAME,
};
use crate::resolve::{last_segment, normalize_identifier, ParsedTable};

/// Tables discovered so far, in registration order, keyed by id.
#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: Vec<TableRef>,
    index: HashMap<String, usize>,
}

impl TableRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Returns true if a table with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Looks up a table by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TableRef> {
        self.index.get(id).map(|&i| &self.tables[i])
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut TableRef> {
        self.index.get(id).map(|&i| &mut self.tables[i])
    }

    fn insert(&mut self, table: TableRef) -> String {
        let id = table.id.clone();
        if !self.index.contains_key(&id) {
            self.index.insert(id.clone(), self.tables.len());
            self.tables.push(table);
        }
        id
    }

    /// Registers a FROM/JOIN table and returns its id.
    ///
    /// A second table with an id already present is merged into the first:
    /// the registry keeps the first-seen entry untouched.
    pub fn register(&mut self, parsed: &ParsedTable) -> String {
        let id = parsed.id();
        if self.contains(&id) {
            debug!(%id, name = %parsed.name, "duplicate table id, keeping first registration");
            return id;
        }
        self.insert(TableRef {
            id,
            name: parsed.name.clone(),
            alias: parsed.alias.clone(),
            is_subquery: parsed.is_subquery,
            is_virtual: false,
            is_orphan: false,
            columns: Vec::new(),
        })
    }

    /// Resolves a qualifier (`u` in `u.id`) to a table id.
    ///
    /// A direct id match wins; otherwise every table is scanned comparing
    /// its normalized alias, then the last segment of its name.
    #[must_use]
    pub fn resolve(&self, qualifier: &str) -> Option<String> {
        let key = normalize_identifier(qualifier);
        if key.is_empty() {
            return None;
        }
        if self.contains(&key) {
            return Some(key);
        }
        self.tables
            .iter()
            .filter(|t| !t.is_virtual)
            .find(|t| {
                t.alias
                    .as_deref()
                    .is_some_and(|alias| normalize_identifier(alias) == key)
                    || normalize_identifier(last_segment(&t.name)) == key
            })
            .map(|t| t.id.clone())
    }

    /// Returns the id of the orphan table for an unknown qualifier,
    /// creating it on first use.
    pub fn orphan(&mut self, qualifier: &str) -> String {
        self.insert(TableRef {
            id: normalize_identifier(qualifier),
            name: qualifier.to_string(),
            alias: None,
            is_subquery: false,
            is_virtual: false,
            is_orphan: true,
            columns: Vec::new(),
        })
    }

    /// Returns the id of the bucket for unqualified columns, creating it on
    /// first use.
    pub fn unspecified(&mut self) -> String {
        self.insert(TableRef {
            id: UNSPECIFIED_TABLE_ID.to_string(),
            name: UNSPECIFIED_TABLE_NAME.to_string(),
            alias: None,
            is_subquery: false,
            is_virtual: true,
            is_orphan: false,
            columns: Vec::new(),
        })
    }

    /// Appends a column to a table. Unknown ids are ignored.
    pub fn add_column(&mut self, id: &str, column: ColumnRef) {
        if let Some(table) = self.get_mut(id) {
            table.columns.push(column);
        }
    }

    /// Ids of tables registered from FROM/JOIN, in order.
    #[must_use]
    pub fn real_ids(&self) -> Vec<String> {
        self.tables
            .iter()
            .filter(|t| t.is_real())
            .map(|t| t.id.clone())
            .collect()
    }

    /// Consumes the registry, yielding tables in registration order.
    #[must_use]
    pub fn into_tables(self) -> Vec<TableRef> {
        self.tables
    }
}

/// One resolved side of a join condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeEnd {
    /// Table id.
    pub table: String,
    /// Column name.
    pub column: String,
}

/// Collects tables, edges and diagnostics into an [`AnalysisResult`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    /// The table registry being built.
    pub registry: TableRegistry,
    edges: Vec<Edge>,
    diagnostics: Vec<String>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a non-fatal diagnostic.
    pub fn diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics.push(message.into());
    }

    /// Adds an edge between two resolved ends.
    ///
    /// Returns false (and adds nothing) when an end is not a registered
    /// table or both ends are the same table.
    pub fn add_edge(
        &mut self,
        join_type: JoinType,
        source: EdgeEnd,
        target: EdgeEnd,
        operator: &str,
        condition: &str,
    ) -> bool {
        if source.table == target.table
            || !self.registry.contains(&source.table)
            || !self.registry.contains(&target.table)
        {
            return false;
        }
        let id = format!("{}-{}-{}", source.table, target.table, self.edges.len());
        self.edges.push(Edge {
            id,
            source: source.table,
            target: target.table,
            join_type,
            condition: condition.to_string(),
            source_column: source.column,
            target_column: target.column,
            operator: operator.to_string(),
        });
        true
    }

    /// Number of edges added so far.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Produces the final result.
    #[must_use]
    pub fn finish(self) -> AnalysisResult {
        let tables = self.registry.into_tables();
        let edges = self
            .edges
            .into_iter()
            .filter(|e| {
                e.source != e.target
                    && tables.iter().any(|t| t.id == e.source)
                    && tables.iter().any(|t| t.id == e.target)
            })
            .collect();
        AnalysisResult {
            tables,
            edges,
            diagnostics: self.diagnostics,
        }
    }
}
