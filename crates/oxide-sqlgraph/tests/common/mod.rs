#![allow(dead_code)]

use oxide_sqlgraph::{analyze, AnalysisResult, Edge, TableRef};

pub fn analyzed(sql: &str) -> AnalysisResult {
    analyze(sql)
}

pub fn table<'a>(result: &'a AnalysisResult, id: &str) -> &'a TableRef {
    result
        .table(id)
        .unwrap_or_else(|| panic!("Expected table '{id}', got {:?}", table_ids(result)))
}

pub fn table_ids(result: &AnalysisResult) -> Vec<&str> {
    result.tables.iter().map(|t| t.id.as_str()).collect()
}

pub fn column_names(table: &TableRef) -> Vec<&str> {
    table.columns.iter().map(|c| c.label()).collect()
}

pub fn edge_pairs(result: &AnalysisResult) -> Vec<(&str, &str)> {
    result
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect()
}

pub fn only_edge(result: &AnalysisResult) -> &Edge {
    assert_eq!(
        result.edges.len(),
        1,
        "Expected exactly one edge, got {:?}",
        result.edges
    );
    &result.edges[0]
}

/// Checks the structural guarantees every result must uphold: unique table
/// ids, no dangling edges and no self-loops.
pub fn assert_well_formed(result: &AnalysisResult) {
    let ids = table_ids(result);
    for (i, id) in ids.iter().enumerate() {
        assert!(
            !ids[i + 1..].contains(id),
            "Duplicate table id '{id}' in {ids:?}"
        );
    }
    for edge in &result.edges {
        assert!(ids.contains(&edge.source.as_str()), "Dangling source: {edge:?}");
        assert!(ids.contains(&edge.target.as_str()), "Dangling target: {edge:?}");
        assert_ne!(edge.source, edge.target, "Self-loop: {edge:?}");
    }
}
