//! Rendering of analysis results for the terminal.

use std::fmt::Write;

use serde::Serialize;

use oxide_sqlgraph::{AnalysisResult, PositionedTable, TableRef};

/// What the CLI prints: the analysis result plus optional positions.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    #[serde(flatten)]
    result: &'a AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    positions: Option<Vec<PositionedTable>>,
}

impl<'a> Report<'a> {
    pub const fn new(result: &'a AnalysisResult, positions: Option<Vec<PositionedTable>>) -> Self {
        Self { result, positions }
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    pub fn to_summary(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Tables ({}):", self.result.tables.len());
        for table in &self.result.tables {
            let _ = writeln!(out, "  {}", table_heading(table));
            for column in &table.columns {
                let _ = writeln!(out, "    - {}", column.label());
            }
        }

        let _ = writeln!(out, "Edges ({}):", self.result.edges.len());
        for edge in &self.result.edges {
            let _ = writeln!(
                out,
                "  {}.{} -> {}.{} [{}] {}",
                edge.source,
                edge.source_column,
                edge.target,
                edge.target_column,
                edge.join_type,
                edge.condition
            );
        }

        if let Some(positions) = &self.positions {
            let _ = writeln!(out, "Positions:");
            for placed in positions {
                let _ = writeln!(out, "  {} at ({:.1}, {:.1})", placed.table.id, placed.x, placed.y);
            }
        }

        if !self.result.diagnostics.is_empty() {
            let _ = writeln!(out, "Diagnostics:");
            for diagnostic in &self.result.diagnostics {
                let _ = writeln!(out, "  - {diagnostic}");
            }
        }

        out.trim_end().to_string()
    }
}

fn table_heading(table: &TableRef) -> String {
    let mut heading = table.id.clone();
    if table.name != table.id {
        let _ = write!(heading, " ({})", table.name);
    }
    if table.is_virtual {
        heading.push_str(" [unspecified]");
    } else if table.is_orphan {
        heading.push_str(" [orphan]");
    } else if table.is_subquery {
        heading.push_str(" [subquery]");
    }
    heading
}
