//! The analysis pipeline.
//!
//! normalize → extract clauses → register tables → attribute columns →
//! decompose joins → finish graph. Every stage degrades instead of failing;
//! the only way out is a diagnostic on the returned result.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::columns::attribute_columns;
use crate::error::{AnalyzeError, Result};
use crate::extract::{Clauses, JoinClause};
use crate::graph::GraphBuilder;
use crate::joins::decompose_join;
use crate::model::{AnalysisResult, JoinType};
use crate::normalize::normalize;
use crate::resolve::parse_table_and_alias;

/// Analyzes a SELECT statement into tables, join edges and diagnostics.
///
/// This never panics and never fails: malformed input yields a partial (or
/// empty) result with diagnostics explaining what was skipped.
///
/// ```
/// let result = oxide_sqlgraph::analyze(
///     "SELECT u.name, o.total FROM users u JOIN orders o ON u.id = o.user_id",
/// );
/// assert_eq!(result.tables.len(), 2);
/// assert_eq!(result.edges[0].source, "u");
/// assert_eq!(result.edges[0].target, "o");
/// ```
#[must_use]
pub fn analyze(sql: &str) -> AnalysisResult {
    match panic::catch_unwind(AssertUnwindSafe(|| try_analyze(sql))) {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => {
            debug!(%err, "analysis stopped");
            AnalysisResult::from_diagnostic(err.to_string())
        }
        Err(payload) => {
            let err = AnalyzeError::Internal(panic_message(payload.as_ref()));
            warn!(%err, "analysis panicked");
            AnalysisResult::from_diagnostic(err.to_string())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("unknown panic"))
}

/// Runs the pipeline, returning an error only for inputs that cannot yield
/// any graph at all.
///
/// # Errors
///
/// Returns [`AnalyzeError::Empty`] for blank input and
/// [`AnalyzeError::NotASelect`] for INSERT/UPDATE/DELETE statements.
pub fn try_analyze(sql: &str) -> Result<AnalysisResult> {
    let normalized = normalize(sql);
    if normalized.is_empty() {
        return Err(AnalyzeError::Empty);
    }

    let clauses = Clauses::extract(&normalized);
    if let Some(keyword) = clauses.other_statement {
        return Err(AnalyzeError::NotASelect(keyword.as_str().to_string()));
    }

    let mut builder = GraphBuilder::new();
    for error in &clauses.lex_errors {
        builder.diagnostic(error.clone());
    }

    if !clauses.has_select {
        builder.diagnostic("No SELECT clause found");
        return Ok(builder.finish());
    }
    if !clauses.has_from {
        builder.diagnostic("No FROM clause found");
        return Ok(builder.finish());
    }
    if clauses.from_tables.is_empty() {
        builder.diagnostic("FROM clause names no tables");
    }

    let mut previous = None;
    for item in &clauses.from_tables {
        previous = Some(builder.registry.register(&parse_table_and_alias(item)));
    }

    let mut joined = Vec::with_capacity(clauses.joins.len());
    for join in &clauses.joins {
        if join.table_expr.is_empty() {
            builder.diagnostic(format!("{} without a table", join.join_type));
        } else {
            if needs_condition(join) {
                builder.diagnostic(format!(
                    "{} on '{}' has no ON condition",
                    join.join_type, join.table_expr
                ));
            }
            let target = builder.registry.register(&parse_table_and_alias(&join.table_expr));
            joined.push((join, target.clone(), previous.replace(target)));
        }
        for item in &join.trailing_tables {
            previous = Some(builder.registry.register(&parse_table_and_alias(item)));
        }
    }

    attribute_columns(&clauses.select_part, &mut builder);

    for (join, target, previous) in joined {
        decompose_join(join, &target, previous.as_deref(), &mut builder);
    }

    debug!(
        tables = builder.registry.len(),
        edges = builder.edge_count(),
        "analysis finished"
    );
    Ok(builder.finish())
}

fn needs_condition(join: &JoinClause) -> bool {
    !matches!(join.join_type, JoinType::Cross | JoinType::Natural)
        && join.on_text.is_empty()
        && join.using_columns.is_empty()
}
