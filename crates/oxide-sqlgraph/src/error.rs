//! Error types for the analysis pipeline.
//!
//! None of these escape [`crate::analyze`]: each one is rendered into a
//! diagnostic string on the returned [`crate::AnalysisResult`].

/// Conditions that stop an analysis before a graph can be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyzeError {
    /// The query was empty once comments and whitespace were removed.
    #[error("Empty SQL query")]
    Empty,

    /// The statement is a write or DDL statement, not a SELECT.
    #[error("Only SELECT statements can be analyzed, found {0}")]
    NotASelect(String),

    /// A stage failed unexpectedly.
    #[error("Could not analyze SQL: {0}")]
    Internal(String),
}

/// Result type for analysis stages.
pub type Result<T> = std::result::Result<T, AnalyzeError>;
