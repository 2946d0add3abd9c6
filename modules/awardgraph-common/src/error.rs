use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwardGraphError {
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Feed fetch error: {0}")]
    Fetch(String),

    #[error("Upsert error for {piid}: {message}")]
    Upsert { piid: String, message: String },

    #[error("Database error: {0}")]
    Database(String),
}

/// Per-entry extraction failure. A value, not a propagated error:
/// the pipeline collects these and keeps going.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    /// Feed-native id of the entry that failed.
    pub entry_id: String,
    /// Every required field that was missing or unparseable. Never empty.
    pub problems: Vec<FieldProblem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldProblem {
    pub field: String,
    pub problem: String,
}

impl FieldProblem {
    pub fn new(field: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            problem: problem.into(),
        }
    }
}

impl std::fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entry {}: ", self.entry_id)?;
        for (i, p) in self.problems.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", p.field, p.problem)?;
        }
        Ok(())
    }
}
