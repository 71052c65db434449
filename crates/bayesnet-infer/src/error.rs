//! Error types for network construction and query evaluation.

use thiserror::Error;

/// Errors that can occur while building a network or answering a query.
///
/// Construction errors (`CyclicNetwork`, `UnresolvedReference`,
/// `TableSizeMismatch`, `InvalidNetwork`, `NetworkFormat`, `Io`) abort network
/// loading entirely. The remaining variants are per-query and leave the
/// network usable for later queries.
#[derive(Error, Debug)]
pub enum BnError {
    /// The parent/child graph contains a cycle through `variable`.
    #[error("Network contains a cycle through variable {variable}")]
    CyclicNetwork { variable: String },

    /// A CPT refers to a variable that was never declared.
    #[error("CPT for {cpt} references unknown variable {name}")]
    UnresolvedReference { cpt: String, name: String },

    /// A CPT table does not have one entry per (value, parent assignment).
    #[error("CPT for {variable} has {actual} entries, expected {expected}")]
    TableSizeMismatch {
        variable: String,
        expected: usize,
        actual: usize,
    },

    /// Structural problem other than a cycle or a dangling reference.
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    /// Query text does not follow the `P(...)` grammar or names an unknown
    /// variable or outcome.
    #[error("Malformed query '{query}': {reason}")]
    MalformedQuery { query: String, reason: String },

    /// Algorithm selector outside of {1, 2, 3}.
    #[error("Invalid algorithm selector: {0} (expected 1, 2 or 3)")]
    InvalidAlgorithm(String),

    /// Total probability mass is zero, so the factor cannot be normalized.
    #[error("Cannot normalize factor: total probability is zero")]
    DegenerateFactor,

    /// A factor or CPT was evaluated without a value for one of its variables.
    #[error("Assignment has no value for variable {variable}")]
    IncompleteAssignment { variable: String },

    /// An outcome index beyond the variable's domain.
    #[error("Outcome index {index} out of range for variable {variable} with cardinality {cardinality}")]
    ValueOutOfRange {
        variable: String,
        index: usize,
        cardinality: usize,
    },

    /// Factor table size or variable cardinalities disagree.
    #[error("Dimension mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch { expected: Vec<usize>, got: Vec<usize> },

    /// The network definition document could not be parsed.
    #[error("Network format error: {0}")]
    NetworkFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BnError {
    /// Shorthand for building a [`BnError::MalformedQuery`].
    pub fn malformed(query: &str, reason: impl Into<String>) -> Self {
        Self::MalformedQuery {
            query: query.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error leaves the network usable for further queries.
    pub fn is_per_query(&self) -> bool {
        matches!(
            self,
            Self::MalformedQuery { .. }
                | Self::InvalidAlgorithm(_)
                | Self::DegenerateFactor
                | Self::IncompleteAssignment { .. }
                | Self::ValueOutOfRange { .. }
        )
    }
}

/// Result type for network and inference operations.
pub type Result<T> = std::result::Result<T, BnError>;
