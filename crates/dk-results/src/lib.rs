//! dk-results: reconstruction of hierarchical trees from flat view output.
//!
//! A view is a matrix whose first row names every column. Column names
//! encode the model path of the port that produced the column; the
//! reconstruction splits those names, grows one tree per view and copies
//! each column's time series in at its path.

pub mod assemble;
pub mod matrix;
pub mod path;
pub mod tree;

pub use assemble::{
    AssemblyOptions, BatchResults, FailurePolicy, ResultSetAssembler, batch_to_node, reconstruct,
    reconstruct_batch,
};
pub use matrix::{ResultMatrix, reconstruct_view};
pub use path::{PathSegments, TIME_COLUMN, parse_header};

use dk_value::ValueError;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ResultsError {
    #[error("Malformed header '{header}': {reason}")]
    MalformedHeader { header: String, reason: &'static str },

    #[error("Node kind conflict at '{path}': {reason}")]
    NodeKindConflict { path: String, reason: &'static str },

    #[error("Malformed output: {what}")]
    MalformedOutput { what: String },

    #[error("Cyclic value: container {identity:#x} contains itself")]
    CyclicValue { identity: usize },
}

impl From<ValueError> for ResultsError {
    fn from(err: ValueError) -> Self {
        match err {
            ValueError::Cyclic { identity } => ResultsError::CyclicValue { identity },
            other => ResultsError::MalformedOutput {
                what: other.to_string(),
            },
        }
    }
}
