use thiserror::Error;

pub type ValueResult<T> = Result<T, ValueError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("Inconsistent {what} dimensions: expected {expected} cells, found {actual}")]
    Dimension {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Oversized {what}: {columns}x{rows} cell count overflows usize")]
    Oversized {
        what: &'static str,
        columns: usize,
        rows: usize,
    },

    #[error("Index out of bounds: {what} (column={column}, row={row})")]
    IndexOob {
        what: &'static str,
        column: usize,
        row: usize,
    },

    #[error("Cyclic value: container {identity:#x} contains itself")]
    Cyclic { identity: usize },
}
