//! Reconstruction of one view matrix into a tree.

use dk_value::{Child, GenericNode, Mapping, ValueSource, ValueView, encode, grid_len};

use crate::assemble::{AssemblyOptions, FailurePolicy};
use crate::path::{PathSegments, TIME_COLUMN, parse_header};
use crate::tree;
use crate::{ResultsError, ResultsResult};

/// A view's output: row 0 holds column headers, rows `1..rows` hold one
/// optional value per column and time step.
pub struct ResultMatrix<'a> {
    columns: usize,
    rows: usize,
    cells: Vec<Option<Child<'a>>>,
}

impl<'a> ResultMatrix<'a> {
    /// View `source` as a result matrix; it must carry a matrix with a
    /// cell count matching its shape.
    pub fn from_source(source: &'a dyn ValueSource) -> ResultsResult<Self> {
        match source.view() {
            ValueView::Matrix {
                columns,
                rows,
                cells,
            } => {
                if cells.len() != grid_len("matrix", columns, rows)? {
                    return Err(ResultsError::MalformedOutput {
                        what: format!(
                            "matrix declares {columns}x{rows} but holds {} cells",
                            cells.len()
                        ),
                    });
                }
                if rows == 0 && columns > 0 {
                    return Err(ResultsError::MalformedOutput {
                        what: "matrix has columns but no header row".to_string(),
                    });
                }
                Ok(Self {
                    columns,
                    rows,
                    cells,
                })
            }
            other => Err(ResultsError::MalformedOutput {
                what: format!("expected a matrix, found {}", other.type_name()),
            }),
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of time steps below the header row.
    pub fn data_rows(&self) -> usize {
        self.rows.saturating_sub(1)
    }

    pub fn cell(&self, column: usize, row: usize) -> Option<&dyn ValueSource> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells[row * self.columns + column].as_deref()
    }

    /// Header string of `column`.
    pub fn header(&self, column: usize) -> ResultsResult<String> {
        let cell = self
            .cell(column, 0)
            .ok_or_else(|| ResultsError::MalformedOutput {
                what: format!("column {column} has no header"),
            })?;
        match cell.view() {
            ValueView::String(s) | ValueView::Xml(s) => Ok(s.into_owned()),
            other => Err(ResultsError::MalformedOutput {
                what: format!(
                    "column {column} header is a {}, expected a string",
                    other.type_name()
                ),
            }),
        }
    }

    /// Encoded data rows of `column`; empty cells become null leaves.
    pub fn series(&self, column: usize) -> ResultsResult<GenericNode> {
        let mut series = Vec::with_capacity(self.data_rows());
        for row in 1..self.rows {
            series.push(match self.cell(column, row) {
                Some(cell) => encode(cell)?,
                None => GenericNode::null(),
            });
        }
        Ok(GenericNode::Sequence(series))
    }

    fn column_path(&self, column: usize) -> ResultsResult<PathSegments> {
        let header = self.header(column)?;
        if header == TIME_COLUMN {
            return Ok(PathSegments::single(TIME_COLUMN));
        }
        parse_header(&header)
    }
}

/// Rebuild one view with default options.
pub fn reconstruct_view(source: &dyn ValueSource) -> ResultsResult<Mapping> {
    reconstruct_view_with(source, &AssemblyOptions::default())
}

/// Rebuild one view; column failures are handled per
/// `options.on_column_error`.
pub fn reconstruct_view_with(
    source: &dyn ValueSource,
    options: &AssemblyOptions,
) -> ResultsResult<Mapping> {
    let matrix = ResultMatrix::from_source(source)?;
    let mut root = Mapping::new();

    for column in 0..matrix.columns() {
        let path = match matrix.column_path(column) {
            Ok(path) => path,
            Err(err) => {
                // Without a path there is nowhere to put a null either.
                if options.on_column_error == FailurePolicy::Fail {
                    return Err(err);
                }
                tracing::warn!(column, error = %err, "skipping column with unusable header");
                continue;
            }
        };

        let inserted = matrix
            .series(column)
            .and_then(|series| tree::insert(&mut root, &path, series));
        if let Err(err) = inserted {
            match options.on_column_error {
                FailurePolicy::Fail => return Err(err),
                FailurePolicy::Skip => {
                    tracing::warn!(column, %path, error = %err, "skipping column");
                }
                FailurePolicy::Null => {
                    tracing::warn!(column, %path, error = %err, "nulling column");
                    if let Err(err) = tree::insert(&mut root, &path, GenericNode::null()) {
                        tracing::warn!(column, %path, error = %err, "cannot place null column");
                    }
                }
            }
        }
    }

    tracing::debug!(
        columns = matrix.columns(),
        steps = matrix.data_rows(),
        "reconstructed view"
    );
    Ok(root)
}
