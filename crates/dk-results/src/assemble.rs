//! Assembly of whole run outputs: every view of a single run, or every
//! cell of a replicated batch.

use dk_value::{GenericNode, Mapping, ValueSource, ValueView, grid_len};
use serde::{Deserialize, Serialize};

use crate::matrix::reconstruct_view_with;
use crate::{ResultsError, ResultsResult};

/// What to do with a unit (column or view) that fails to reconstruct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Propagate the error to the caller.
    #[default]
    Fail,
    /// Leave the unit out of the result.
    Skip,
    /// Put a null leaf where the unit would have been.
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssemblyOptions {
    #[serde(default)]
    pub on_column_error: FailurePolicy,
    #[serde(default)]
    pub on_view_error: FailurePolicy,
}

/// Batch output indexed `[column][row]` of the replicate grid.
pub type BatchResults = Vec<Vec<Mapping>>;

#[derive(Debug, Clone, Default)]
pub struct ResultSetAssembler {
    options: AssemblyOptions,
}

impl ResultSetAssembler {
    pub fn new(options: AssemblyOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    /// Single run output, or nothing when the engine produced nothing.
    pub fn assemble(&self, output: Option<&dyn ValueSource>) -> ResultsResult<Option<Mapping>> {
        match output {
            Some(result_set) => self.reconstruct(result_set).map(Some),
            None => {
                tracing::warn!("no result set to assemble");
                Ok(None)
            }
        }
    }

    /// Batch output, or nothing when the engine produced nothing.
    pub fn assemble_batch(
        &self,
        output: Option<&dyn ValueSource>,
    ) -> ResultsResult<Option<BatchResults>> {
        match output {
            Some(list) => self.reconstruct_batch(list).map(Some),
            None => {
                tracing::warn!("no result list to assemble");
                Ok(None)
            }
        }
    }

    /// Rebuild every view of a single run.
    ///
    /// `result_set` must be a map from view name to view matrix. The
    /// returned mapping holds one tree per view under the view's name.
    pub fn reconstruct(&self, result_set: &dyn ValueSource) -> ResultsResult<Mapping> {
        let views = match result_set.view() {
            ValueView::Map(views) => views,
            other => {
                return Err(ResultsError::MalformedOutput {
                    what: format!("result set must be a map of views, found {}", other.type_name()),
                });
            }
        };

        let mut out = Mapping::new();
        for (name, view) in views {
            match reconstruct_view_with(view.as_ref(), &self.options) {
                Ok(tree) => {
                    out.insert(name.into_owned(), GenericNode::Mapping(tree));
                }
                Err(err) => match self.options.on_view_error {
                    FailurePolicy::Fail => return Err(err),
                    FailurePolicy::Skip => {
                        tracing::warn!(view = %name, error = %err, "skipping view");
                    }
                    FailurePolicy::Null => {
                        tracing::warn!(view = %name, error = %err, "nulling view");
                        out.insert(name.into_owned(), GenericNode::null());
                    }
                },
            }
        }
        Ok(out)
    }

    /// Rebuild a replicate grid. `list` must be a matrix whose every cell
    /// is a single-run result set; the output is indexed `[column][row]`.
    ///
    /// Cells are never skipped or nulled: callers match positions to
    /// experiment combinations.
    pub fn reconstruct_batch(&self, list: &dyn ValueSource) -> ResultsResult<BatchResults> {
        let (columns, rows, cells) = match list.view() {
            ValueView::Matrix {
                columns,
                rows,
                cells,
            } => (columns, rows, cells),
            other => {
                return Err(ResultsError::MalformedOutput {
                    what: format!("result list must be a matrix, found {}", other.type_name()),
                });
            }
        };
        if cells.len() != grid_len("result list", columns, rows)? {
            return Err(ResultsError::MalformedOutput {
                what: format!(
                    "result list declares {columns}x{rows} but holds {} cells",
                    cells.len()
                ),
            });
        }

        let mut batch = Vec::with_capacity(columns);
        for column in 0..columns {
            let mut line = Vec::with_capacity(rows);
            for row in 0..rows {
                let cell = cells[row * columns + column].as_deref().ok_or_else(|| {
                    ResultsError::MalformedOutput {
                        what: format!("result list cell ({column}, {row}) is empty"),
                    }
                })?;
                line.push(self.reconstruct(cell)?);
                tracing::debug!(column, row, "reconstructed replicate");
            }
            batch.push(line);
        }
        Ok(batch)
    }
}

/// Rebuild a single run with default options.
pub fn reconstruct(result_set: &dyn ValueSource) -> ResultsResult<Mapping> {
    ResultSetAssembler::default().reconstruct(result_set)
}

/// Rebuild a replicate grid with default options.
pub fn reconstruct_batch(list: &dyn ValueSource) -> ResultsResult<BatchResults> {
    ResultSetAssembler::default().reconstruct_batch(list)
}

/// Batch output as one generic tree (a sequence of sequences).
pub fn batch_to_node(batch: BatchResults) -> GenericNode {
    GenericNode::Sequence(
        batch
            .into_iter()
            .map(|line| GenericNode::Sequence(line.into_iter().map(GenericNode::Mapping).collect()))
            .collect(),
    )
}
