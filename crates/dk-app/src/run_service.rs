//! Run execution service.

use std::time::Instant;

use dk_project::Project;
use dk_results::{AssemblyOptions, BatchResults, ResultSetAssembler, batch_to_node};
use dk_value::{GenericNode, Mapping, ValueSource};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::engine::SimulationEngine;
use crate::error::{AppError, AppResult};
use crate::progress::{RunProgressEvent, RunStage};
use crate::session::Session;

/// How the experiment is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// One execution of the experiment.
    Single,
    /// Replicated executions laid out on a grid.
    Batch,
}

/// Options for running simulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    #[serde(default)]
    pub assembly: AssemblyOptions,
    /// Worker threads handed to the engine for batch runs.
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_threads() -> usize {
    1
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            assembly: AssemblyOptions::default(),
            threads: default_threads(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunResults {
    Single(Mapping),
    Batch(BatchResults),
    /// The engine returned nothing.
    NoResult,
}

impl RunResults {
    /// Results as one generic tree; `None` when there is no result.
    pub fn into_node(self) -> Option<GenericNode> {
        match self {
            RunResults::Single(tree) => Some(GenericNode::Mapping(tree)),
            RunResults::Batch(batch) => Some(batch_to_node(batch)),
            RunResults::NoResult => None,
        }
    }
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub mode: RunMode,
    pub finished_at: String,
    pub elapsed_wall_s: f64,
    pub results: RunResults,
}

/// Content hash identifying a run of `project` in `mode`.
pub fn compute_run_id(project: &Project, mode: RunMode) -> String {
    let mut hasher = Sha256::new();

    let project_json = serde_json::to_string(project).unwrap_or_default();
    hasher.update(project_json.as_bytes());

    let mode_json = serde_json::to_string(&mode).unwrap_or_default();
    hasher.update(mode_json.as_bytes());

    format!("{:x}", hasher.finalize())
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    mode: RunMode,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            mode,
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

/// Execute the session's experiment and assemble the engine output.
pub fn run<E: SimulationEngine>(
    session: &Session<E>,
    mode: RunMode,
    options: &RunOptions,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();

    if mode == RunMode::Batch && options.threads == 0 {
        return Err(AppError::InvalidInput(
            "batch runs need at least one thread".to_string(),
        ));
    }

    emit_progress(
        &mut progress_cb,
        mode,
        RunStage::PreparingProject,
        started,
        Some("Preparing project".to_string()),
    );
    let project = session.prepared_project();
    let run_id = compute_run_id(&project, mode);

    emit_progress(
        &mut progress_cb,
        mode,
        RunStage::RunningEngine,
        started,
        Some("Running engine".to_string()),
    );
    let output = match mode {
        RunMode::Single => session.engine().run(&project)?,
        RunMode::Batch => session.engine().run_batch(&project, options.threads)?,
    };

    emit_progress(
        &mut progress_cb,
        mode,
        RunStage::AssemblingResults,
        started,
        Some("Assembling results".to_string()),
    );
    let assembler = ResultSetAssembler::new(options.assembly);
    let source = output.as_ref().map(|value| value as &dyn ValueSource);
    let results = match mode {
        RunMode::Single => assembler.assemble(source)?.map(RunResults::Single),
        RunMode::Batch => assembler.assemble_batch(source)?.map(RunResults::Batch),
    }
    .unwrap_or(RunResults::NoResult);

    let elapsed_wall_s = started.elapsed().as_secs_f64();
    emit_progress(
        &mut progress_cb,
        mode,
        RunStage::Completed,
        started,
        None,
    );
    tracing::debug!(run_id = %run_id, ?mode, elapsed_wall_s, "run finished");

    Ok(RunResponse {
        run_id,
        mode,
        finished_at: chrono::Utc::now().to_rfc3339(),
        elapsed_wall_s,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_depends_on_mode_and_project() {
        let project = Project::new("p", 1.0);
        let single = compute_run_id(&project, RunMode::Single);

        assert_eq!(single, compute_run_id(&project, RunMode::Single));
        assert_ne!(single, compute_run_id(&project, RunMode::Batch));
        assert_eq!(single.len(), 64);

        let mut other = project.clone();
        other.experiment.seed = 1;
        assert_ne!(single, compute_run_id(&other, RunMode::Single));
    }

    #[test]
    fn options_default_to_one_thread() {
        let options: RunOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, RunOptions::default());
        assert_eq!(options.threads, 1);
    }
}
