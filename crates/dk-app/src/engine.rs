//! Seam between the service layer and a discrete-event simulation engine.

use std::sync::Mutex;

use dk_project::Project;
use dk_value::Value;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("engine initialization failed: {0}")]
    Initialization(String),

    #[error("simulation failed: {0}")]
    Simulation(String),
}

/// A simulation engine able to execute an experiment.
///
/// `run` returns the single-run result set (a map from view name to view
/// matrix). `run_batch` returns the replicate grid, a matrix whose cells
/// are single-run result sets. `None` means the engine produced nothing.
pub trait SimulationEngine {
    /// Process-wide setup. Called at most once successfully per process.
    fn initialize(&self) -> Result<(), EngineError>;

    fn run(&self, project: &Project) -> Result<Option<Value>, EngineError>;

    fn run_batch(&self, project: &Project, threads: usize) -> Result<Option<Value>, EngineError>;
}

static INITIALIZED: Mutex<bool> = Mutex::new(false);

/// Initialize the engine runtime once per process.
///
/// Later calls are no-ops. A failed initialization is retried by the next
/// caller.
pub fn ensure_initialized(engine: &dyn SimulationEngine) -> Result<(), EngineError> {
    let mut done = INITIALIZED.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if *done {
        return Ok(());
    }
    engine.initialize()?;
    *done = true;
    tracing::debug!("engine runtime initialized");
    Ok(())
}
