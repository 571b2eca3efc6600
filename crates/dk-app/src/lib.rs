//! Shared application service layer for the devs kit.
//!
//! Frontends go through this crate to load and edit experiments, drive a
//! simulation engine and turn its raw output into generic result trees.

pub mod engine;
pub mod error;
pub mod progress;
pub mod project_service;
pub mod run_service;
pub mod session;

// Re-export key types for convenience
pub use engine::{EngineError, SimulationEngine, ensure_initialized};
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage};
pub use project_service::{condition_show, load_project, save_project};
pub use run_service::{RunMode, RunOptions, RunResponse, RunResults, compute_run_id};
pub use session::{OUTPUT_PACKAGE, STORAGE_PLUGIN, Session};
