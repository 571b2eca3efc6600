//! Error types for the dk-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates
/// behind one interface for frontends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read project file: {path}")]
    ProjectFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write project file: {path}")]
    ProjectFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported project file extension: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Value error: {0}")]
    Value(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for dk-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<dk_project::ProjectError> for AppError {
    fn from(err: dk_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<dk_results::ResultsError> for AppError {
    fn from(err: dk_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}

impl From<dk_value::ValueError> for AppError {
    fn from(err: dk_value::ValueError) -> Self {
        AppError::Value(err.to_string())
    }
}

impl From<crate::engine::EngineError> for AppError {
    fn from(err: crate::engine::EngineError) -> Self {
        AppError::Engine(err.to_string())
    }
}
