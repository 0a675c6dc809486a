use polyarea_edit::EditError;
use thiserror::Error;

/// Errors that can occur while running an edit session.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Script error: {0}")]
    Script(#[from] serde_json::Error),

    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    #[error("Step {step} failed: {source}")]
    Step { step: usize, source: EditError },
}
