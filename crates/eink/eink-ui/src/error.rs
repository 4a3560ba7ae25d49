//! Error types for the display side and the frame loop.

use eink_input::InputError;

/// Display driver failures.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    /// The display could not be opened or initialized.
    #[error("failed to open display: {0}")]
    Open(String),

    /// Pushing an update region to the panel failed.
    #[error("failed to submit update: {0}")]
    Submit(String),
}

/// Fatal frame loop failures.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Display failure.
    #[error(transparent)]
    Display(#[from] DisplayError),

    /// Input failure.
    #[error(transparent)]
    Input(#[from] InputError),
}
