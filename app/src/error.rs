use thiserror::Error;
use todo_core::pagination::PaginationError;
use todo_core::ApiError;

/// Errors that stop a command. Failed loads and submissions are not among
/// them: those are shown to the user and the session carries on.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not set up HTTP client: {0}")]
    Transport(#[from] ApiError),

    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
