/// Application-level errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Failure reported by the data-access collaborator, passed through untouched
    #[error("Data access error: {0}")]
    DataAccess(String),
}

impl AppError {
    /// True for errors caused by the caller's arguments rather than the system
    pub fn is_caller_error(&self) -> bool {
        matches!(self, AppError::NotFound(_) | AppError::InvalidInput(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
