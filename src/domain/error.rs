use thiserror::Error;

/// Input problems caught before any request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no URL provided")]
    EmptyUrl,

    #[error("no resolution selected")]
    NoResolution,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Network failure or non-success response, carrying the backend message when it sent one.
    #[error("{0}")]
    Request(String),

    /// The job itself reported `error`.
    #[error("{0}")]
    Job(String),
}

impl From<crate::api::ApiError> for AppError {
    fn from(err: crate::api::ApiError) -> Self {
        AppError::Request(err.to_string())
    }
}
