use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// The server answered with a failure envelope.
    #[error("{0}")]
    Api(String),

    #[error("{0}")]
    Transport(String),

    #[error("An error occurred")]
    Unexpected,
}

impl WorkflowError {
    pub fn validation<S: ToString>(message: S) -> Self {
        WorkflowError::Validation(message.to_string())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, WorkflowError::Validation(_))
    }
}

impl From<reqwest::Error> for WorkflowError {
    fn from(err: reqwest::Error) -> Self {
        WorkflowError::Transport(err.to_string())
    }
}

impl From<std::io::Error> for WorkflowError {
    fn from(err: std::io::Error) -> Self {
        WorkflowError::Transport(err.to_string())
    }
}
