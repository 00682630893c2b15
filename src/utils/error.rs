use crate::core::groom::failure::MoveStaleBranchesError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GroombaError {
    #[error("Git operation failed: {message}")]
    GitOperation { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("non-fast-forward update: {reference}")]
    NonFastForward { reference: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{message}")]
    Auth { message: String },

    #[error("Invalid arguments: {message}")]
    InvalidArgs { message: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    MoveStaleBranches(#[from] MoveStaleBranchesError),
}

pub type Result<T> = std::result::Result<T, GroombaError>;

impl GroombaError {
    pub fn git_operation(message: impl Into<String>) -> Self {
        Self::GitOperation {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn non_fast_forward(reference: impl Into<String>) -> Self {
        Self::NonFastForward {
            reference: reference.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn auth_error(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs {
            message: message.into(),
        }
    }
}
