use crate::utils::error::GroombaError;
use std::fmt;
use thiserror::Error;

/// The two phases of archiving a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveOperation {
    #[default]
    Copy,
    Delete,
}

impl fmt::Display for MoveOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveOperation::Copy => f.write_str("copy"),
            MoveOperation::Delete => f.write_str("delete"),
        }
    }
}

#[derive(Error, Debug)]
#[error("branch: {branch} failed on operation {operation} with error: {cause}")]
pub struct MoveBranchError {
    pub branch: String,
    pub operation: MoveOperation,
    #[source]
    pub cause: Box<GroombaError>,
}

impl MoveBranchError {
    pub fn new(branch: impl Into<String>, operation: MoveOperation, cause: GroombaError) -> Self {
        Self {
            branch: branch.into(),
            operation,
            cause: Box::new(cause),
        }
    }
}

/// Every branch that failed during one batch, in completion order.
#[derive(Error, Debug, Default)]
#[error("{}", join_failures(.failures))]
pub struct MoveStaleBranchesError {
    pub failures: Vec<MoveBranchError>,
}

impl MoveStaleBranchesError {
    pub fn new(failures: Vec<MoveBranchError>) -> Self {
        Self { failures }
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Message lines sorted, since completion order varies run to run.
    pub fn sorted_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.failures.iter().map(|f| f.to_string()).collect();
        lines.sort();
        lines
    }
}

pub fn join_failures(failures: &[MoveBranchError]) -> String {
    failures
        .iter()
        .map(|failure| failure.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
