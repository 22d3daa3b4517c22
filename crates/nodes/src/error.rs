//! Step-level error types.

use thiserror::Error;

/// Errors returned by [`StepExecutor::execute`](crate::StepExecutor::execute).
///
/// Validation problems (a task with no assignee, an automated node with no
/// action) are *not* errors: they are reported as a failed step outcome.
/// A panic inside a collaborator unwinds out of the step and is caught by
/// the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StepError {
    /// The run was cancelled while this step was waiting.
    #[error("aborted")]
    Aborted,
}

/// Errors produced by the automation catalogue and the invocation transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The catalogue could not be fetched or decoded.
    #[error("catalog lookup failed: {0}")]
    Catalog(String),

    /// The remote call could not be sent or completed.
    #[error("{0}")]
    Transport(String),
}
