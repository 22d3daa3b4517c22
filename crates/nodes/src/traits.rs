//! Contracts shared by the step executor, its collaborators and the engine.
//!
//! Defined here (in the nodes crate) so the engine can implement
//! [`StepReporter`] and callers can plug in their own catalogue or transport
//! without a circular dependency.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::action::{Action, InvocationResponse, InvocationTarget};
use crate::ActionError;

/// Severity of a run log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Error,
}

/// Everything a step needs to know about the node it is executing.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    /// ID of the node being executed.
    pub node_id: &'a str,
    /// Display title of the node (falls back to the ID).
    pub title: &'a str,
    /// Simulated processing time for one wait phase.
    pub step_delay: Duration,
    /// Cancellation signal for the current run.
    pub cancel: &'a CancellationToken,
}

/// Sink for the log lines a step produces while it runs.
///
/// Lines must be forwarded as they are reported, not batched, so the caller
/// sees "Simulating approver..." before the approver wait elapses.
///
/// Reporters are `Send` so a run can be spawned onto a multi-threaded
/// runtime.
pub trait StepReporter: Send {
    fn report(&mut self, level: LogLevel, message: String);
}

/// Resolves an automated node's action identifier against the automation
/// catalogue.
#[async_trait]
pub trait ActionResolver: Send + Sync {
    /// Look up `action_id`. `Ok(None)` means the catalogue has no such action.
    async fn resolve(&self, action_id: &str) -> Result<Option<Action>, ActionError>;
}

/// Performs the remote call behind an automated action.
#[async_trait]
pub trait ActionInvoker: Send + Sync {
    /// Send `payload` to `target` and report whatever came back.
    ///
    /// A non-success status is *not* an error here; only failing to complete
    /// the exchange is.
    async fn invoke(
        &self,
        target: &InvocationTarget,
        payload: &Value,
    ) -> Result<InvocationResponse, ActionError>;
}
