//! `nodes` crate — per-node-type step behaviour and its collaborators.
//!
//! The engine crate walks the graph and hands each node's [`NodeKind`] to a
//! [`StepExecutor`], which waits, validates, optionally calls out through an
//! [`ActionResolver`] / [`ActionInvoker`], and reports what happened.

pub mod action;
pub mod error;
pub mod http;
pub mod kind;
pub mod mock;
pub mod step;
pub mod timing;
pub mod traits;

pub use action::{Action, InvocationResponse, InvocationTarget, StaticCatalog};
pub use error::{ActionError, StepError};
pub use http::{HttpCatalog, HttpInvoker};
pub use kind::NodeKind;
pub use step::StepExecutor;
pub use timing::wait_or_cancel;
pub use traits::{ActionInvoker, ActionResolver, LogLevel, StepContext, StepReporter};
