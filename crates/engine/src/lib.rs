//! `engine` crate — graph models, graph validation, and the simulation engine.

pub mod models;
pub mod error;
pub mod log;
pub mod validation;
pub mod executor;

pub use models::{Graph, Node, Edge};
pub use error::EngineError;
pub use log::{LogEntry, NodeStatus, RunResult};
pub use validation::validate_graph;
pub use executor::{SimulatorConfig, WorkflowSimulator};

pub use nodes::{LogLevel, NodeKind};
pub use tokio_util::sync::CancellationToken;
