//! Workflow simulation engine.
//!
//! `WorkflowSimulator` is the central orchestrator:
//! 1. Selects the start nodes, in document order.
//! 2. Walks each start node's branch depth first, one node at a time,
//!    following every outgoing edge of a node that succeeded.
//! 3. Visits each node at most once per run; a revisit is skipped.
//! 4. Dispatches each node to the `StepExecutor` and reports the transcript
//!    and status transitions through the caller's callbacks.
//! 5. Stops the whole run on the first failed node or on cancellation.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use nodes::{ActionInvoker, ActionResolver, LogLevel, StepContext, StepError, StepExecutor, StepReporter};

use crate::log::{LogEntry, NodeStatus, RunResult};
use crate::models::{Graph, Node};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Caller-side run settings.
///
/// The simulator itself keeps no settings: every run takes its delay as an
/// argument. Front ends build one of these from their flags and pass
/// `step_delay` to [`WorkflowSimulator::run`].
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Simulated processing time per wait phase.
    pub step_delay: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(700),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-run state
// ---------------------------------------------------------------------------

/// Read-only lookup tables built once per run.
struct GraphIndex<'g> {
    nodes: HashMap<&'g str, &'g Node>,
    /// Outgoing edge targets per source, in document order.
    outgoing: HashMap<&'g str, Vec<&'g str>>,
}

impl<'g> GraphIndex<'g> {
    fn new(graph: &'g Graph) -> Self {
        let mut nodes = HashMap::with_capacity(graph.nodes.len());
        for node in &graph.nodes {
            // First node wins when IDs collide.
            nodes.entry(node.id.as_str()).or_insert(node);
        }

        let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &graph.edges {
            outgoing
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
        }

        Self { nodes, outgoing }
    }

    fn node(&self, id: &str) -> Option<&'g Node> {
        self.nodes.get(id).copied()
    }

    fn target(&self, source: &str, pos: usize) -> Option<&'g str> {
        self.outgoing.get(source).and_then(|t| t.get(pos)).copied()
    }
}

/// Mutable state owned by a single run.
struct RunState<'g, L, S> {
    visited: HashSet<&'g str>,
    logs: Vec<LogEntry>,
    on_log: L,
    on_status: S,
}

impl<'g, L, S> RunState<'g, L, S>
where
    L: FnMut(&LogEntry) + Send,
    S: FnMut(&str, Option<NodeStatus>) + Send,
{
    fn log_workflow(&mut self, level: LogLevel, message: impl Into<String>) {
        self.push(LogEntry::workflow(level, message));
    }

    fn log_node(&mut self, node: &Node, level: LogLevel, message: impl Into<String>) {
        self.push(LogEntry::node(&node.id, &node.title, level, message));
    }

    fn push(&mut self, entry: LogEntry) {
        self.logs.push(entry.clone());
        (self.on_log)(&entry);
    }

    fn status(&mut self, node_id: &str, status: Option<NodeStatus>) {
        (self.on_status)(node_id, status);
    }

    fn finish(self, success: bool) -> RunResult {
        RunResult {
            success,
            logs: self.logs,
        }
    }
}

/// Forwards a step's log lines into the run transcript, tagged with its node.
///
/// A panic raised by the caller's log callback is held here and re-raised
/// once the step returns, so it is not mistaken for a step failure.
struct NodeReporter<'r, 'g, L, S> {
    state: &'r mut RunState<'g, L, S>,
    node: &'g Node,
    callback_panic: Option<Box<dyn Any + Send>>,
}

impl<L, S> StepReporter for NodeReporter<'_, '_, L, S>
where
    L: FnMut(&LogEntry) + Send,
    S: FnMut(&str, Option<NodeStatus>) + Send,
{
    fn report(&mut self, level: LogLevel, message: String) {
        let (state, node) = (&mut *self.state, self.node);
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| state.log_node(node, level, message))) {
            self.callback_panic.get_or_insert(payload);
        }
    }
}

/// How visiting a node (or walking a branch) ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Succeeded,
    Failed,
    Aborted,
}

// ---------------------------------------------------------------------------
// WorkflowSimulator
// ---------------------------------------------------------------------------

/// Runs workflow graphs in simulation.
///
/// Holds no per-run state, so one simulator can serve any number of
/// concurrent runs as long as nobody mutates a graph while it is being run.
#[derive(Clone)]
pub struct WorkflowSimulator {
    steps: StepExecutor,
}

impl WorkflowSimulator {
    /// Create a new simulator.
    pub fn new(resolver: Arc<dyn ActionResolver>, invoker: Arc<dyn ActionInvoker>) -> Self {
        Self {
            steps: StepExecutor::new(resolver, invoker),
        }
    }

    /// Simulate `graph` and return the transcript.
    ///
    /// `on_log` receives every log entry as it is produced and `on_status`
    /// every node status transition; both are called synchronously and in
    /// order. The returned `logs` are exactly the entries `on_log` saw.
    /// Both must be `Send` so the returned future can be spawned.
    ///
    /// Never fails: structural problems, failing nodes and cancellation are
    /// all reported in the log with `success: false`. A panic inside either
    /// callback is not caught and unwinds out of `run`.
    #[instrument(
        skip_all,
        fields(run_id = %uuid::Uuid::new_v4(), nodes = graph.nodes.len(), edges = graph.edges.len())
    )]
    pub async fn run<L, S>(
        &self,
        graph: &Graph,
        on_log: L,
        on_status: S,
        cancel: &CancellationToken,
        step_delay: Duration,
    ) -> RunResult
    where
        L: FnMut(&LogEntry) + Send,
        S: FnMut(&str, Option<NodeStatus>) + Send,
    {
        let index = GraphIndex::new(graph);
        let mut state = RunState {
            visited: HashSet::new(),
            logs: Vec::new(),
            on_log,
            on_status,
        };

        let starts: Vec<&Node> = graph.start_nodes().collect();
        if starts.is_empty() {
            warn!("no start node; nothing to simulate");
            state.log_workflow(LogLevel::Error, "No Start node found. Simulation aborted.");
            return state.finish(false);
        }

        info!(start_nodes = starts.len(), ?step_delay, "starting workflow simulation");

        for start in starts {
            if !state.visited.insert(start.id.as_str()) {
                debug!(node_id = %start.id, "start node already visited; skipping");
                continue;
            }

            match self.walk_branch(&index, &mut state, start, cancel, step_delay).await {
                Visit::Succeeded => {}
                Visit::Failed => {
                    warn!(start_node = %start.id, "workflow stopped due to node failure");
                    state.log_workflow(
                        LogLevel::Error,
                        format!("Workflow stopped due to failure at node {}.", start.id),
                    );
                    return state.finish(false);
                }
                Visit::Aborted => return Self::aborted(state),
            }

            if cancel.is_cancelled() {
                return Self::aborted(state);
            }
        }

        info!("workflow simulation completed");
        state.log_workflow(LogLevel::Success, "Workflow simulation completed successfully.");
        state.finish(true)
    }

    fn aborted<L, S>(mut state: RunState<'_, L, S>) -> RunResult
    where
        L: FnMut(&LogEntry) + Send,
        S: FnMut(&str, Option<NodeStatus>) + Send,
    {
        info!("workflow simulation aborted by user");
        state.log_workflow(LogLevel::Info, "Simulation aborted by user.");
        state.finish(false)
    }

    // -----------------------------------------------------------------------
    // Internal: depth-first walk of one branch.
    // -----------------------------------------------------------------------

    /// Visit `start`, then everything reachable from it. Each stack frame is a
    /// node that succeeded plus the position of the next outgoing edge to
    /// follow, which reproduces recursive depth-first order.
    async fn walk_branch<'g, L, S>(
        &self,
        index: &GraphIndex<'g>,
        state: &mut RunState<'g, L, S>,
        start: &'g Node,
        cancel: &CancellationToken,
        step_delay: Duration,
    ) -> Visit
    where
        L: FnMut(&LogEntry) + Send,
        S: FnMut(&str, Option<NodeStatus>) + Send,
    {
        let first = self.visit(state, start, cancel, step_delay).await;
        if first != Visit::Succeeded {
            return first;
        }

        let mut stack: Vec<(&'g str, usize)> = vec![(start.id.as_str(), 0)];

        loop {
            let Some(frame) = stack.last_mut() else {
                return Visit::Succeeded;
            };
            let next = index.target(frame.0, frame.1);
            frame.1 += 1;

            let Some(target_id) = next else {
                stack.pop();
                continue;
            };

            let Some(target) = index.node(target_id) else {
                warn!(target = target_id, "edge points at unknown node; skipping");
                continue;
            };

            if !state.visited.insert(target_id) {
                continue;
            }

            match self.visit(state, target, cancel, step_delay).await {
                Visit::Succeeded => stack.push((target_id, 0)),
                other => return other,
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internal: execute a single node.
    // -----------------------------------------------------------------------

    async fn visit<'g, L, S>(
        &self,
        state: &mut RunState<'g, L, S>,
        node: &'g Node,
        cancel: &CancellationToken,
        step_delay: Duration,
    ) -> Visit
    where
        L: FnMut(&LogEntry) + Send,
        S: FnMut(&str, Option<NodeStatus>) + Send,
    {
        if cancel.is_cancelled() {
            return Visit::Aborted;
        }

        debug!(node_id = %node.id, node_type = node.kind.type_name(), "executing node");
        state.log_node(node, LogLevel::Info, format!("Executing node \"{}\"", node.title));
        state.status(&node.id, Some(NodeStatus::Running));

        let ctx = StepContext {
            node_id: &node.id,
            title: &node.title,
            step_delay,
            cancel,
        };

        let mut reporter = NodeReporter {
            state: &mut *state,
            node,
            callback_panic: None,
        };
        let outcome = AssertUnwindSafe(self.steps.execute(&node.kind, &ctx, &mut reporter))
            .catch_unwind()
            .await;
        if let Some(payload) = reporter.callback_panic.take() {
            panic::resume_unwind(payload);
        }

        let error = match outcome {
            Ok(Ok(true)) => {
                state.status(&node.id, Some(NodeStatus::Success));
                return Visit::Succeeded;
            }
            Ok(Ok(false)) => {
                warn!(node_id = %node.id, "node failed");
                state.status(&node.id, Some(NodeStatus::Failed));
                return Visit::Failed;
            }
            Ok(Err(StepError::Aborted)) => {
                state.status(&node.id, None);
                return Visit::Aborted;
            }
            Err(payload) => panic_message(payload.as_ref()),
        };

        warn!(node_id = %node.id, %error, "node execution error");
        state.log_node(node, LogLevel::Error, format!("Node \"{}\" execution error: {error}", node.title));
        state.status(&node.id, Some(NodeStatus::Failed));
        Visit::Failed
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown error".to_owned()
    }
}
