//! Test doubles for the step executor's collaborators.
//!
//! Useful in unit and integration tests where the real automation catalogue
//! or endpoint is unavailable or irrelevant.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::action::{Action, InvocationResponse, InvocationTarget};
use crate::{ActionError, ActionInvoker, ActionResolver, LogLevel, StepReporter};

/// Collects reported lines in order.
impl StepReporter for Vec<(LogLevel, String)> {
    fn report(&mut self, level: LogLevel, message: String) {
        self.push((level, message));
    }
}

// ---------------------------------------------------------------------------
// MockResolver
// ---------------------------------------------------------------------------

/// Behaviour injected into `MockResolver` at construction time.
pub enum ResolverBehaviour {
    /// Return the given lookup result.
    Resolve(Option<Action>),
    /// Fail with a `Catalog` error.
    Fail(String),
    /// Panic inside `resolve`.
    Panic(String),
}

/// A resolver that records every action ID it is asked about.
pub struct MockResolver {
    pub behaviour: ResolverBehaviour,
    /// All action IDs seen (in call order).
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockResolver {
    pub fn resolving(action: Option<Action>) -> Self {
        Self::with_behaviour(ResolverBehaviour::Resolve(action))
    }

    pub fn failing(msg: impl Into<String>) -> Self {
        Self::with_behaviour(ResolverBehaviour::Fail(msg.into()))
    }

    pub fn panicking(msg: impl Into<String>) -> Self {
        Self::with_behaviour(ResolverBehaviour::Panic(msg.into()))
    }

    fn with_behaviour(behaviour: ResolverBehaviour) -> Self {
        Self {
            behaviour,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of lookups made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ActionResolver for MockResolver {
    async fn resolve(&self, action_id: &str) -> Result<Option<Action>, ActionError> {
        self.calls.lock().unwrap().push(action_id.to_owned());

        match &self.behaviour {
            ResolverBehaviour::Resolve(action) => Ok(action.clone()),
            ResolverBehaviour::Fail(msg) => Err(ActionError::Catalog(msg.clone())),
            ResolverBehaviour::Panic(msg) => panic!("{msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockInvoker
// ---------------------------------------------------------------------------

/// Behaviour injected into `MockInvoker` at construction time.
pub enum InvokerBehaviour {
    Respond(InvocationResponse),
    /// Fail with a `Transport` error.
    Fail(String),
}

/// An invoker that records every request instead of sending it.
pub struct MockInvoker {
    pub behaviour: InvokerBehaviour,
    /// All `(target, payload)` pairs seen (in call order).
    pub calls: Arc<Mutex<Vec<(InvocationTarget, Value)>>>,
}

impl MockInvoker {
    /// Respond with `status` and a JSON body.
    pub fn responding(status: u16, body: Value) -> Self {
        Self::with_response(InvocationResponse {
            status,
            status_text: String::new(),
            body: Some(body),
        })
    }

    pub fn with_response(response: InvocationResponse) -> Self {
        Self::with_behaviour(InvokerBehaviour::Respond(response))
    }

    pub fn failing(msg: impl Into<String>) -> Self {
        Self::with_behaviour(InvokerBehaviour::Fail(msg.into()))
    }

    fn with_behaviour(behaviour: InvokerBehaviour) -> Self {
        Self {
            behaviour,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of invocations made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ActionInvoker for MockInvoker {
    async fn invoke(
        &self,
        target: &InvocationTarget,
        payload: &Value,
    ) -> Result<InvocationResponse, ActionError> {
        self.calls.lock().unwrap().push((target.clone(), payload.clone()));

        match &self.behaviour {
            InvokerBehaviour::Respond(res) => Ok(res.clone()),
            InvokerBehaviour::Fail(msg) => Err(ActionError::Transport(msg.clone())),
        }
    }
}
