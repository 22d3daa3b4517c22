//! Automation catalogue types and the in-memory catalogue.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ActionError, ActionResolver};

/// HTTP method used when an action does not name one.
pub const DEFAULT_METHOD: &str = "POST";

// ---------------------------------------------------------------------------
// Catalogue entries
// ---------------------------------------------------------------------------

/// One entry of the automation catalogue.
///
/// Matches the `/automations` document:
/// `{ id, label, params, invocationTarget?: { url, method? } }`. The older flat
/// form with `url` and `method` directly on the entry is accepted too.
/// Only entries with a non-empty URL are invoked remotely; the rest are
/// simulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Parameter names the editor offers for this action.
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(
        rename = "invocationTarget",
        alias = "invocation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub invocation: Option<InvocationTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl Action {
    /// A catalogue entry without a remote endpoint.
    pub fn simulated(id: impl Into<String>, label: impl Into<String>, params: &[&str]) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
            invocation: None,
            url: None,
            method: None,
        }
    }

    /// Attach a remote endpoint to this action.
    pub fn with_endpoint(mut self, url: impl Into<String>, method: Option<&str>) -> Self {
        self.invocation = Some(InvocationTarget {
            url: url.into(),
            method: method.map(str::to_owned),
        });
        self
    }

    /// Where to send the call, if this action is backed by a remote endpoint.
    ///
    /// A nested `invocationTarget` wins over the flat `url`/`method` pair.
    pub fn invocation_target(&self) -> Option<InvocationTarget> {
        if let Some(target) = self.invocation.as_ref().filter(|t| !t.url.is_empty()) {
            return Some(target.clone());
        }

        self.url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| InvocationTarget {
                url: url.to_owned(),
                method: self.method.clone(),
            })
    }
}

/// Remote endpoint of an automated action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationTarget {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl InvocationTarget {
    /// The method to use, defaulting to [`DEFAULT_METHOD`].
    pub fn method(&self) -> &str {
        self.method
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_METHOD)
    }
}

/// What came back from an invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationResponse {
    pub status: u16,
    /// Reason phrase for `status` (e.g. "Not Found").
    pub status_text: String,
    /// Decoded JSON body; `None` when the body was empty or not JSON.
    pub body: Option<Value>,
}

impl InvocationResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ---------------------------------------------------------------------------
// StaticCatalog
// ---------------------------------------------------------------------------

/// In-memory automation catalogue.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    actions: HashMap<String, Action>,
}

impl StaticCatalog {
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            actions: actions.into_iter().map(|a| (a.id.clone(), a)).collect(),
        }
    }

    /// The catalogue the editor ships with when no automation service is
    /// configured. None of its entries have an endpoint.
    pub fn builtin() -> Self {
        Self::new([
            Action::simulated("send_email", "Send Email", &["to", "subject"]),
            Action::simulated("generate_doc", "Generate Document", &["template", "recipient"]),
        ])
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[async_trait]
impl ActionResolver for StaticCatalog {
    async fn resolve(&self, action_id: &str) -> Result<Option<Action>, ActionError> {
        Ok(self.actions.get(action_id).cloned())
    }
}
