//! `reqwest`-backed catalogue lookup and action invocation.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::debug;

use crate::action::{Action, InvocationResponse, InvocationTarget};
use crate::{ActionError, ActionInvoker, ActionResolver};

/// Automation catalogue served over HTTP as a JSON array of [`Action`]s.
///
/// The whole list is fetched on every lookup; the catalogue is small and a
/// run resolves at most one action per automated node.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    url: String,
}

impl HttpCatalog {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ActionResolver for HttpCatalog {
    async fn resolve(&self, action_id: &str) -> Result<Option<Action>, ActionError> {
        let res = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ActionError::Catalog(e.to_string()))?;

        if !res.status().is_success() {
            return Err(ActionError::Catalog(format!(
                "failed to fetch automations: {}",
                res.status()
            )));
        }

        let actions: Vec<Action> = res
            .json()
            .await
            .map_err(|e| ActionError::Catalog(e.to_string()))?;

        debug!(count = actions.len(), url = %self.url, "fetched automation catalogue");
        Ok(actions.into_iter().find(|a| a.id == action_id))
    }
}

/// Sends the node's parameters as a JSON body to the action's endpoint.
///
/// No timeout beyond the client's own is applied.
#[derive(Debug, Clone, Default)]
pub struct HttpInvoker {
    client: Client,
}

impl HttpInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ActionInvoker for HttpInvoker {
    async fn invoke(
        &self,
        target: &InvocationTarget,
        payload: &Value,
    ) -> Result<InvocationResponse, ActionError> {
        let method = Method::from_bytes(target.method().to_ascii_uppercase().as_bytes())
            .map_err(|_| ActionError::Transport(format!("invalid HTTP method '{}'", target.method())))?;

        debug!(%method, url = %target.url, "invoking automation endpoint");

        let res = self
            .client
            .request(method, &target.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| ActionError::Transport(e.to_string()))?;

        let status = res.status();
        // An undecodable body is not a failure; it is reported as `{}`.
        let body = res.json::<Value>().await.ok();

        Ok(InvocationResponse {
            status: status.as_u16(),
            status_text: status
                .canonical_reason()
                .map(str::to_owned)
                .unwrap_or_else(|| status.as_str().to_owned()),
            body,
        })
    }
}
