//! Per-node-type step behaviour.
//!
//! `StepExecutor` waits one step delay, then decides whether the node
//! succeeds. Validation failures are reported through the
//! [`StepReporter`] and returned as `Ok(false)`; only cancellation and
//! unexpected failures come back as `Err`.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::action::InvocationTarget;
use crate::timing::wait_or_cancel;
use crate::{ActionInvoker, ActionResolver, LogLevel, NodeKind, StepContext, StepError, StepReporter};

/// Executes one node of a workflow graph.
#[derive(Clone)]
pub struct StepExecutor {
    resolver: Arc<dyn ActionResolver>,
    invoker: Arc<dyn ActionInvoker>,
}

impl StepExecutor {
    pub fn new(resolver: Arc<dyn ActionResolver>, invoker: Arc<dyn ActionInvoker>) -> Self {
        Self { resolver, invoker }
    }

    /// Run the step for a node of the given kind.
    ///
    /// Returns `Ok(true)` on success and `Ok(false)` when the node failed in
    /// an expected way (the reason has already been reported).
    ///
    /// # Errors
    /// [`StepError::Aborted`] if `ctx.cancel` fires during any wait.
    pub async fn execute(
        &self,
        kind: &NodeKind,
        ctx: &StepContext<'_>,
        reporter: &mut dyn StepReporter,
    ) -> Result<bool, StepError> {
        wait_or_cancel(ctx.step_delay, ctx.cancel).await?;

        let title = ctx.title;

        match kind {
            NodeKind::Start => {
                reporter.report(LogLevel::Success, format!("Start \"{title}\" initialized."));
                Ok(true)
            }

            NodeKind::End => {
                reporter.report(LogLevel::Success, format!("End \"{title}\" reached."));
                Ok(true)
            }

            NodeKind::Task { assignee } => {
                if assignee.as_deref().map_or(true, str::is_empty) {
                    reporter.report(LogLevel::Error, format!("Task node \"{title}\" missing assignee."));
                    return Ok(false);
                }
                reporter.report(LogLevel::Success, format!("Task \"{title}\" completed."));
                Ok(true)
            }

            NodeKind::Approval { auto_approve_threshold } => {
                match auto_approve_threshold {
                    Some(threshold) if *threshold <= 0.0 => {
                        reporter.report(LogLevel::Info, format!("Auto-approve threshold met for \"{title}\"."));
                        reporter.report(LogLevel::Success, format!("Approval \"{title}\" approved."));
                    }
                    Some(_) => {
                        reporter.report(
                            LogLevel::Info,
                            format!("Approval required for \"{title}\". Simulating approver..."),
                        );
                        wait_or_cancel(ctx.step_delay, ctx.cancel).await?;
                        reporter.report(LogLevel::Success, format!("Approval \"{title}\" approved."));
                    }
                    None => {
                        reporter.report(LogLevel::Info, format!("No threshold set; auto-approving \"{title}\"."));
                    }
                }
                Ok(true)
            }

            NodeKind::Automated { action_id, action_params } => {
                self.run_automation(action_id.as_deref(), action_params.as_ref(), ctx, reporter)
                    .await
            }

            NodeKind::Generic => {
                reporter.report(LogLevel::Info, format!("Generic node \"{title}\" executed."));
                Ok(true)
            }
        }
    }

    async fn run_automation(
        &self,
        action_id: Option<&str>,
        action_params: Option<&Map<String, Value>>,
        ctx: &StepContext<'_>,
        reporter: &mut dyn StepReporter,
    ) -> Result<bool, StepError> {
        let title = ctx.title;

        let Some(action_id) = action_id.filter(|id| !id.is_empty()) else {
            reporter.report(
                LogLevel::Error,
                format!("Automated node \"{title}\" has no actionId configured."),
            );
            return Ok(false);
        };

        debug!(node_id = ctx.node_id, action_id, "triggering automation");
        reporter.report(
            LogLevel::Info,
            format!("Triggering automation \"{action_id}\" for \"{title}\"."),
        );

        match self.resolve_target(action_id).await {
            Some(target) => {
                let payload = Value::Object(action_params.cloned().unwrap_or_default());

                match self.invoker.invoke(&target, &payload).await {
                    Ok(res) if res.is_success() => {
                        let body = res.body.unwrap_or_else(|| json!({}));
                        reporter.report(
                            LogLevel::Success,
                            format!("Automation \"{title}\" succeeded. Response: {body}"),
                        );
                        Ok(true)
                    }
                    Ok(res) => {
                        reporter.report(
                            LogLevel::Error,
                            format!("Automation \"{title}\" failed: {}", res.status_text),
                        );
                        Ok(false)
                    }
                    Err(e) => {
                        reporter.report(LogLevel::Error, format!("Automation \"{title}\" failed: {e}"));
                        Ok(false)
                    }
                }
            }

            None => {
                wait_or_cancel(ctx.step_delay, ctx.cancel).await?;
                reporter.report(
                    LogLevel::Success,
                    format!("Automation \"{title}\" simulated successfully."),
                );
                Ok(true)
            }
        }
    }

    /// Resolve an action to its endpoint. Unknown actions, actions without a
    /// URL and catalogue failures all mean "simulate instead".
    async fn resolve_target(&self, action_id: &str) -> Option<InvocationTarget> {
        match self.resolver.resolve(action_id).await {
            Ok(Some(action)) => action.invocation_target(),
            Ok(None) => {
                debug!(action_id, "action not in catalogue; simulating");
                None
            }
            Err(e) => {
                warn!(action_id, error = %e, "automation catalogue lookup failed; simulating");
                None
            }
        }
    }
}
