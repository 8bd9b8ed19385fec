// Collaborator seams for the workflow controller, so tests can substitute
// the backend and the audit-log view.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

#[cfg(test)]
use mockall::automock;

use crate::transmutation::errors::TransmuteError;
use crate::transmutation::types::{ActorId, AuditRefreshSignal, CommitReceipt, Complexity, SimulationResult};

/// Request/response access to the feasibility backend
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FeasibilityApi: Send + Sync {
    /// Non-committing feasibility query
    async fn simulate(
        &self,
        inputs: &[String],
        output: &str,
        complexity: Complexity,
    ) -> Result<SimulationResult, TransmuteError>;

    /// Durable transmutation record
    async fn commit(
        &self,
        inputs: &[String],
        output: &str,
        actor_id: ActorId,
    ) -> Result<CommitReceipt, TransmuteError>;
}

#[async_trait]
impl<T: FeasibilityApi + ?Sized> FeasibilityApi for Arc<T> {
    async fn simulate(
        &self,
        inputs: &[String],
        output: &str,
        complexity: Complexity,
    ) -> Result<SimulationResult, TransmuteError> {
        (**self).simulate(inputs, output, complexity).await
    }

    async fn commit(
        &self,
        inputs: &[String],
        output: &str,
        actor_id: ActorId,
    ) -> Result<CommitReceipt, TransmuteError> {
        (**self).commit(inputs, output, actor_id).await
    }
}

/// Receiver of the post-commit refresh request (the audit-log view)
pub trait AuditRefresh: Send + Sync {
    fn request_refresh(&self, signal: AuditRefreshSignal);
}

impl<T: AuditRefresh + ?Sized> AuditRefresh for Arc<T> {
    fn request_refresh(&self, signal: AuditRefreshSignal) {
        (**self).request_refresh(signal)
    }
}

impl AuditRefresh for UnboundedSender<AuditRefreshSignal> {
    fn request_refresh(&self, signal: AuditRefreshSignal) {
        if self.send(signal).is_err() {
            tracing::warn!("Audit log listener is gone; refresh request dropped");
        }
    }
}

/// For front ends without an audit-log view
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuditRefresh;

impl AuditRefresh for NoAuditRefresh {
    fn request_refresh(&self, _signal: AuditRefreshSignal) {
        tracing::debug!("Audit refresh requested with no listener attached");
    }
}
