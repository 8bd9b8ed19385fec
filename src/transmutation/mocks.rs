// Mock implementations for testing - no network, scripted responses

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::transmutation::errors::TransmuteError;
use crate::transmutation::traits::{AuditRefresh, FeasibilityApi};
use crate::transmutation::types::{
    ActorId, AuditRefreshSignal, CommitReceipt, Complexity, SimulationResult,
};

/// Pauses a scripted call until the test releases it
#[derive(Debug, Default)]
pub struct Hold {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSimulate {
    pub inputs: Vec<String>,
    pub output: String,
    pub complexity: Complexity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCommit {
    pub inputs: Vec<String>,
    pub output: String,
    pub actor_id: ActorId,
}

/// Feasibility backend that replays queued responses and records every call
#[derive(Debug, Default)]
pub struct ScriptedFeasibilityApi {
    simulations: Mutex<VecDeque<Result<SimulationResult, TransmuteError>>>,
    commits: Mutex<VecDeque<Result<CommitReceipt, TransmuteError>>>,
    pub simulate_calls: Mutex<Vec<RecordedSimulate>>,
    pub commit_calls: Mutex<Vec<RecordedCommit>>,
    hold: Option<Arc<Hold>>,
}

impl ScriptedFeasibilityApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call waits on `hold` before answering
    pub fn held(hold: Arc<Hold>) -> Self {
        Self {
            hold: Some(hold),
            ..Self::default()
        }
    }

    pub fn push_simulation(&self, response: Result<SimulationResult, TransmuteError>) -> &Self {
        self.simulations.lock().unwrap().push_back(response);
        self
    }

    pub fn push_commit(&self, response: Result<CommitReceipt, TransmuteError>) -> &Self {
        self.commits.lock().unwrap().push_back(response);
        self
    }

    pub fn simulate_count(&self) -> usize {
        self.simulate_calls.lock().unwrap().len()
    }

    pub fn commit_count(&self) -> usize {
        self.commit_calls.lock().unwrap().len()
    }

    async fn wait_if_held(&self) {
        if let Some(hold) = &self.hold {
            hold.entered.notify_one();
            hold.release.notified().await;
        }
    }
}

#[async_trait]
impl FeasibilityApi for ScriptedFeasibilityApi {
    async fn simulate(
        &self,
        inputs: &[String],
        output: &str,
        complexity: Complexity,
    ) -> Result<SimulationResult, TransmuteError> {
        self.simulate_calls.lock().unwrap().push(RecordedSimulate {
            inputs: inputs.to_vec(),
            output: output.to_string(),
            complexity,
        });
        self.wait_if_held().await;
        self.simulations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransmuteError::FeasibilityCheckFailed {
                    message: "no scripted simulation".to_string(),
                })
            })
    }

    async fn commit(
        &self,
        inputs: &[String],
        output: &str,
        actor_id: ActorId,
    ) -> Result<CommitReceipt, TransmuteError> {
        self.commit_calls.lock().unwrap().push(RecordedCommit {
            inputs: inputs.to_vec(),
            output: output.to_string(),
            actor_id,
        });
        self.wait_if_held().await;
        self.commits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransmuteError::CommitFailed {
                    message: "no scripted commit".to_string(),
                })
            })
    }
}

/// Audit-log stand-in that counts refresh requests
#[derive(Debug, Default)]
pub struct CountingAuditRefresh {
    count: AtomicUsize,
}

impl CountingAuditRefresh {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl AuditRefresh for CountingAuditRefresh {
    fn request_refresh(&self, _signal: AuditRefreshSignal) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn sample_result(law_respected: bool) -> SimulationResult {
    SimulationResult {
        cost: 50.0,
        success_rate: 80.0,
        energy_required: 20.0,
        law_respected,
        risk_assessment: "LOW".to_string(),
        estimated_time: "5m".to_string(),
    }
}
