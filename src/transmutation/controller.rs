//! Simulate-then-commit workflow controller.
//!
//! The controller owns the draft, the last simulation result and the phase
//! machine behind a single lock. The lock is never held across a network
//! call, so the presentation layer can observe `Simulating`/`Committing`
//! while a request is outstanding, and any second action issued during that
//! window is refused by the gate.

use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn, Instrument};

use crate::observability::OperationTimer;
use crate::telemetry::{create_workflow_span, generate_correlation_id};
use crate::transmutation::draft::{DraftFingerprint, TransmutationDraft};
use crate::transmutation::errors::{GateViolation, TransmuteError};
use crate::transmutation::phase::{PhaseEvent, PhaseTracker};
use crate::transmutation::traits::{AuditRefresh, FeasibilityApi};
use crate::transmutation::types::{
    ActorId, AuditRefreshSignal, CommitReceipt, Complexity, SimulationResult, StaleResultPolicy,
    WorkflowPhase,
};

/// A simulation result together with the draft snapshot that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct StampedResult {
    result: SimulationResult,
    fingerprint: DraftFingerprint,
    simulated_at: DateTime<Utc>,
}

impl StampedResult {
    fn new(result: SimulationResult, fingerprint: DraftFingerprint) -> Self {
        Self {
            result,
            fingerprint,
            simulated_at: Utc::now(),
        }
    }

    pub fn result(&self) -> &SimulationResult {
        &self.result
    }

    pub fn fingerprint(&self) -> &DraftFingerprint {
        &self.fingerprint
    }

    pub fn simulated_at(&self) -> DateTime<Utc> {
        self.simulated_at
    }

    pub fn matches(&self, draft: &TransmutationDraft) -> bool {
        self.fingerprint == draft.fingerprint()
    }
}

/// Owned workflow state handed to the controller at construction
#[derive(Debug, Default)]
pub struct WorkflowState {
    draft: TransmutationDraft,
    result: Option<StampedResult>,
    tracker: PhaseTracker,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a pre-filled draft, with no simulation yet
    pub fn with_draft(draft: TransmutationDraft) -> Self {
        Self {
            draft,
            ..Self::default()
        }
    }
}

/// Consistent copy of everything the presentation layer renders
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSnapshot {
    pub draft: TransmutationDraft,
    pub result: Option<StampedResult>,
    pub phase: WorkflowPhase,
}

impl WorkflowSnapshot {
    pub fn can_transmute(&self) -> bool {
        self.draft.can_transmute()
    }

    pub fn can_simulate(&self) -> bool {
        simulate_gate(&self.draft, self.phase).is_ok()
    }

    pub fn can_commit(&self) -> bool {
        commit_gate(&self.draft, self.result.is_some(), self.phase).is_ok()
    }
}

fn simulate_gate(draft: &TransmutationDraft, phase: WorkflowPhase) -> Result<(), GateViolation> {
    if phase.is_in_flight() {
        return Err(GateViolation::InFlight(phase));
    }
    if !draft.can_transmute() {
        return Err(GateViolation::MissingMaterials);
    }
    Ok(())
}

fn commit_gate(draft: &TransmutationDraft, has_result: bool, phase: WorkflowPhase) -> Result<(), GateViolation> {
    simulate_gate(draft, phase)?;
    if !has_result {
        return Err(GateViolation::NoSimulation);
    }
    Ok(())
}

fn lock_state(state: &Mutex<WorkflowState>) -> MutexGuard<'_, WorkflowState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Rolls the phase back if the request future is dropped before it resolves
struct InFlight<'a> {
    state: &'a Mutex<WorkflowState>,
    on_abandon: PhaseEvent,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn arm(state: &'a Mutex<WorkflowState>, on_abandon: PhaseEvent) -> Self {
        Self {
            state,
            on_abandon,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!(event = ?self.on_abandon, "Request abandoned before completion");
            lock_state(self.state).tracker.handle(self.on_abandon);
        }
    }
}

pub struct TransmutationWorkflowController<A, R> {
    api: A,
    audit: R,
    actor_id: ActorId,
    policy: StaleResultPolicy,
    state: Mutex<WorkflowState>,
}

impl<A, R> TransmutationWorkflowController<A, R>
where
    A: FeasibilityApi,
    R: AuditRefresh,
{
    pub fn new(api: A, audit: R, actor_id: ActorId, state: WorkflowState) -> Self {
        Self {
            api,
            audit,
            actor_id,
            policy: StaleResultPolicy::default(),
            state: Mutex::new(state),
        }
    }

    pub fn with_policy(mut self, policy: StaleResultPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn lock(&self) -> MutexGuard<'_, WorkflowState> {
        lock_state(&self.state)
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    pub fn policy(&self) -> StaleResultPolicy {
        self.policy
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.lock().tracker.phase()
    }

    pub fn draft(&self) -> TransmutationDraft {
        self.lock().draft.clone()
    }

    pub fn simulation(&self) -> Option<SimulationResult> {
        self.lock().result.as_ref().map(|stamped| stamped.result.clone())
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        let state = self.lock();
        WorkflowSnapshot {
            draft: state.draft.clone(),
            result: state.result.clone(),
            phase: state.tracker.phase(),
        }
    }

    pub fn can_transmute(&self) -> bool {
        self.lock().draft.can_transmute()
    }

    pub fn can_simulate(&self) -> bool {
        let state = self.lock();
        simulate_gate(&state.draft, state.tracker.phase()).is_ok()
    }

    pub fn can_commit(&self) -> bool {
        let state = self.lock();
        commit_gate(&state.draft, state.result.is_some(), state.tracker.phase()).is_ok()
    }

    pub fn add_slot(&self) {
        self.edit(|draft| draft.inputs.add_slot())
    }

    pub fn update_slot(&self, index: usize, text: impl Into<String>) -> Result<(), TransmuteError> {
        self.edit(|draft| draft.inputs.update_slot(index, text))
    }

    /// No-op when only one row remains
    pub fn remove_slot(&self, index: usize) -> bool {
        self.edit(|draft| draft.inputs.remove_slot(index))
    }

    pub fn set_output(&self, output: impl Into<String>) {
        self.edit(|draft| draft.output = output.into())
    }

    pub fn set_complexity(&self, complexity: Complexity) {
        self.edit(|draft| draft.complexity = complexity)
    }

    fn edit<T>(&self, apply: impl FnOnce(&mut TransmutationDraft) -> T) -> T {
        let mut state = self.lock();
        let outcome = apply(&mut state.draft);
        self.invalidate_if_stale(&mut state);
        outcome
    }

    /// Under `Invalidate`, forget a result that no longer matches the draft.
    /// Results backing an in-flight commit are checked once the commit resolves.
    fn invalidate_if_stale(&self, state: &mut WorkflowState) {
        if self.policy != StaleResultPolicy::Invalidate || state.tracker.phase() == WorkflowPhase::Committing {
            return;
        }
        let stale = state
            .result
            .as_ref()
            .is_some_and(|stamped| !stamped.matches(&state.draft));
        if stale {
            state.result = None;
            state.tracker.handle(PhaseEvent::ResultInvalidated);
            info!("Draft diverged from the simulated materials; simulation result discarded");
        }
    }

    /// Ask the backend whether the current draft is feasible.
    ///
    /// On failure the draft and any earlier result are left untouched and the
    /// phase returns to where it was before the call.
    pub async fn simulate(&self) -> Result<SimulationResult, TransmuteError> {
        let correlation_id = generate_correlation_id();
        self.run_simulation()
            .instrument(create_workflow_span("simulate", &correlation_id))
            .await
    }

    async fn run_simulation(&self) -> Result<SimulationResult, TransmuteError> {
        let fingerprint = {
            let mut state = self.lock();
            if let Err(reason) = simulate_gate(&state.draft, state.tracker.phase()) {
                warn!(%reason, "Simulate refused");
                return Err(TransmuteError::gate(reason));
            }
            state.tracker.handle(PhaseEvent::SimulateRequested);
            state.draft.fingerprint()
        };

        let in_flight = InFlight::arm(&self.state, PhaseEvent::SimulationFailed);
        let timer = OperationTimer::new("transmutation.simulate");
        let outcome = self
            .api
            .simulate(&fingerprint.inputs, &fingerprint.output, fingerprint.complexity)
            .await;
        timer.finish();
        in_flight.disarm();

        let mut state = self.lock();
        match outcome {
            Ok(result) => {
                if self.policy == StaleResultPolicy::Invalidate && state.draft.fingerprint() != fingerprint {
                    state.tracker.handle(PhaseEvent::SimulationDiscarded);
                    info!("Draft changed while simulating; result not stored");
                    return Ok(result);
                }
                state.result = Some(StampedResult::new(result.clone(), fingerprint));
                state.tracker.handle(PhaseEvent::SimulationSucceeded);
                Ok(result)
            }
            Err(err) => {
                state.tracker.handle(PhaseEvent::SimulationFailed);
                warn!(error = %err, "Simulation failed; draft preserved");
                Err(err)
            }
        }
    }

    /// Record the transmutation. Requires a stored simulation result.
    ///
    /// Success resets the form and notifies the audit-log view once; failure
    /// keeps the draft and the result so the commit can be retried directly.
    pub async fn commit(&self) -> Result<CommitReceipt, TransmuteError> {
        let correlation_id = generate_correlation_id();
        self.run_commit()
            .instrument(create_workflow_span("commit", &correlation_id))
            .await
    }

    async fn run_commit(&self) -> Result<CommitReceipt, TransmuteError> {
        let payload = {
            let mut state = self.lock();
            if let Err(reason) = commit_gate(&state.draft, state.result.is_some(), state.tracker.phase()) {
                warn!(%reason, "Commit refused");
                return Err(TransmuteError::gate(reason));
            }
            state.tracker.handle(PhaseEvent::CommitRequested);
            state.draft.fingerprint()
        };

        let in_flight = InFlight::arm(&self.state, PhaseEvent::CommitFailed);
        let timer = OperationTimer::new("transmutation.commit");
        let outcome = self
            .api
            .commit(&payload.inputs, &payload.output, self.actor_id)
            .await;
        timer.finish();
        in_flight.disarm();

        match outcome {
            Ok(receipt) => {
                {
                    let mut state = self.lock();
                    state.draft = TransmutationDraft::default();
                    state.result = None;
                    state.tracker.handle(PhaseEvent::CommitSucceeded);
                }
                info!(actor_id = %self.actor_id, "Transmutation committed; form reset");
                self.audit.request_refresh(AuditRefreshSignal);
                Ok(receipt)
            }
            Err(err) => {
                let mut state = self.lock();
                state.tracker.handle(PhaseEvent::CommitFailed);
                self.invalidate_if_stale(&mut state);
                warn!(error = %err, "Commit failed; draft and simulation kept");
                Err(err)
            }
        }
    }
}
