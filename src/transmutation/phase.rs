use statig::blocking::StateMachine;
use statig::prelude::*;

use crate::transmutation::types::WorkflowPhase;

/// Inputs that move the workflow between phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    SimulateRequested,
    SimulationSucceeded,
    SimulationFailed,
    /// A result arrived for a draft that has since changed
    SimulationDiscarded,
    CommitRequested,
    CommitSucceeded,
    CommitFailed,
    /// The stored result no longer matches the draft
    ResultInvalidated,
}

/// Transition table for the simulate/commit workflow.
///
/// `resimulating` is a simulation started while a previous result is stored;
/// it is reported as `Simulating` but rolls back to `simulated` on failure.
#[derive(Debug, Default)]
pub struct PhaseMachine;

#[state_machine(initial = "State::idle()", state(derive(Debug, Clone, PartialEq, Eq)))]
impl PhaseMachine {
    #[state]
    fn idle(event: &PhaseEvent) -> Outcome<State> {
        match event {
            PhaseEvent::SimulateRequested => Transition(State::simulating()),
            _ => Handled,
        }
    }

    #[state]
    fn simulating(event: &PhaseEvent) -> Outcome<State> {
        match event {
            PhaseEvent::SimulationSucceeded => Transition(State::simulated()),
            PhaseEvent::SimulationFailed | PhaseEvent::SimulationDiscarded => {
                tracing::debug!(?event, "Simulation did not produce a result");
                Transition(State::idle())
            }
            _ => Handled,
        }
    }

    #[state]
    fn resimulating(event: &PhaseEvent) -> Outcome<State> {
        match event {
            PhaseEvent::SimulationSucceeded => Transition(State::simulated()),
            PhaseEvent::SimulationFailed | PhaseEvent::SimulationDiscarded => {
                tracing::debug!(?event, "Keeping previous simulation result");
                Transition(State::simulated())
            }
            PhaseEvent::ResultInvalidated => Transition(State::simulating()),
            _ => Handled,
        }
    }

    #[state]
    fn simulated(event: &PhaseEvent) -> Outcome<State> {
        match event {
            PhaseEvent::SimulateRequested => Transition(State::resimulating()),
            PhaseEvent::CommitRequested => Transition(State::committing()),
            PhaseEvent::ResultInvalidated => Transition(State::idle()),
            _ => Handled,
        }
    }

    #[state]
    fn committing(event: &PhaseEvent) -> Outcome<State> {
        match event {
            PhaseEvent::CommitSucceeded => Transition(State::idle()),
            PhaseEvent::CommitFailed => Transition(State::simulated()),
            _ => Handled,
        }
    }
}

/// Owns the running state machine and maps it onto [`WorkflowPhase`]
pub struct PhaseTracker {
    machine: StateMachine<PhaseMachine>,
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PhaseTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseTracker")
            .field("phase", &self.phase())
            .finish()
    }
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            machine: PhaseMachine.state_machine(),
        }
    }

    pub fn handle(&mut self, event: PhaseEvent) -> WorkflowPhase {
        let before = self.phase();
        self.machine.handle(&event);
        let after = self.phase();
        if before != after {
            tracing::info!(from = %before, to = %after, ?event, "Workflow phase changed");
        }
        after
    }

    pub fn phase(&self) -> WorkflowPhase {
        match self.machine.state() {
            State::Idle { .. } => WorkflowPhase::Idle,
            State::Simulating { .. } | State::Resimulating { .. } => WorkflowPhase::Simulating,
            State::Simulated { .. } => WorkflowPhase::Simulated,
            State::Committing { .. } => WorkflowPhase::Committing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_commit_round_trip() {
        let mut tracker = PhaseTracker::new();
        assert_eq!(tracker.phase(), WorkflowPhase::Idle);

        assert_eq!(tracker.handle(PhaseEvent::SimulateRequested), WorkflowPhase::Simulating);
        assert_eq!(tracker.handle(PhaseEvent::SimulationSucceeded), WorkflowPhase::Simulated);
        assert_eq!(tracker.handle(PhaseEvent::CommitRequested), WorkflowPhase::Committing);
        assert_eq!(tracker.handle(PhaseEvent::CommitSucceeded), WorkflowPhase::Idle);
    }

    #[test]
    fn test_failures_roll_back_to_previous_phase() {
        let mut tracker = PhaseTracker::new();
        tracker.handle(PhaseEvent::SimulateRequested);
        assert_eq!(tracker.handle(PhaseEvent::SimulationFailed), WorkflowPhase::Idle);

        tracker.handle(PhaseEvent::SimulateRequested);
        tracker.handle(PhaseEvent::SimulationSucceeded);
        tracker.handle(PhaseEvent::SimulateRequested);
        assert_eq!(tracker.phase(), WorkflowPhase::Simulating);
        assert_eq!(tracker.handle(PhaseEvent::SimulationFailed), WorkflowPhase::Simulated);

        tracker.handle(PhaseEvent::CommitRequested);
        assert_eq!(tracker.handle(PhaseEvent::CommitFailed), WorkflowPhase::Simulated);
    }

    #[test]
    fn test_invalidation_during_resimulation_forgets_rollback_target() {
        let mut tracker = PhaseTracker::new();
        tracker.handle(PhaseEvent::SimulateRequested);
        tracker.handle(PhaseEvent::SimulationSucceeded);
        tracker.handle(PhaseEvent::SimulateRequested);
        tracker.handle(PhaseEvent::ResultInvalidated);
        assert_eq!(tracker.handle(PhaseEvent::SimulationFailed), WorkflowPhase::Idle);
    }

    #[test]
    fn test_commit_events_ignored_outside_committing() {
        let mut tracker = PhaseTracker::new();
        assert_eq!(tracker.handle(PhaseEvent::CommitRequested), WorkflowPhase::Idle);
        assert_eq!(tracker.handle(PhaseEvent::CommitSucceeded), WorkflowPhase::Idle);

        tracker.handle(PhaseEvent::SimulateRequested);
        assert_eq!(tracker.handle(PhaseEvent::CommitRequested), WorkflowPhase::Simulating);
    }
}
