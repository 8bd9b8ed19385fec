use thiserror::Error;

use crate::transmutation::types::WorkflowPhase;

/// Why an action was refused before any network call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateViolation {
    #[error("at least one input material and an output material are required")]
    MissingMaterials,
    #[error("a successful simulation is required before committing")]
    NoSimulation,
    #[error("the workflow is busy ({0})")]
    InFlight(WorkflowPhase),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransmuteError {
    #[error("action not available: {reason}")]
    ValidationGateNotSatisfied { reason: GateViolation },
    #[error("feasibility check failed: {message}")]
    FeasibilityCheckFailed { message: String },
    #[error("transmutation commit failed: {message}")]
    CommitFailed { message: String },
    #[error("input slot {index} is out of range (list has {len} slots)")]
    IndexOutOfRange { index: usize, len: usize },
}

impl TransmuteError {
    pub fn gate(reason: GateViolation) -> Self {
        TransmuteError::ValidationGateNotSatisfied { reason }
    }

    /// Single line shown to the user by the presentation layer
    pub fn user_message(&self) -> String {
        match self {
            TransmuteError::ValidationGateNotSatisfied {
                reason: GateViolation::MissingMaterials,
            } => "Please enter at least one input material and an output material".to_string(),
            TransmuteError::ValidationGateNotSatisfied { reason } => {
                format!("Action not available: {reason}")
            }
            TransmuteError::FeasibilityCheckFailed { message } => {
                format!("Simulation failed: {message}")
            }
            TransmuteError::CommitFailed { message } => format!("Transmutation failed: {message}"),
            TransmuteError::IndexOutOfRange { .. } => self.to_string(),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TransmuteError::IndexOutOfRange { .. })
    }
}
