// Transmutation workflow: input list editing, the feasibility backend client
// and the simulate-then-commit controller.

pub mod types;
pub mod errors;
pub mod editor;
pub mod draft;
pub mod traits;
pub mod client;
pub mod phase;
pub mod controller;

#[cfg(test)]
pub mod mocks;


pub use client::FeasibilityClient;
pub use controller::{StampedResult, TransmutationWorkflowController, WorkflowSnapshot, WorkflowState};
pub use draft::{DraftFingerprint, TransmutationDraft};
pub use editor::{InputMaterialSlot, MaterialListEditor};
pub use errors::{GateViolation, TransmuteError};
pub use traits::{AuditRefresh, FeasibilityApi, NoAuditRefresh};
pub use types::{
    ActorId, AuditRefreshSignal, CommitReceipt, Complexity, ParseComplexityError, RiskLevel,
    SimulationResult, StaleResultPolicy, WorkflowPhase,
};
