// Amestris Transmute - simulate-then-commit transmutation workflow client
// This exposes the core components for testing and integration

pub mod catalog;
pub mod cli;
pub mod config;
pub mod http;
pub mod observability;
pub mod presentation;
pub mod telemetry;
pub mod transmutation;

// Re-export key types for easy access
pub use catalog::{CatalogPreview, Material, MaterialCatalog};
pub use config::{config, init_config, TransmuteConfig};
pub use http::{BackendError, BackendHttpClient, ClientSettings};
pub use observability::{backend_metrics, BackendApiMetrics, OperationTimer};
pub use presentation::{Notice, PanelView};
pub use telemetry::{create_workflow_span, generate_correlation_id, init_telemetry, shutdown_telemetry};
pub use transmutation::{
    ActorId, AuditRefresh, CommitReceipt, Complexity, FeasibilityApi, FeasibilityClient,
    GateViolation, MaterialListEditor, SimulationResult, StaleResultPolicy, TransmutationDraft,
    TransmutationWorkflowController, TransmuteError, WorkflowPhase, WorkflowState,
};
