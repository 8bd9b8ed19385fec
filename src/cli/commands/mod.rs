use anyhow::Result;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::info;

use crate::config::TransmuteConfig;
use crate::http::BackendHttpClient;
use crate::transmutation::{
    ActorId, AuditRefreshSignal, FeasibilityClient, TransmutationDraft,
    TransmutationWorkflowController, WorkflowState,
};

pub mod materials;
pub mod session;
pub mod simulate;

pub type CliController =
    TransmutationWorkflowController<FeasibilityClient, UnboundedSender<AuditRefreshSignal>>;

/// Wire a controller to the configured backend, with the audit-log listener attached
pub fn build_controller(
    config: &TransmuteConfig,
    draft: TransmutationDraft,
    actor_override: Option<u64>,
) -> Result<CliController> {
    let http = BackendHttpClient::from_config(config)?;
    if !http.is_authenticated() {
        println!("⚠️  No backend token configured (set AMESTRIS_TOKEN); requests may be rejected");
    }

    let actor_id = actor_override.map(ActorId).unwrap_or_else(|| config.actor_id());
    let controller = TransmutationWorkflowController::new(
        FeasibilityClient::new(http),
        spawn_audit_listener(),
        actor_id,
        WorkflowState::with_draft(draft),
    )
    .with_policy(config.stale_result_policy());
    Ok(controller)
}

/// The terminal has no audit-log view, so refresh requests are logged
pub fn spawn_audit_listener() -> UnboundedSender<AuditRefreshSignal> {
    let (tx, mut rx) = mpsc::unbounded_channel::<AuditRefreshSignal>();
    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            info!("Audit log refresh requested after transmutation");
        }
    });
    tx
}

pub async fn show_how_to_get_started() -> Result<()> {
    println!("⚗️  Amestris - Transmutation Simulation & Commit");
    println!();
    println!("To get started:");
    println!("  🔍 amestris simulate -i Hierro -i Agua -o Espada   # Check feasibility");
    println!("  ⚡ amestris transmute -i Hierro -o Espada           # Simulate, then perform");
    println!("  📦 amestris materials                               # Browse the catalog");
    println!("  🔮 amestris session                                 # Interactive panel");
    println!();
    println!("💡 Every transmutation must be simulated before it can be performed.");
    Ok(())
}
