//! End-to-end workflow scenarios: controller + HTTP client + mocked backend

use std::time::Duration;

use amestris_transmute::http::{BackendHttpClient, ClientSettings};
use amestris_transmute::transmutation::{
    ActorId, AuditRefreshSignal, Complexity, FeasibilityClient, GateViolation, StaleResultPolicy,
    TransmutationWorkflowController, TransmuteError, WorkflowPhase, WorkflowState,
};
use serde_json::json;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Controller = TransmutationWorkflowController<FeasibilityClient, UnboundedSender<AuditRefreshSignal>>;

fn simulation_body(law_respected: bool) -> serde_json::Value {
    json!({
        "cost": 50,
        "success_rate": 80,
        "energy_required": 20,
        "law_respected": law_respected,
        "risk_assessment": "LOW",
        "estimated_time": "5m"
    })
}

fn controller_for(server: &MockServer) -> (Controller, UnboundedReceiver<AuditRefreshSignal>) {
    let http = BackendHttpClient::new(&server.uri(), Some("test-token".to_string()), ClientSettings::default())
        .expect("mock server uri is valid");
    let (tx, rx) = mpsc::unbounded_channel();
    let controller =
        TransmutationWorkflowController::new(FeasibilityClient::new(http), tx, ActorId(1), WorkflowState::new());
    (controller, rx)
}

fn fill(controller: &Controller, inputs: &[&str], output: &str) {
    for (index, input) in inputs.iter().enumerate() {
        if index > 0 {
            controller.add_slot();
        }
        controller.update_slot(index, *input).unwrap();
    }
    controller.set_output(output);
}

#[tokio::test]
async fn test_happy_path_simulate_commit_and_reset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/transmute/simulate"))
        .and(body_json(json!({
            "input_materials": ["Hierro", "Agua"],
            "output_material": "Espada",
            "complexity": "simple"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(simulation_body(true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/transmute"))
        .and(body_json(json!({
            "input_materials": ["Hierro", "Agua"],
            "output_material": "Espada",
            "alchemist_id": 1
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let (controller, mut audit) = controller_for(&server);
    fill(&controller, &["Hierro", "Agua"], "Espada");

    let result = controller.simulate().await.unwrap();
    assert_eq!(result.success_rate, 80.0);
    assert!(controller.can_commit());

    controller.commit().await.unwrap();

    let draft = controller.draft();
    assert_eq!(draft.inputs.entries(), [String::new()]);
    assert_eq!(draft.output, "");
    assert_eq!(draft.complexity, Complexity::Simple);
    assert_eq!(controller.simulation(), None);
    assert_eq!(controller.phase(), WorkflowPhase::Idle);

    assert!(audit.try_recv().is_ok());
    assert!(audit.try_recv().is_err());
}

#[tokio::test]
async fn test_missing_output_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(simulation_body(true)))
        .expect(0)
        .mount(&server)
        .await;

    let (controller, _audit) = controller_for(&server);
    fill(&controller, &["Hierro"], "");

    assert!(!controller.can_simulate());
    let err = controller.simulate().await.unwrap_err();
    assert_eq!(err, TransmuteError::gate(GateViolation::MissingMaterials));
}

#[tokio::test]
async fn test_law_violation_result_is_committable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/transmute/simulate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(simulation_body(false)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/transmute"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let (controller, mut audit) = controller_for(&server);
    fill(&controller, &["Plomo"], "Oro");

    let result = controller.simulate().await.unwrap();
    assert!(!result.law_respected);
    assert!(controller.can_commit());

    controller.commit().await.unwrap();
    assert!(audit.try_recv().is_ok());
}

#[tokio::test]
async fn test_unreachable_backend_preserves_draft() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let http = BackendHttpClient::new(&uri, None, ClientSettings::default()).unwrap();
    let (tx, _rx) = mpsc::unbounded_channel();
    let controller: Controller =
        TransmutationWorkflowController::new(FeasibilityClient::new(http), tx, ActorId(1), WorkflowState::new());
    fill(&controller, &["Hierro", "Agua"], "Espada");
    let before = controller.draft();

    let err = controller.simulate().await.unwrap_err();

    assert!(err.user_message().starts_with("Simulation failed: "));
    assert_eq!(controller.draft(), before);
    assert_eq!(controller.simulation(), None);
    assert_eq!(controller.phase(), WorkflowPhase::Idle);
}

#[tokio::test]
async fn test_second_simulate_while_pending_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/transmute/simulate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(simulation_body(true))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (controller, _audit) = controller_for(&server);
    fill(&controller, &["Hierro"], "Espada");

    let (first, second) = tokio::join!(controller.simulate(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(controller.phase(), WorkflowPhase::Simulating);
        controller.simulate().await
    });

    assert!(first.is_ok());
    assert_eq!(
        second.unwrap_err(),
        TransmuteError::gate(GateViolation::InFlight(WorkflowPhase::Simulating))
    );
}

#[tokio::test]
async fn test_commit_failure_keeps_result_for_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/transmute/simulate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(simulation_body(true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/transmute"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "Base de datos no disponible" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/transmute"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let (controller, mut audit) = controller_for(&server);
    fill(&controller, &["Hierro"], "Espada");
    controller.simulate().await.unwrap();

    let err = controller.commit().await.unwrap_err();
    assert_eq!(err.user_message(), "Transmutation failed: Base de datos no disponible");
    assert!(controller.simulation().is_some());
    assert!(audit.try_recv().is_err());

    controller.commit().await.unwrap();
    assert!(audit.try_recv().is_ok());
}

#[tokio::test]
async fn test_invalidate_policy_requires_resimulation_after_edit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/transmute/simulate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(simulation_body(true)))
        .expect(2)
        .mount(&server)
        .await;

    let (controller, _audit) = controller_for(&server);
    let controller = controller.with_policy(StaleResultPolicy::Invalidate);
    fill(&controller, &["Hierro"], "Espada");

    controller.simulate().await.unwrap();
    controller.set_complexity(Complexity::Complex);
    assert!(!controller.can_commit());

    controller.simulate().await.unwrap();
    assert!(controller.can_commit());
}
