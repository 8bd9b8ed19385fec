use async_trait::async_trait;
use tracing::{info, warn};

use crate::http::BackendHttpClient;
use crate::observability::backend_metrics;
use crate::transmutation::errors::{GateViolation, TransmuteError};
use crate::transmutation::traits::FeasibilityApi;
use crate::transmutation::types::{
    ActorId, CommitReceipt, CommitRequest, Complexity, SimulationRequest, SimulationResult,
};

pub const SIMULATE_PATH: &str = "/api/transmute/simulate";
pub const COMMIT_PATH: &str = "/api/transmute";

/// Stateless wrapper around the simulate and commit endpoints
#[derive(Debug, Clone)]
pub struct FeasibilityClient {
    http: BackendHttpClient,
}

impl FeasibilityClient {
    pub fn new(http: BackendHttpClient) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &BackendHttpClient {
        &self.http
    }
}

/// Trimmed non-blank inputs and trimmed output, or the gate violation
fn normalize(inputs: &[String], output: &str) -> Result<(Vec<String>, String), TransmuteError> {
    let inputs: Vec<String> = inputs
        .iter()
        .map(|input| input.trim())
        .filter(|input| !input.is_empty())
        .map(str::to_string)
        .collect();
    let output = output.trim();

    if inputs.is_empty() || output.is_empty() {
        return Err(TransmuteError::gate(GateViolation::MissingMaterials));
    }
    Ok((inputs, output.to_string()))
}

#[async_trait]
impl FeasibilityApi for FeasibilityClient {
    async fn simulate(
        &self,
        inputs: &[String],
        output: &str,
        complexity: Complexity,
    ) -> Result<SimulationResult, TransmuteError> {
        let (inputs, output) = normalize(inputs, output)?;
        let request = SimulationRequest {
            input_materials: &inputs,
            output_material: &output,
            complexity,
        };

        backend_metrics().record_simulation();
        let result: SimulationResult = self
            .http
            .post_json(SIMULATE_PATH, &request)
            .await
            .map_err(|e| {
                warn!(error = %e, "Simulation request failed");
                TransmuteError::FeasibilityCheckFailed {
                    message: e.user_message(),
                }
            })?;

        info!(
            inputs = inputs.len(),
            output = %output,
            %complexity,
            cost = result.cost,
            success_rate = result.success_rate,
            law_respected = result.law_respected,
            "Simulation completed"
        );
        Ok(result)
    }

    async fn commit(
        &self,
        inputs: &[String],
        output: &str,
        actor_id: ActorId,
    ) -> Result<CommitReceipt, TransmuteError> {
        let (inputs, output) = normalize(inputs, output)?;
        let request = CommitRequest {
            input_materials: &inputs,
            output_material: &output,
            alchemist_id: actor_id,
        };

        backend_metrics().record_commit();
        let receipt: CommitReceipt = self
            .http
            .post_json_lenient(COMMIT_PATH, &request)
            .await
            .map_err(|e| {
                warn!(error = %e, "Commit request failed");
                TransmuteError::CommitFailed {
                    message: e.user_message(),
                }
            })?;

        info!(inputs = inputs.len(), output = %output, %actor_id, "Transmutation recorded");
        Ok(receipt)
    }
}
