// Core types for the transmutation workflow

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Difficulty tier sent with a simulation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Basic materials
    #[default]
    Simple,
    /// Combinations
    Moderate,
    /// Advanced creations
    Complex,
}

impl Complexity {
    pub const ALL: [Complexity; 3] = [Complexity::Simple, Complexity::Moderate, Complexity::Complex];

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown complexity '{0}' (expected simple, moderate or complex)")]
pub struct ParseComplexityError(pub String);

impl FromStr for Complexity {
    type Err = ParseComplexityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Complexity::Simple),
            "moderate" => Ok(Complexity::Moderate),
            "complex" => Ok(Complexity::Complex),
            other => Err(ParseComplexityError(other.to_string())),
        }
    }
}

/// Identifier of the alchemist recorded as the author of a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u64);

impl ActorId {
    /// Used when the session carries no user id
    pub const FALLBACK: ActorId = ActorId(1);
}

impl Default for ActorId {
    fn default() -> Self {
        Self::FALLBACK
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Feasibility verdict computed by the backend for one draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub cost: f64,
    /// Percentage in 0..=100
    pub success_rate: f64,
    pub energy_required: f64,
    pub law_respected: bool,
    pub risk_assessment: String,
    pub estimated_time: String,
}

impl SimulationResult {
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::classify(&self.risk_assessment)
    }
}

/// Severity extracted from the free-text risk assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    Low,
    High,
    Forbidden,
}

impl RiskLevel {
    pub fn classify(assessment: &str) -> Self {
        if assessment.contains("FORBIDDEN") {
            RiskLevel::Forbidden
        } else if assessment.contains("HIGH") {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Forbidden => write!(f, "forbidden"),
        }
    }
}

/// Confirmation returned by a successful commit. Every field is optional since
/// only success or failure of the call is load-bearing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub law_respected: Option<bool>,
    #[serde(default)]
    pub input_materials_used: Vec<String>,
}

/// Body of `POST /api/transmute/simulate`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRequest<'a> {
    pub input_materials: &'a [String],
    pub output_material: &'a str,
    pub complexity: Complexity,
}

/// Body of `POST /api/transmute`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitRequest<'a> {
    pub input_materials: &'a [String],
    pub output_material: &'a str,
    pub alchemist_id: ActorId,
}

/// Request for the audit-log view to refetch. Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuditRefreshSignal;

/// Externally visible phase of the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowPhase {
    Idle,
    Simulating,
    Simulated,
    Committing,
}

impl WorkflowPhase {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, WorkflowPhase::Simulating | WorkflowPhase::Committing)
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowPhase::Idle => write!(f, "idle"),
            WorkflowPhase::Simulating => write!(f, "simulating"),
            WorkflowPhase::Simulated => write!(f, "simulated"),
            WorkflowPhase::Committing => write!(f, "committing"),
        }
    }
}

/// What happens to a stored simulation result when the draft is edited afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleResultPolicy {
    /// Keep the result; commit stays available for the edited draft
    #[default]
    Retain,
    /// Drop the result as soon as the draft no longer matches the one simulated
    Invalidate,
}
