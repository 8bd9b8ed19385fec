//! Terminal view model for the transmutation panel.
//!
//! Everything here is derived from a [`WorkflowSnapshot`]; the view never
//! decides what is enabled on its own.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::catalog::CatalogPreview;
use crate::transmutation::{
    CommitReceipt, Complexity, RiskLevel, SimulationResult, TransmuteError, WorkflowPhase,
    WorkflowSnapshot,
};

pub const SIMULATE_LABEL: &str = "Simulate transmutation";
pub const SIMULATING_LABEL: &str = "Calculating...";
pub const COMMIT_LABEL: &str = "Perform transmutation";
pub const COMMITTING_LABEL: &str = "Transmuting...";
pub const LAW_WARNING: &str =
    "This transmutation violates the Law of Equivalent Exchange. Adjust the input or output materials.";
const COMMIT_SUCCESS: &str = "Transmutation performed successfully!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    /// 1-based row number shown to the user
    pub position: usize,
    pub text: String,
    pub placeholder: String,
    pub removable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultCard {
    pub result: SimulationResult,
    pub risk: RiskLevel,
    pub law_warning: Option<&'static str>,
    pub simulated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub rows: Vec<RowView>,
    pub output: String,
    pub complexity: Complexity,
    pub phase: WorkflowPhase,
    pub simulate: ButtonView,
    pub commit: ButtonView,
    pub result: Option<ResultCard>,
}

impl PanelView {
    pub fn from_snapshot(snapshot: &WorkflowSnapshot) -> Self {
        let removable = snapshot.draft.inputs.len() > 1;
        let rows = snapshot
            .draft
            .inputs
            .slots()
            .map(|slot| RowView {
                position: slot.index + 1,
                text: slot.text.to_string(),
                placeholder: format!("Material {} (e.g. Hierro, Agua, Madera...)", slot.index + 1),
                removable,
            })
            .collect();

        let result = snapshot.result.as_ref().map(|stamped| {
            let result = stamped.result().clone();
            ResultCard {
                risk: result.risk_level(),
                law_warning: (!result.law_respected).then_some(LAW_WARNING),
                simulated_at: stamped.simulated_at(),
                result,
            }
        });

        Self {
            rows,
            output: snapshot.draft.output.clone(),
            complexity: snapshot.draft.complexity,
            phase: snapshot.phase,
            simulate: ButtonView {
                label: if snapshot.phase == WorkflowPhase::Simulating {
                    SIMULATING_LABEL
                } else {
                    SIMULATE_LABEL
                },
                enabled: snapshot.can_simulate(),
            },
            commit: ButtonView {
                label: if snapshot.phase == WorkflowPhase::Committing {
                    COMMITTING_LABEL
                } else {
                    COMMIT_LABEL
                },
                enabled: snapshot.can_commit(),
            },
            result,
        }
    }
}

fn complexity_hint(complexity: Complexity) -> &'static str {
    match complexity {
        Complexity::Simple => "basic materials",
        Complexity::Moderate => "combinations",
        Complexity::Complex => "advanced creations",
    }
}

fn marker(enabled: bool) -> &'static str {
    if enabled {
        "▶"
    } else {
        "⏸"
    }
}

impl fmt::Display for PanelView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "⚡ TRANSMUTATION CIRCLE ({})", self.phase)?;
        writeln!(f, "Input materials:")?;
        for row in &self.rows {
            let text = if row.text.is_empty() {
                format!("<{}>", row.placeholder)
            } else {
                row.text.clone()
            };
            let remove = if row.removable { "  [remove]" } else { "" };
            writeln!(f, "  {}. {}{}", row.position, text, remove)?;
        }
        let output = if self.output.is_empty() {
            "<What do you want to create? (e.g. Espada, Cura, Escudo...)>"
        } else {
            self.output.as_str()
        };
        writeln!(f, "Output material: {}", output)?;
        writeln!(
            f,
            "Complexity: {} ({})",
            self.complexity,
            complexity_hint(self.complexity)
        )?;
        writeln!(f, "{} {}", marker(self.simulate.enabled), self.simulate.label)?;
        write!(f, "{} {}", marker(self.commit.enabled), self.commit.label)?;
        if let Some(card) = &self.result {
            writeln!(f)?;
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}

impl fmt::Display for ResultCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = &self.result;
        writeln!(
            f,
            "📊 SIMULATION RESULT ({})",
            self.simulated_at.format("%H:%M:%S UTC")
        )?;
        writeln!(f, "   💰 Estimated cost: {} ₣", result.cost)?;
        writeln!(f, "   🎯 Success rate: {}%", result.success_rate)?;
        writeln!(f, "   ⚡ Energy required: {} UE", result.energy_required)?;
        writeln!(
            f,
            "   ⚖️  Law respected: {}",
            if result.law_respected { "✅ yes" } else { "❌ no" }
        )?;
        writeln!(f, "   ⚠️  Risk: {} ({})", result.risk_assessment, self.risk)?;
        write!(f, "   ⏱️  Estimated time: {}", result.estimated_time)?;
        if let Some(warning) = self.law_warning {
            writeln!(f)?;
            write!(f, "   ⚠️  Warning: {}", warning)?;
        }
        Ok(())
    }
}

/// One-line outcome shown after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn from_simulation(outcome: &Result<SimulationResult, TransmuteError>) -> Self {
        match outcome {
            Ok(result) => Notice::Success(format!(
                "Simulation complete: {}% success, risk {}",
                result.success_rate,
                result.risk_level()
            )),
            Err(err) => Notice::Error(err.user_message()),
        }
    }

    pub fn from_commit(outcome: &Result<CommitReceipt, TransmuteError>) -> Self {
        match outcome {
            Ok(receipt) => Notice::Success(
                receipt
                    .message
                    .clone()
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| COMMIT_SUCCESS.to_string()),
            ),
            Err(err) => Notice::Error(err.user_message()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Success(message) => write!(f, "✨ {}", message),
            Notice::Error(message) => write!(f, "❌ {}", message),
        }
    }
}

/// Catalog preview block with the "N more" hint
pub fn render_catalog(preview: &CatalogPreview) -> String {
    let mut out = String::from("📦 AVAILABLE MATERIALS\n");
    if preview.is_empty() {
        out.push_str("   (catalog is empty)\n");
        return out;
    }
    for material in &preview.shown {
        out.push_str(&format!(
            "   • {} [{}] {}\n",
            material.name, material.kind, material.rarity
        ));
    }
    if preview.remaining > 0 {
        out.push_str(&format!(
            "   ... and {} more materials available\n",
            preview.remaining
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Material;
    use crate::transmutation::{GateViolation, TransmutationDraft};

    fn result(law_respected: bool, risk: &str) -> SimulationResult {
        SimulationResult {
            cost: 50.0,
            success_rate: 80.0,
            energy_required: 20.0,
            law_respected,
            risk_assessment: risk.to_string(),
            estimated_time: "5m".to_string(),
        }
    }

    fn snapshot(draft: TransmutationDraft, phase: WorkflowPhase) -> WorkflowSnapshot {
        WorkflowSnapshot {
            draft,
            result: None,
            phase,
        }
    }

    #[test]
    fn test_single_row_is_not_removable() {
        let view = PanelView::from_snapshot(&snapshot(TransmutationDraft::new(), WorkflowPhase::Idle));
        assert_eq!(view.rows.len(), 1);
        assert!(!view.rows[0].removable);
        assert_eq!(view.rows[0].placeholder, "Material 1 (e.g. Hierro, Agua, Madera...)");
        assert!(!view.simulate.enabled);
        assert!(!view.commit.enabled);
    }

    #[test]
    fn test_rows_are_numbered_from_one() {
        let draft = TransmutationDraft::with_materials(["Hierro", "Agua"], "Espada", Complexity::Simple);
        let view = PanelView::from_snapshot(&snapshot(draft, WorkflowPhase::Idle));
        assert_eq!(view.rows[1].position, 2);
        assert!(view.rows.iter().all(|row| row.removable));
        assert!(view.simulate.enabled);
        assert_eq!(view.simulate.label, SIMULATE_LABEL);
    }

    #[test]
    fn test_in_flight_labels_and_disabled_buttons() {
        let draft = TransmutationDraft::with_materials(["Hierro"], "Espada", Complexity::Simple);
        let view = PanelView::from_snapshot(&snapshot(draft.clone(), WorkflowPhase::Simulating));
        assert_eq!(view.simulate.label, SIMULATING_LABEL);
        assert!(!view.simulate.enabled);

        let view = PanelView::from_snapshot(&snapshot(draft, WorkflowPhase::Committing));
        assert_eq!(view.commit.label, COMMITTING_LABEL);
        assert!(!view.commit.enabled);
    }

    #[test]
    fn test_notices_from_outcomes() {
        let ok = Notice::from_simulation(&Ok(result(true, "HIGH: volatile")));
        assert_eq!(ok, Notice::Success("Simulation complete: 80% success, risk high".to_string()));

        let failed = Notice::from_simulation(&Err(TransmuteError::gate(GateViolation::MissingMaterials)));
        assert!(failed.is_error());

        let committed = Notice::from_commit(&Ok(CommitReceipt::default()));
        assert_eq!(committed, Notice::Success(COMMIT_SUCCESS.to_string()));

        let receipt = CommitReceipt {
            message: Some("Transmutación completada".to_string()),
            ..CommitReceipt::default()
        };
        assert_eq!(
            Notice::from_commit(&Ok(receipt)).to_string(),
            "✨ Transmutación completada"
        );
    }

    #[test]
    fn test_result_card_warns_on_law_violation() {
        let card = ResultCard {
            result: result(false, "FORBIDDEN"),
            risk: RiskLevel::Forbidden,
            law_warning: Some(LAW_WARNING),
            simulated_at: Utc::now(),
        };
        let rendered = card.to_string();
        assert!(rendered.contains("❌ no"));
        assert!(rendered.contains("Law of Equivalent Exchange"));
        assert!(rendered.contains("(forbidden)"));
    }

    #[test]
    fn test_catalog_rendering_shows_remainder() {
        let materials = (1..=10)
            .map(|id| Material {
                id,
                name: format!("M{id}"),
                kind: "metal".to_string(),
                rarity: "common".to_string(),
                base_value: 1.0,
                danger_level: "safe".to_string(),
            })
            .collect();
        let rendered = render_catalog(&CatalogPreview::from_materials(materials, 8));
        assert!(rendered.contains("M8"));
        assert!(!rendered.contains("M9"));
        assert!(rendered.contains("... and 2 more materials available"));
    }
}
