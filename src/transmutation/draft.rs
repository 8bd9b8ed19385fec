use crate::transmutation::editor::MaterialListEditor;
use crate::transmutation::types::Complexity;

/// Mutable form state for one transmutation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransmutationDraft {
    pub inputs: MaterialListEditor,
    pub output: String,
    pub complexity: Complexity,
}

/// Normalized snapshot of the part of a draft the backend sees. Two drafts with
/// equal fingerprints produce identical simulate requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DraftFingerprint {
    pub inputs: Vec<String>,
    pub output: String,
    pub complexity: Complexity,
}

impl TransmutationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_materials<I, S>(inputs: I, output: impl Into<String>, complexity: Complexity) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: MaterialListEditor::from_entries(inputs),
            output: output.into(),
            complexity,
        }
    }

    /// Output non-blank and at least one non-blank input, ignoring whitespace
    pub fn can_transmute(&self) -> bool {
        !self.output.trim().is_empty() && self.inputs.has_non_empty_input()
    }

    pub fn fingerprint(&self) -> DraftFingerprint {
        DraftFingerprint {
            inputs: self.inputs.non_empty_inputs().map(str::to_string).collect(),
            output: self.output.trim().to_string(),
            complexity: self.complexity,
        }
    }

    pub fn is_initial(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_requires_output_and_input() {
        let mut draft = TransmutationDraft::new();
        assert!(!draft.can_transmute());

        draft.inputs.update_slot(0, "Hierro").unwrap();
        assert!(!draft.can_transmute());

        draft.output = "   ".to_string();
        assert!(!draft.can_transmute());

        draft.output = "Espada".to_string();
        assert!(draft.can_transmute());

        draft.inputs.add_slot();
        draft.inputs.add_slot();
        assert!(draft.can_transmute());
    }

    #[test]
    fn test_fingerprint_ignores_blank_rows_and_whitespace() {
        let a = TransmutationDraft::with_materials(["Hierro", "", " Agua"], "Espada ", Complexity::Simple);
        let b = TransmutationDraft::with_materials(["Hierro", "Agua"], "Espada", Complexity::Simple);
        assert_ne!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = TransmutationDraft::with_materials(["Hierro", "Agua"], "Espada", Complexity::Complex);
        assert_ne!(b.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_initial_draft_shape() {
        let draft = TransmutationDraft::new();
        assert!(draft.is_initial());
        assert_eq!(draft.inputs.len(), 1);
        assert_eq!(draft.output, "");
        assert_eq!(draft.complexity, Complexity::Simple);
    }
}
