use crate::transmutation::errors::TransmuteError;

/// One row of the input list. Rows are addressed purely by position; there
/// is no identity that survives an insertion or removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputMaterialSlot<'a> {
    pub index: usize,
    pub text: &'a str,
}

/// Ordered, variable-length list of free-text input materials.
///
/// Always holds at least one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialListEditor {
    entries: Vec<String>,
}

impl Default for MaterialListEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialListEditor {
    /// A list with a single blank row
    pub fn new() -> Self {
        Self {
            entries: vec![String::new()],
        }
    }

    /// Build from existing texts; an empty iterator yields a single blank row
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
        if entries.is_empty() {
            Self::new()
        } else {
            Self { entries }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The list always holds at least one row
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn slots(&self) -> impl Iterator<Item = InputMaterialSlot<'_>> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, text)| InputMaterialSlot { index, text })
    }

    pub fn add_slot(&mut self) {
        self.entries.push(String::new());
    }

    pub fn update_slot(&mut self, index: usize, text: impl Into<String>) -> Result<(), TransmuteError> {
        let len = self.entries.len();
        match self.entries.get_mut(index) {
            Some(entry) => {
                *entry = text.into();
                Ok(())
            }
            None => Err(TransmuteError::IndexOutOfRange { index, len }),
        }
    }

    /// Removes the row at `index` unless it is the only one left.
    /// Returns whether a row was removed.
    pub fn remove_slot(&mut self, index: usize) -> bool {
        if self.entries.len() <= 1 || index >= self.entries.len() {
            return false;
        }
        self.entries.remove(index);
        true
    }

    /// Trimmed texts of all non-blank rows, in order
    pub fn non_empty_inputs(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
    }

    pub fn has_non_empty_input(&self) -> bool {
        self.non_empty_inputs().next().is_some()
    }
}
