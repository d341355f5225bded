use std::fmt::{Display, Formatter};

use indexmap::IndexMap;

/// The per-bind accumulator for attempted values and binding/validation
/// errors, keyed by model name.
///
/// A model can be bound and still be invalid: binding and validation are
/// decoupled, and both write here instead of raising.
#[derive(Debug, Default)]
pub struct ModelState {
    entries: IndexMap<String, ModelStateEntry>,
}

/// What has been recorded under a single model name.
#[derive(Debug, Default)]
pub struct ModelStateEntry {
    /// The raw value that binding attempted to convert, as supplied.
    pub attempted_value: Option<String>,
    pub errors: Vec<ModelError>,
}

/// A single binding or validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelError {
    message: String,
}

impl ModelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ModelState {
    /// Record the raw value binding attempted under `name`.
    pub fn set_attempted_value(&mut self, name: &str, raw: String) {
        self.entries.entry(name.to_owned()).or_default().attempted_value = Some(raw);
    }

    pub fn add_error(&mut self, name: &str, message: impl Into<String>) {
        self.entries
            .entry(name.to_owned())
            .or_default()
            .errors
            .push(ModelError::new(message));
    }

    /// `true` when no entry carries an error.
    pub fn is_valid(&self) -> bool {
        self.entries.values().all(|entry| entry.errors.is_empty())
    }

    pub fn entry(&self, name: &str) -> Option<&ModelStateEntry> {
        self.entries.get(name)
    }

    pub fn errors(&self, name: &str) -> &[ModelError] {
        self.entry(name).map(|e| e.errors.as_slice()).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelStateEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_tracks_errors_not_attempted_values() {
        let mut state = ModelState::default();
        state.set_attempted_value("age", "abc".into());
        assert!(state.is_valid());

        state.add_error("age", "`abc` cannot be parsed as a `int`");
        assert!(!state.is_valid());
        assert_eq!(state.errors("age").len(), 1);
        assert_eq!(
            state.entry("age").unwrap().attempted_value.as_deref(),
            Some("abc")
        );
        assert!(state.errors("name").is_empty());
    }
}
