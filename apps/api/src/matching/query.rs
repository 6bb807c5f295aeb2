use serde::Deserialize;
use serde_json::{Map, Value};

use crate::catalog::models::value_to_text;

/// Field selections collected by the Job Match form.
///
/// Values are scalars (single-select) or lists (multi-select). Anything else is
/// coerced to text the same way catalog values are.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct MatchQuery {
    fields: Map<String, Value>,
}

impl MatchQuery {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// True when the field is absent, null, blank, or a list with no non-blank element.
    pub fn is_blank(&self, field: &str) -> bool {
        self.fields.get(field).and_then(value_to_text).is_none()
    }

    /// Joins every non-blank fragment with single spaces.
    /// Returns `None` when nothing survives trimming.
    pub fn document(&self) -> Option<String> {
        // Lists flatten to their non-blank elements inside value_to_text.
        let parts: Vec<String> = self.fields.values().filter_map(value_to_text).collect();

        let document = parts.join(" ");
        if document.trim().is_empty() {
            None
        } else {
            Some(document)
        }
    }
}
