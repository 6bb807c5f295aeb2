//! Keyword-overlap scoring: the transparent alternative to TF-IDF.
//!
//! Algorithm:
//! 1. Query tags = normalized keyword set of the query document.
//! 2. For each signal field: overlap = |query tags ∩ field tags|.
//! 3. score = Σ(overlap × field weight)
//!
//! Weights are supplied from outside (field name → positive integer) so the
//! matcher carries no assumptions about the catalog schema.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;

use crate::catalog::models::{value_to_text, Catalog, ProfileRecord};
use crate::matching::engine::ProfileMatcher;
use crate::matching::text::keyword_tags;

/// One signal field and how decisive it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalField {
    pub field: String,
    pub weight: u32,
}

/// Ordered signal-field table. Empty means "every field, weight 1".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalWeights {
    fields: Vec<SignalField>,
}

impl SignalWeights {
    pub fn new(fields: Vec<SignalField>) -> Result<Self> {
        for signal in &fields {
            if signal.field.trim().is_empty() {
                bail!("signal field name cannot be empty");
            }
            if signal.weight == 0 {
                bail!("signal field '{}' must have a positive weight", signal.field);
            }
        }
        Ok(Self { fields })
    }

    /// Parses a JSON object such as `{"Qualifications": 3, "Job Family": 2}`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let map: Map<String, Value> =
            serde_json::from_str(raw).context("signal weights must be a JSON object")?;

        let mut fields = Vec::with_capacity(map.len());
        for (field, weight) in map {
            let weight = weight
                .as_u64()
                .and_then(|w| u32::try_from(w).ok())
                .with_context(|| format!("weight for '{field}' must be a positive integer"))?;
            fields.push(SignalField {
                field: field.trim().to_string(),
                weight,
            });
        }
        Self::new(fields)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read signal weights from {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid signal weights in {}", path.display()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[SignalField] {
        &self.fields
    }
}

/// Scores records by weighted keyword overlap with the query.
#[derive(Debug, Clone, Default)]
pub struct KeywordMatcher {
    weights: SignalWeights,
}

impl KeywordMatcher {
    pub fn new(weights: SignalWeights) -> Self {
        Self { weights }
    }

    fn score_record(&self, query_tags: &BTreeSet<String>, record: &ProfileRecord) -> u64 {
        let overlap = |value: Option<&Value>| -> u64 {
            value
                .and_then(value_to_text)
                .map(|text| keyword_tags(&text).intersection(query_tags).count() as u64)
                .unwrap_or(0)
        };

        if self.weights.is_empty() {
            return record.fields().map(|(_, value)| overlap(Some(value))).sum();
        }

        self.weights
            .fields()
            .iter()
            .map(|signal| overlap(record.get(&signal.field)) * u64::from(signal.weight))
            .sum()
    }
}

impl ProfileMatcher for KeywordMatcher {
    fn score_all(&self, query_document: &str, catalog: &Catalog) -> Vec<f64> {
        let query_tags = keyword_tags(query_document);
        catalog
            .records()
            .iter()
            .map(|record| self.score_record(&query_tags, record) as f64)
            .collect()
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}
