use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// One row of the job-profile catalog.
///
/// Fields keep the order the source supplied them in (spreadsheet column order).
/// Values are left as raw JSON; the matcher coerces them to text on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProfileRecord {
    fields: Map<String, Value>,
}

impl ProfileRecord {
    /// Builds a record, trimming whitespace around field names.
    ///
    /// Names that collide once trimmed keep every value: the field becomes a
    /// list holding them in column order.
    pub fn new(fields: Map<String, Value>) -> Self {
        let mut trimmed: Map<String, Value> = Map::with_capacity(fields.len());
        for (name, value) in fields {
            let name = name.trim().to_string();
            match trimmed.get_mut(&name) {
                Some(Value::Array(existing)) => existing.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    trimmed.insert(name, value);
                }
            }
        }
        Self { fields: trimmed }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Coerced, trimmed text of a field. `None` when absent or blank.
    pub fn text(&self, field: &str) -> Option<String> {
        self.fields
            .get(field)
            .and_then(value_to_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Coerces a JSON value to the text the matcher tokenizes.
///
/// Nulls and blank strings yield `None`. Lists are flattened element by element,
/// skipping blanks; objects fall back to their compact JSON text.
pub fn value_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_to_text).collect();
            parts.join(" ")
        }
        Value::Object(_) => value.to_string(),
    };

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Immutable snapshot of the catalog.
///
/// The fingerprint is a SHA-256 over every record's JSON text in catalog order,
/// so two catalogs with the same rows in the same order share it.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<ProfileRecord>,
    fingerprint: String,
    loaded_at: DateTime<Utc>,
}

impl Catalog {
    pub fn new(records: Vec<ProfileRecord>) -> Self {
        let fingerprint = compute_fingerprint(&records);
        Self {
            records,
            fingerprint,
            loaded_at: Utc::now(),
        }
    }

    pub fn records(&self) -> &[ProfileRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&ProfileRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

impl FromIterator<ProfileRecord> for Catalog {
    fn from_iter<I: IntoIterator<Item = ProfileRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn compute_fingerprint(records: &[ProfileRecord]) -> String {
    let mut hasher = Sha256::new();
    hasher.update((records.len() as u64).to_le_bytes());
    for record in records {
        // Map<String, Value> serialization cannot fail.
        let encoded = serde_json::to_vec(&record.fields).unwrap_or_default();
        hasher.update((encoded.len() as u64).to_le_bytes());
        hasher.update(&encoded);
    }
    hex::encode(hasher.finalize())
}
