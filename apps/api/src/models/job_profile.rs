use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One `job_profiles` row. `fields` holds the profile's columns as a JSON object.
#[derive(Debug, Clone, FromRow)]
pub struct JobProfileRow {
    pub id: Uuid,
    pub fields: Value,
}
