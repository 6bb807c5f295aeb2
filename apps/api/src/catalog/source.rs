//! Catalog sources: where the job-profile rows come from.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use std::path::PathBuf;
use tracing::info;

use crate::catalog::models::ProfileRecord;
use crate::errors::AppError;
use crate::models::job_profile::JobProfileRow;

/// Loads the ordered list of profile records. Implement this to add a new
/// backing store without touching the store, matcher or handlers.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load(&self) -> Result<Vec<ProfileRecord>, AppError>;

    /// Human-readable origin, reported by the catalog summary endpoint.
    fn describe(&self) -> String;
}

// ────────────────────────────────────────────────────────────────────────────
// JSON file
// ────────────────────────────────────────────────────────────────────────────

/// A JSON file holding an array of objects, one per profile.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for JsonFileSource {
    async fn load(&self) -> Result<Vec<ProfileRecord>, AppError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound(format!(
                    "Catalog file {} not found",
                    self.path.display()
                )));
            }
            Err(e) => {
                return Err(AppError::Catalog(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let records = parse_records(&raw)?;
        info!(
            "Loaded {} job profiles from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Parses a JSON array of objects into records, in array order.
pub fn parse_records(raw: &str) -> Result<Vec<ProfileRecord>, AppError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::Validation(format!("Catalog is not valid JSON: {e}")))?;

    let Value::Array(rows) = value else {
        return Err(AppError::Validation(
            "Catalog must be a JSON array of objects".to_string(),
        ));
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            Value::Object(fields) => Ok(ProfileRecord::new(fields)),
            other => Err(AppError::Validation(format!(
                "Catalog row {index} must be an object, got {}",
                json_kind(&other)
            ))),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ────────────────────────────────────────────────────────────────────────────

/// Reads `job_profiles` ordered by `position`.
///
/// `fields` is a JSON (not JSONB) column so the column order survives.
pub struct PostgresSource {
    pool: PgPool,
}

impl PostgresSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogSource for PostgresSource {
    async fn load(&self) -> Result<Vec<ProfileRecord>, AppError> {
        let rows = sqlx::query_as::<_, JobProfileRow>(
            "SELECT id, fields FROM job_profiles ORDER BY position, id",
        )
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .into_iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>, _>>()?;

        info!("Loaded {} job profiles from PostgreSQL", records.len());
        Ok(records)
    }

    fn describe(&self) -> String {
        "postgres:job_profiles".to_string()
    }
}

fn row_to_record(row: JobProfileRow) -> Result<ProfileRecord, AppError> {
    match row.fields {
        Value::Object(fields) => Ok(ProfileRecord::new(fields)),
        other => Err(AppError::Catalog(format!(
            "job_profiles row {} has {} in fields, expected an object",
            row.id,
            json_kind(&other)
        ))),
    }
}
