//! Axum route handlers for the Job Match API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::catalog::models::ProfileRecord;
use crate::errors::AppError;
use crate::matching::engine::{find_best_match, rank, MatchOutcome, MatchResult, NoMatchReason};
use crate::matching::query::MatchQuery;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub query: MatchQuery,
    /// Overrides MATCH_MIN_SCORE for this request.
    pub min_score: Option<f64>,
    /// Form fields that must be filled before matching.
    #[serde(default)]
    pub required_fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub query: MatchQuery,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredProfile {
    pub index: usize,
    pub score: f64,
    pub profile: ProfileRecord,
}

impl From<&MatchResult<'_>> for ScoredProfile {
    fn from(result: &MatchResult<'_>) -> Self {
        Self {
            index: result.index,
            score: result.score,
            profile: result.record.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ScoredProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_match: Option<NoMatchReason>,
    pub backend: String,
    pub catalog_fingerprint: String,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub results: Vec<ScoredProfile>,
    pub backend: String,
    pub catalog_fingerprint: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/match
///
/// Returns the single closest job profile, or `matched: false` with the reason.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let missing = missing_required_fields(&request.query, &request.required_fields);
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Please fill all required fields: {}",
            missing.join(", ")
        )));
    }

    let min_score = match request.min_score {
        Some(score) if !score.is_finite() || score < 0.0 => {
            return Err(AppError::Validation(
                "min_score must be a non-negative number".to_string(),
            ));
        }
        Some(score) => score,
        None => state.config.match_min_score,
    };

    let catalog = state.catalog.snapshot();
    let matcher = Arc::clone(&state.matcher);
    let query = request.query;

    let response = run_blocking(move || {
        let backend = matcher.backend().to_string();
        let catalog_fingerprint = catalog.fingerprint().to_string();
        let outcome = find_best_match(matcher.as_ref(), &query, &catalog, min_score);
        match outcome {
            MatchOutcome::Matched(result) => {
                info!(
                    backend = %backend,
                    index = result.index,
                    score = result.score,
                    "Job match found"
                );
                MatchResponse {
                    matched: true,
                    result: Some(ScoredProfile::from(&result)),
                    no_match: None,
                    backend,
                    catalog_fingerprint,
                }
            }
            MatchOutcome::NoMatch(reason) => {
                info!(backend = %backend, ?reason, "No job match");
                MatchResponse {
                    matched: false,
                    result: None,
                    no_match: Some(reason),
                    backend,
                    catalog_fingerprint,
                }
            }
        }
    })
    .await?;

    Ok(Json(response))
}

/// POST /api/v1/match/rank
///
/// Returns the top `limit` profiles, best first. Blank queries yield an empty list.
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    let max = state.config.rank_limit;
    let limit = request.limit.unwrap_or(max);
    if limit == 0 || limit > max {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {max}"
        )));
    }

    let catalog = state.catalog.snapshot();
    let matcher = Arc::clone(&state.matcher);
    let query = request.query;

    let response = run_blocking(move || {
        let results: Vec<ScoredProfile> = rank(matcher.as_ref(), &query, &catalog, limit)
            .iter()
            .map(ScoredProfile::from)
            .collect();
        RankResponse {
            results,
            backend: matcher.backend().to_string(),
            catalog_fingerprint: catalog.fingerprint().to_string(),
        }
    })
    .await?;

    Ok(Json(response))
}

/// Scoring is CPU-bound (a full TF-IDF fit on a cache miss), so it runs on the
/// blocking pool rather than the async executor.
async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in job match: {e}")))
}

/// Required fields that are absent or blank in the query, in the order given.
fn missing_required_fields(query: &MatchQuery, required: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|field| query.is_blank(field))
        .cloned()
        .collect()
}
