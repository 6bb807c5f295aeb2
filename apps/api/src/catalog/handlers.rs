use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::models::{Catalog, ProfileRecord};
use crate::catalog::taxonomy::{
    compare_profiles, family_tree, filter_profiles, job_map, FamilyNode, JobMap, ProfileFilter,
};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CatalogSummary {
    pub profile_count: usize,
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
    pub source: String,
}

impl CatalogSummary {
    fn new(catalog: &Catalog, source: String) -> Self {
        Self {
            profile_count: catalog.len(),
            fingerprint: catalog.fingerprint().to_string(),
            loaded_at: catalog.loaded_at(),
            source,
        }
    }
}

#[derive(Serialize)]
pub struct ProfileListResponse {
    pub total: usize,
    pub profiles: Vec<ProfileRecord>,
}

#[derive(Deserialize)]
pub struct CompareQuery {
    /// Comma-separated full job codes.
    pub codes: String,
}

/// GET /api/v1/catalog
pub async fn handle_catalog_summary(State(state): State<AppState>) -> Json<CatalogSummary> {
    let catalog = state.catalog.snapshot();
    Json(CatalogSummary::new(
        &catalog,
        state.catalog.source_description(),
    ))
}

/// POST /api/v1/catalog/reload
pub async fn handle_catalog_reload(
    State(state): State<AppState>,
) -> Result<Json<CatalogSummary>, AppError> {
    let catalog = state.catalog.reload().await?;
    Ok(Json(CatalogSummary::new(
        &catalog,
        state.catalog.source_description(),
    )))
}

/// GET /api/v1/families
pub async fn handle_families(State(state): State<AppState>) -> Json<Vec<FamilyNode>> {
    Json(family_tree(&state.catalog.snapshot()))
}

/// GET /api/v1/profiles
pub async fn handle_list_profiles(
    State(state): State<AppState>,
    Query(filter): Query<ProfileFilter>,
) -> Json<ProfileListResponse> {
    let catalog = state.catalog.snapshot();
    let profiles: Vec<ProfileRecord> = filter_profiles(&catalog, &filter)
        .into_iter()
        .cloned()
        .collect();
    Json(ProfileListResponse {
        total: profiles.len(),
        profiles,
    })
}

/// GET /api/v1/profiles/compare?codes=A,B,C
pub async fn handle_compare_profiles(
    State(state): State<AppState>,
    Query(params): Query<CompareQuery>,
) -> Result<Json<Vec<ProfileRecord>>, AppError> {
    let catalog = state.catalog.snapshot();
    let codes: Vec<String> = params.codes.split(',').map(str::to_string).collect();
    let profiles = compare_profiles(&catalog, &codes)?;
    Ok(Json(profiles.into_iter().cloned().collect()))
}

/// GET /api/v1/job-maps
pub async fn handle_job_map(State(state): State<AppState>) -> Json<JobMap> {
    Json(job_map(&state.catalog.snapshot()))
}
