use std::sync::Arc;

use crate::catalog::store::CatalogStore;
use crate::config::Config;
use crate::matching::engine::ProfileMatcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Live catalog snapshot plus the source it reloads from.
    pub catalog: CatalogStore,
    /// Pluggable scoring policy. Default: TfIdfMatcher. Swap via MATCH_STRATEGY env.
    pub matcher: Arc<dyn ProfileMatcher>,
}
