pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::catalog::handlers as catalog;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Catalog
        .route("/api/v1/catalog", get(catalog::handle_catalog_summary))
        .route("/api/v1/catalog/reload", post(catalog::handle_catalog_reload))
        // Job Architecture browsing
        .route("/api/v1/families", get(catalog::handle_families))
        .route("/api/v1/profiles", get(catalog::handle_list_profiles))
        .route(
            "/api/v1/profiles/compare",
            get(catalog::handle_compare_profiles),
        )
        .route("/api/v1/job-maps", get(catalog::handle_job_map))
        // Job Match
        .route("/api/v1/match", post(matching::handle_match))
        .route("/api/v1/match/rank", post(matching::handle_rank))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    use crate::catalog::models::ProfileRecord;
    use crate::catalog::source::CatalogSource;
    use crate::catalog::store::CatalogStore;
    use crate::config::Config;
    use crate::errors::AppError;
    use crate::matching::keyword::{KeywordMatcher, SignalWeights};
    use crate::matching::tfidf::TfIdfMatcher;
    use crate::matching::engine::ProfileMatcher;

    /// In-memory source whose rows can be swapped to exercise reloads.
    struct MemorySource {
        rows: Mutex<Value>,
    }

    #[async_trait]
    impl CatalogSource for MemorySource {
        async fn load(&self) -> Result<Vec<ProfileRecord>, AppError> {
            let rows = self.rows.lock().unwrap().clone();
            crate::catalog::source::parse_records(&rows.to_string())
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    fn profiles() -> Value {
        json!([
            {
                "Job Family": "Finance",
                "Sub Job Family": "Accounting",
                "Career Path": "Professional",
                "Job Profile": "Accountant",
                "Global Grade": 10,
                "Full Job Code": "FI-ACC-10",
                "Qualifications": "degree bachelor accounting"
            },
            {
                "Job Family": "IT",
                "Sub Job Family": "Engineering",
                "Career Path": "Professional",
                "Job Profile": "Engineer",
                "Global Grade": 12,
                "Full Job Code": "IT-ENG-12",
                "Qualifications": "degree computer science"
            }
        ])
    }

    fn test_config() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    async fn app_with(
        rows: Value,
        matcher: Arc<dyn ProfileMatcher>,
    ) -> (Router, Arc<MemorySource>) {
        let source = Arc::new(MemorySource {
            rows: Mutex::new(rows),
        });
        let store = CatalogStore::open(source.clone()).await.unwrap();
        let state = AppState {
            config: test_config(),
            catalog: store,
            matcher,
        };
        (build_router(state), source)
    }

    async fn app() -> Router {
        app_with(profiles(), Arc::new(TfIdfMatcher::with_cache())).await.0
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app().await, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["matcher"], "tfidf");
        assert_eq!(body["profiles"], 2);
    }

    #[tokio::test]
    async fn test_match_returns_accountant() {
        let (status, body) = send(
            app().await,
            "POST",
            "/api/v1/match",
            Some(json!({
                "query": {"Job Family": "Finance", "Qualifications": "bachelor accounting degree"}
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matched"], true);
        assert_eq!(body["backend"], "tfidf");
        assert_eq!(body["result"]["index"], 0);
        assert_eq!(body["result"]["profile"]["Job Profile"], "Accountant");
        assert!(body["result"]["score"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_match_blank_query_is_no_match_not_error() {
        let (status, body) = send(
            app().await,
            "POST",
            "/api/v1/match",
            Some(json!({"query": {"Job Family": ""}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matched"], false);
        assert_eq!(body["no_match"]["reason"], "blank_query");
    }

    #[tokio::test]
    async fn test_match_empty_catalog_is_no_match() {
        let (app, _) = app_with(json!([]), Arc::new(TfIdfMatcher::new())).await;
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/match",
            Some(json!({"query": {"Job Family": "Finance"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["no_match"]["reason"], "empty_catalog");
    }

    #[tokio::test]
    async fn test_match_min_score_above_best_is_no_match() {
        let (status, body) = send(
            app().await,
            "POST",
            "/api/v1/match",
            Some(json!({"query": {"Q": "computer science"}, "min_score": 1.01})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matched"], false);
        assert_eq!(body["no_match"]["reason"], "below_threshold");
    }

    #[tokio::test]
    async fn test_match_rejects_negative_min_score() {
        let (status, body) = send(
            app().await,
            "POST",
            "/api/v1/match",
            Some(json!({"query": {"Q": "degree"}, "min_score": -0.5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_match_lists_missing_required_fields() {
        let (status, body) = send(
            app().await,
            "POST",
            "/api/v1/match",
            Some(json!({
                "query": {"Job Family": "Finance", "Education Level": ""},
                "required_fields": ["Job Family", "Education Level", "Experience Level"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.contains("Education Level, Experience Level"), "{message}");
        assert!(!message.contains("Job Family"), "{message}");
    }

    #[tokio::test]
    async fn test_keyword_backend() {
        let weights = SignalWeights::from_json(r#"{"Qualifications": 2}"#).unwrap();
        let (app, _) = app_with(profiles(), Arc::new(KeywordMatcher::new(weights))).await;
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/match",
            Some(json!({"query": {"Skills": ["computer", "science"]}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["backend"], "keyword");
        assert_eq!(body["result"]["profile"]["Job Profile"], "Engineer");
        assert_eq!(body["result"]["score"], 4.0);
    }

    #[tokio::test]
    async fn test_rank_orders_results() {
        let (status, body) = send(
            app().await,
            "POST",
            "/api/v1/match/rank",
            Some(json!({"query": {"Q": "computer science degree"}, "limit": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["profile"]["Job Profile"], "Engineer");
        assert!(results[0]["score"].as_f64() >= results[1]["score"].as_f64());
    }

    #[tokio::test]
    async fn test_rank_rejects_limit_over_maximum() {
        let (status, _) = send(
            app().await,
            "POST",
            "/api/v1/match/rank",
            Some(json!({"query": {"Q": "degree"}, "limit": 50})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_families_and_profiles() {
        let (status, body) = send(app().await, "GET", "/api/v1/families", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["job_family"], "Finance");
        assert_eq!(body[1]["sub_families"][0]["sub_job_family"], "Engineering");

        let (status, body) = send(app().await, "GET", "/api/v1/profiles?job_family=IT", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["profiles"][0]["Job Profile"], "Engineer");
    }

    #[tokio::test]
    async fn test_compare_profiles() {
        let (status, body) = send(
            app().await,
            "GET",
            "/api/v1/profiles/compare?codes=IT-ENG-12,FI-ACC-10",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["Job Profile"], "Engineer");
        assert_eq!(body[1]["Job Profile"], "Accountant");

        let (status, body) =
            send(app().await, "GET", "/api/v1/profiles/compare?codes=XX-00", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_job_map() {
        let (status, body) = send(app().await, "GET", "/api/v1/job-maps", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["families"], json!(["Finance", "IT"]));
        assert_eq!(body["rows"][0]["grade"], "12");
        assert_eq!(body["rows"][0]["cells"][1], json!(["Engineer"]));
    }

    #[tokio::test]
    async fn test_reload_picks_up_new_rows() {
        let (app, source) = app_with(profiles(), Arc::new(TfIdfMatcher::with_cache())).await;

        let (_, before) = send(app.clone(), "GET", "/api/v1/catalog", None).await;
        assert_eq!(before["profile_count"], 2);
        assert_eq!(before["source"], "memory");

        *source.rows.lock().unwrap() = json!([
            {"Job Family": "HR", "Job Profile": "Recruiter", "Qualifications": "hiring interviews"}
        ]);
        let (status, after) = send(app.clone(), "POST", "/api/v1/catalog/reload", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(after["profile_count"], 1);
        assert_ne!(before["fingerprint"], after["fingerprint"]);

        let (_, body) = send(
            app,
            "POST",
            "/api/v1/match",
            Some(json!({"query": {"Q": "hiring"}})),
        )
        .await;
        assert_eq!(body["result"]["profile"]["Job Profile"], "Recruiter");
        assert_eq!(body["catalog_fingerprint"], after["fingerprint"]);
    }

    #[tokio::test]
    async fn test_failed_reload_reports_error_and_keeps_catalog() {
        let (app, source) = app_with(profiles(), Arc::new(TfIdfMatcher::new())).await;
        *source.rows.lock().unwrap() = json!({"not": "an array"});

        let (status, body) = send(app.clone(), "POST", "/api/v1/catalog/reload", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "CATALOG_ERROR");

        let (_, summary) = send(app, "GET", "/api/v1/catalog", None).await;
        assert_eq!(summary["profile_count"], 2);
    }
}
