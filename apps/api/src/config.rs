use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

/// Which scoring policy backs the Job Match endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchStrategy {
    #[default]
    TfIdf,
    Keyword,
}

impl FromStr for MatchStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tfidf" | "tf-idf" => Ok(MatchStrategy::TfIdf),
            "keyword" | "keywords" => Ok(MatchStrategy::Keyword),
            other => bail!("unknown match strategy '{other}', expected 'tfidf' or 'keyword'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails with the offending variable named if a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    /// When set, the catalog is read from PostgreSQL instead of `catalog_path`.
    pub database_url: Option<String>,
    pub catalog_path: PathBuf,
    pub match_strategy: MatchStrategy,
    pub match_min_score: f64,
    pub signal_weights_path: Option<PathBuf>,
    pub cache_vectors: bool,
    /// Default and maximum `limit` for ranked matches.
    pub rank_limit: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let match_min_score: f64 = parse_or(&get, "MATCH_MIN_SCORE", 0.0)?;
        if !match_min_score.is_finite() || match_min_score < 0.0 {
            bail!("MATCH_MIN_SCORE must be a non-negative number");
        }

        let rank_limit: usize = parse_or(&get, "MATCH_RANK_LIMIT", 5)?;
        if rank_limit == 0 {
            bail!("MATCH_RANK_LIMIT must be at least 1");
        }

        Ok(Config {
            database_url: get("DATABASE_URL"),
            catalog_path: get("CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/job_profiles.json")),
            match_strategy: parse_or(&get, "MATCH_STRATEGY", MatchStrategy::TfIdf)?,
            match_min_score,
            signal_weights_path: get("MATCH_SIGNAL_WEIGHTS_PATH").map(PathBuf::from),
            cache_vectors: match get("MATCH_CACHE_VECTORS") {
                Some(raw) => parse_bool(&raw).context("MATCH_CACHE_VECTORS must be a boolean")?,
                None => true,
            },
            rank_limit,
            port: parse_or(&get, "PORT", 8080)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} is invalid ('{raw}'): {e}")),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("'{other}' is not a boolean"),
    }
}
