//! Profile Matcher: scores every catalog record against a query and picks the winner.
//!
//! Scoring policies plug in behind `ProfileMatcher`; selection, tie-breaking and
//! the minimum-score rule live here so every policy shares them.
//!
//! `AppState` holds an `Arc<dyn ProfileMatcher>`, chosen at startup via config.

use serde::Serialize;
use tracing::debug;

use crate::catalog::models::{Catalog, ProfileRecord};
use crate::matching::query::MatchQuery;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// A scoring policy. Implement this to swap how records are scored without
/// touching selection, handlers or callers.
pub trait ProfileMatcher: Send + Sync {
    /// One score per record, in catalog order. `query_document` is never blank
    /// and `catalog` is never empty.
    fn score_all(&self, query_document: &str, catalog: &Catalog) -> Vec<f64>;

    /// Short label reported alongside results ("tfidf" | "keyword").
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// Outcomes
// ────────────────────────────────────────────────────────────────────────────

/// A scored catalog record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult<'a> {
    pub record: &'a ProfileRecord,
    pub index: usize,
    pub score: f64,
}

/// Why no record was returned. Never an error; a normal outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NoMatchReason {
    EmptyCatalog,
    BlankQuery,
    BelowThreshold { best_score: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome<'a> {
    Matched(MatchResult<'a>),
    NoMatch(NoMatchReason),
}

impl<'a> MatchOutcome<'a> {
    #[cfg(test)]
    pub fn matched(&self) -> Option<&MatchResult<'a>> {
        match self {
            MatchOutcome::Matched(result) => Some(result),
            MatchOutcome::NoMatch(_) => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Selection
// ────────────────────────────────────────────────────────────────────────────

/// Returns the highest-scoring record, or `NoMatch`.
///
/// Ties go to the lowest catalog index. A best score equal to `minimum_score`
/// passes, so with the default of 0.0 a query sharing no vocabulary with the
/// catalog still returns the first record at score 0.
pub fn find_best_match<'a>(
    matcher: &dyn ProfileMatcher,
    query: &MatchQuery,
    catalog: &'a Catalog,
    minimum_score: f64,
) -> MatchOutcome<'a> {
    if catalog.is_empty() {
        return MatchOutcome::NoMatch(NoMatchReason::EmptyCatalog);
    }
    let Some(query_document) = query.document() else {
        return MatchOutcome::NoMatch(NoMatchReason::BlankQuery);
    };

    let scores = matcher.score_all(&query_document, catalog);

    let mut best: Option<(usize, f64)> = None;
    for (index, &score) in scores.iter().enumerate() {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }

    let Some((index, score)) = best else {
        return MatchOutcome::NoMatch(NoMatchReason::EmptyCatalog);
    };

    if score < minimum_score {
        debug!(
            backend = matcher.backend(),
            best_score = score,
            minimum_score,
            "best candidate below minimum score"
        );
        return MatchOutcome::NoMatch(NoMatchReason::BelowThreshold { best_score: score });
    }

    match catalog.get(index) {
        Some(record) => {
            debug!(backend = matcher.backend(), index, score, "matched profile");
            MatchOutcome::Matched(MatchResult {
                record,
                index,
                score,
            })
        }
        None => MatchOutcome::NoMatch(NoMatchReason::EmptyCatalog),
    }
}

/// Top `limit` records by descending score; ties in catalog order.
/// Blank query or empty catalog yields an empty list.
pub fn rank<'a>(
    matcher: &dyn ProfileMatcher,
    query: &MatchQuery,
    catalog: &'a Catalog,
    limit: usize,
) -> Vec<MatchResult<'a>> {
    if catalog.is_empty() || limit == 0 {
        return Vec::new();
    }
    let Some(query_document) = query.document() else {
        return Vec::new();
    };

    let scores = matcher.score_all(&query_document, catalog);

    let mut order: Vec<usize> = (0..scores.len().min(catalog.len())).collect();
    // sort_by is stable, so equal scores keep ascending index order.
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    order
        .into_iter()
        .take(limit)
        .filter_map(|index| {
            catalog.get(index).map(|record| MatchResult {
                record,
                index,
                score: scores[index],
            })
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
