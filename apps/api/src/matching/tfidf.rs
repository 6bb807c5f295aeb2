//! TF-IDF cosine-similarity scoring: the default matching policy.
//!
//! Algorithm:
//! 1. One document per record: every non-blank field, in field order.
//! 2. Vocabulary = every token across all documents.
//! 3. weight(t, d) = count(t, d) × idf(t), idf(t) = ln((1 + n) / (1 + df(t))) + 1
//! 4. Rows and the query vector are L2-normalized; score = dot product.
//!
//! Query tokens outside the vocabulary carry no weight.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use crate::catalog::models::Catalog;
use crate::matching::cache::VectorSpaceCache;
use crate::matching::engine::ProfileMatcher;
use crate::matching::text::{record_document, tokenize};

/// Sparse, L2-normalized vector: (term index, weight), sorted by term index.
pub type SparseVector = Vec<(usize, f64)>;

/// TF-IDF space fitted on one catalog snapshot.
#[derive(Debug, Clone)]
pub struct VectorSpace {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<SparseVector>,
}

impl VectorSpace {
    pub fn fit(catalog: &Catalog) -> Self {
        let documents: Vec<Vec<String>> = catalog
            .records()
            .iter()
            .map(|record| tokenize(&record_document(record)))
            .collect();

        // Sorted vocabulary so term indices do not depend on hash order.
        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &documents {
            let mut seen: Vec<&str> = tokens.iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for token in seen {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
        }

        let n = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (token, df)) in document_frequency.into_iter().enumerate() {
            vocabulary.insert(token.to_string(), index);
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
        }

        let mut space = Self {
            vocabulary,
            idf,
            rows: Vec::new(),
        };
        let rows: Vec<SparseVector> = documents.iter().map(|tokens| space.vectorize(tokens)).collect();
        space.rows = rows;

        debug!(
            documents = space.rows.len(),
            vocabulary = space.vocabulary.len(),
            "fitted tf-idf vector space"
        );
        space
    }

    /// Projects text into the space. Unknown tokens are dropped.
    pub fn transform(&self, text: &str) -> SparseVector {
        self.vectorize(&tokenize(text))
    }

    /// Cosine similarity of `text` against every fitted row, in row order.
    pub fn similarities(&self, text: &str) -> Vec<f64> {
        let query = self.transform(text);
        if query.is_empty() {
            return vec![0.0; self.rows.len()];
        }
        let lookup: HashMap<usize, f64> = query.into_iter().collect();
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .filter_map(|(term, weight)| lookup.get(term).map(|q| q * weight))
                    .sum::<f64>()
            })
            .collect()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    fn vectorize(&self, tokens: &[String]) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokens {
            if let Some(&term) = self.vocabulary.get(token) {
                *counts.entry(term).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(term, tf)| (term, tf * self.idf[term]))
            .collect();

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Vec::new();
        }
        for (_, weight) in vector.iter_mut() {
            *weight /= norm;
        }
        vector
    }
}

/// Scores records by TF-IDF cosine similarity.
///
/// Without a cache the space is refitted on every call. With one, the fitted
/// space is reused for as long as the catalog fingerprint is unchanged.
#[derive(Default)]
pub struct TfIdfMatcher {
    cache: Option<VectorSpaceCache>,
}

impl TfIdfMatcher {
    pub fn new() -> Self {
        Self { cache: None }
    }

    pub fn with_cache() -> Self {
        Self {
            cache: Some(VectorSpaceCache::new()),
        }
    }

    fn space_for(&self, catalog: &Catalog) -> Arc<VectorSpace> {
        match &self.cache {
            Some(cache) => cache.get_or_fit(catalog),
            None => Arc::new(VectorSpace::fit(catalog)),
        }
    }
}

impl ProfileMatcher for TfIdfMatcher {
    fn score_all(&self, query_document: &str, catalog: &Catalog) -> Vec<f64> {
        self.space_for(catalog).similarities(query_document)
    }

    fn backend(&self) -> &'static str {
        "tfidf"
    }
}
