use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::catalog::models::Catalog;
use crate::matching::tfidf::VectorSpace;

/// Memoizes the fitted vector space of the most recent catalog.
///
/// Keyed by catalog fingerprint: a reloaded catalog with different rows misses
/// and is refitted, so cached and uncached scoring never disagree.
#[derive(Default)]
pub struct VectorSpaceCache {
    slot: Mutex<Option<(String, Arc<VectorSpace>)>>,
}

impl VectorSpaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_fit(&self, catalog: &Catalog) -> Arc<VectorSpace> {
        {
            let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
            if let Some((fingerprint, space)) = slot.as_ref() {
                if fingerprint == catalog.fingerprint() {
                    debug!(fingerprint = %fingerprint, "vector space cache hit");
                    return Arc::clone(space);
                }
            }
        }

        // Fit outside the lock; concurrent misses may both fit, last one wins.
        let space = Arc::new(VectorSpace::fit(catalog));
        debug!(
            fingerprint = %catalog.fingerprint(),
            vocabulary = space.vocabulary_len(),
            "vector space cache miss"
        );

        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some((catalog.fingerprint().to_string(), Arc::clone(&space)));
        space
    }

    #[cfg(test)]
    pub fn cached_fingerprint(&self) -> Option<String> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.as_ref().map(|(fingerprint, _)| fingerprint.clone())
    }
}
