use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::catalog::models::Catalog;
use crate::catalog::source::CatalogSource;
use crate::errors::AppError;

/// Holds the live catalog snapshot and the source it is reloaded from.
///
/// Readers take an `Arc<Catalog>` and keep it for the whole request, so a
/// concurrent reload never changes the catalog under a running match.
#[derive(Clone)]
pub struct CatalogStore {
    source: Arc<dyn CatalogSource>,
    current: Arc<RwLock<Arc<Catalog>>>,
}

impl CatalogStore {
    /// Loads the first snapshot. Fails if the source cannot be read.
    pub async fn open(source: Arc<dyn CatalogSource>) -> Result<Self, AppError> {
        let records = source.load().await?;
        let catalog = Catalog::new(records);
        info!(
            profiles = catalog.len(),
            fingerprint = %catalog.fingerprint(),
            "Catalog loaded from {}",
            source.describe()
        );
        Ok(Self {
            source,
            current: Arc::new(RwLock::new(Arc::new(catalog))),
        })
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Re-reads the source and swaps the snapshot. On failure the previous
    /// snapshot stays live.
    ///
    /// Any source failure is reported as `AppError::Catalog`: the data lives on
    /// the server, so a bad or missing file is never the caller's fault.
    pub async fn reload(&self) -> Result<Arc<Catalog>, AppError> {
        let records = match self.source.load().await {
            Ok(records) => records,
            Err(e) => {
                warn!("Catalog reload from {} failed: {e}", self.source.describe());
                return Err(AppError::Catalog(e.to_string()));
            }
        };

        let catalog = Arc::new(Catalog::new(records));
        {
            let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
            *guard = Arc::clone(&catalog);
        }
        info!(
            profiles = catalog.len(),
            fingerprint = %catalog.fingerprint(),
            "Catalog reloaded"
        );
        Ok(catalog)
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::source::JsonFileSource;

    async fn store_with(contents: &str) -> (tempfile::TempDir, std::path::PathBuf, CatalogStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        std::fs::write(&path, contents).unwrap();
        let store = CatalogStore::open(Arc::new(JsonFileSource::new(&path)))
            .await
            .unwrap();
        (dir, path, store)
    }

    #[tokio::test]
    async fn test_open_loads_snapshot() {
        let (_dir, _path, store) = store_with(r#"[{"Job Profile": "Analyst"}]"#).await;
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_reload_swaps_snapshot_but_keeps_old_readers_intact() {
        let (_dir, path, store) = store_with(r#"[{"Job Profile": "Analyst"}]"#).await;
        let before = store.snapshot();

        std::fs::write(&path, r#"[{"Job Profile": "Analyst"}, {"Job Profile": "Manager"}]"#)
            .unwrap();
        let after = store.reload().await.unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
        assert_eq!(store.snapshot().fingerprint(), after.fingerprint());
        assert_ne!(before.fingerprint(), after.fingerprint());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_snapshot() {
        let (_dir, path, store) = store_with(r#"[{"Job Profile": "Analyst"}]"#).await;
        let before = store.snapshot();

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(store.reload().await, Err(AppError::Catalog(_))));
        assert_eq!(store.snapshot().fingerprint(), before.fingerprint());
    }

    #[tokio::test]
    async fn test_reload_of_deleted_file_is_catalog_error() {
        let (_dir, path, store) = store_with(r#"[{"Job Profile": "Analyst"}]"#).await;
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(store.reload().await, Err(AppError::Catalog(_))));
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_open_fails_on_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(JsonFileSource::new(dir.path().join("absent.json")));
        assert!(CatalogStore::open(source).await.is_err());
    }
}
