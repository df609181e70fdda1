use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::{Catalog, CatalogError};

/// Where a catalog snapshot comes from.
pub trait CatalogSource: Send + Sync {
    fn describe(&self) -> String;
    fn load(&self) -> Result<Catalog, CatalogError>;
}

#[derive(Clone, Debug)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for CsvFileSource {
    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    fn load(&self) -> Result<Catalog, CatalogError> {
        Catalog::from_path(&self.path)
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemorySource {
    catalog: Catalog,
}

impl InMemorySource {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

impl CatalogSource for InMemorySource {
    fn describe(&self) -> String {
        format!("memory:{} rows", self.catalog.len())
    }

    fn load(&self) -> Result<Catalog, CatalogError> {
        Ok(self.catalog.clone())
    }
}

#[derive(Debug)]
struct CachedCatalog {
    catalog: Arc<Catalog>,
    loaded_at: Instant,
}

/// Owns the current catalog snapshot and decides when to reload it.
///
/// With `ttl = None` a snapshot lives until [`CatalogCache::invalidate`] or
/// [`CatalogCache::reload`] is called. Snapshots are shared as `Arc<Catalog>`,
/// so a reload never changes a catalog a caller is already ranking against.
#[derive(Debug)]
pub struct CatalogCache<S> {
    source: S,
    ttl: Option<Duration>,
    entry: Option<CachedCatalog>,
}

impl<S: CatalogSource> CatalogCache<S> {
    pub fn new(source: S, ttl: Option<Duration>) -> Self {
        Self { source, ttl, entry: None }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn is_fresh(&self) -> bool {
        match (&self.entry, self.ttl) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(entry), Some(ttl)) => entry.loaded_at.elapsed() < ttl,
        }
    }

    /// Returns the cached snapshot, loading it first when absent or expired.
    pub fn snapshot(&mut self) -> Result<Arc<Catalog>, CatalogError> {
        if self.is_fresh() {
            if let Some(entry) = &self.entry {
                debug!(event_name = "catalog.cache.hit", source = %self.source.describe());
                return Ok(Arc::clone(&entry.catalog));
            }
        }
        self.reload()
    }

    pub fn reload(&mut self) -> Result<Arc<Catalog>, CatalogError> {
        self.entry = None;

        let catalog = match self.source.load() {
            Ok(catalog) => Arc::new(catalog),
            Err(error) => {
                warn!(
                    event_name = "catalog.cache.load_failed",
                    source = %self.source.describe(),
                    error = %error,
                    "catalog load failed"
                );
                return Err(error);
            }
        };

        info!(
            event_name = "catalog.cache.reload",
            source = %self.source.describe(),
            rows = catalog.len(),
            "catalog loaded"
        );
        self.entry = Some(CachedCatalog { catalog: Arc::clone(&catalog), loaded_at: Instant::now() });
        Ok(catalog)
    }

    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            debug!(event_name = "catalog.cache.invalidated", source = %self.source.describe());
        }
    }
}
