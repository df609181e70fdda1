use std::sync::Arc;

use crate::catalog::{Catalog, CatalogCache, CatalogError, CatalogSource};
use crate::domain::season::SeasonClock;

use super::engine::RecommendationEngine;
use super::types::{RecommendationOutcome, RecommendationRequest};

/// Recommendation entry point with its catalog cache and clock injected.
///
/// Only catalog loading can fail; a request that matches nothing yields an
/// empty outcome.
pub struct RecommendationService<S, C> {
    cache: CatalogCache<S>,
    engine: RecommendationEngine,
    clock: C,
}

impl<S: CatalogSource, C: SeasonClock> RecommendationService<S, C> {
    pub fn new(cache: CatalogCache<S>, engine: RecommendationEngine, clock: C) -> Self {
        Self { cache, engine, clock }
    }

    pub fn recommend(
        &mut self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationOutcome, CatalogError> {
        let catalog = self.cache.snapshot()?;
        Ok(self.engine.recommend(&catalog, request, &self.clock))
    }

    pub fn catalog(&mut self) -> Result<Arc<Catalog>, CatalogError> {
        self.cache.snapshot()
    }

    pub fn reload_catalog(&mut self) -> Result<Arc<Catalog>, CatalogError> {
        self.cache.reload()
    }

    pub fn invalidate_catalog(&mut self) {
        self.cache.invalidate();
    }
}
