pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod recommend;

pub use catalog::{Catalog, CatalogCache, CatalogError, CatalogSource, CsvFileSource, InMemorySource};
pub use domain::outfit::{Gender, OutfitFields, OutfitRecord};
pub use domain::season::{FixedSeasonClock, LocalSeasonClock, Season, SeasonClock};
pub use domain::weather::WeatherObservation;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use recommend::{
    Preference, Recommendation, RecommendationEngine, RecommendationOutcome,
    RecommendationRequest, RecommendationService,
};
