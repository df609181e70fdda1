//! Outfit catalog: the immutable table of candidate records that every
//! recommendation is computed against.

mod cache;
mod loader;

use std::collections::BTreeSet;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::outfit::{OutfitFields, OutfitRecord};
use crate::errors::DomainError;

pub use cache::{CatalogCache, CatalogSource, CsvFileSource, InMemorySource};
pub use loader::REQUIRED_COLUMNS;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not write catalog `{path}`: {source}")]
    WriteFile { path: PathBuf, source: std::io::Error },
    #[error("catalog is missing required column `{column}`")]
    MissingColumn { column: &'static str },
    #[error("malformed catalog data at line {line}: {source}")]
    Malformed { line: u64, source: csv::Error },
    #[error("invalid catalog row at line {line}: {source}")]
    InvalidRow { line: u64, source: DomainError },
    #[error("could not encode catalog: {0}")]
    Encode(#[source] csv::Error),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    records: Vec<OutfitRecord>,
}

impl Catalog {
    pub fn new(records: Vec<OutfitRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[OutfitRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct weather labels, sorted.
    pub fn conditions(&self) -> Vec<String> {
        distinct(self.records.iter().map(OutfitRecord::weather))
    }

    pub fn activities(&self) -> Vec<String> {
        distinct(self.records.iter().map(OutfitRecord::activity))
    }

    pub fn formalities(&self) -> Vec<String> {
        distinct(self.records.iter().map(OutfitRecord::formality))
    }

    /// The six-row reference dataset. Seeds go through the same validation as CSV rows.
    pub fn sample() -> Result<Self, DomainError> {
        let records =
            SAMPLE_SEEDS.iter().copied().map(OutfitSeed::to_record).collect::<Result<_, _>>()?;
        Ok(Self { records })
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct OutfitSeed {
    weather: &'static str,
    min_temp: f64,
    max_temp: f64,
    gender: &'static str,
    activity: &'static str,
    season: &'static str,
    formality: &'static str,
    suggestion: &'static str,
}

impl OutfitSeed {
    fn to_record(self) -> Result<OutfitRecord, DomainError> {
        OutfitRecord::new(OutfitFields {
            weather: self.weather.to_owned(),
            min_temp: self.min_temp,
            max_temp: self.max_temp,
            gender: self.gender.to_owned(),
            activity: self.activity.to_owned(),
            season: self.season.to_owned(),
            formality: self.formality.to_owned(),
            suggestion: self.suggestion.to_owned(),
        })
    }
}

const SAMPLE_SEEDS: &[OutfitSeed] = &[
    OutfitSeed {
        weather: "Clear",
        min_temp: 30.0,
        max_temp: 45.0,
        gender: "unisex",
        activity: "casual",
        season: "summer",
        formality: "casual",
        suggestion: "T-shirt, shorts and sunglasses.",
    },
    OutfitSeed {
        weather: "Clear",
        min_temp: 10.0,
        max_temp: 20.0,
        gender: "unisex",
        activity: "travel",
        season: "spring",
        formality: "smart casual",
        suggestion: "Jeans and a light jacket work well.",
    },
    OutfitSeed {
        weather: "Rain",
        min_temp: 5.0,
        max_temp: 15.0,
        gender: "unisex",
        activity: "casual",
        season: "autumn",
        formality: "smart casual",
        suggestion: "Raincoat and boots, and don't forget an umbrella.",
    },
    OutfitSeed {
        weather: "Snow",
        min_temp: -10.0,
        max_temp: 0.0,
        gender: "unisex",
        activity: "casual",
        season: "winter",
        formality: "casual",
        suggestion: "Heavy coat, beanie, scarf and gloves.",
    },
    OutfitSeed {
        weather: "Clouds",
        min_temp: 15.0,
        max_temp: 25.0,
        gender: "male",
        activity: "casual",
        season: "summer",
        formality: "casual",
        suggestion: "Linen shirt and light-coloured trousers.",
    },
    OutfitSeed {
        weather: "Thunderstorm",
        min_temp: 20.0,
        max_temp: 30.0,
        gender: "unisex",
        activity: "travel",
        season: "summer",
        formality: "smart casual",
        suggestion: "Wear a raincoat and carry an umbrella.",
    },
];
