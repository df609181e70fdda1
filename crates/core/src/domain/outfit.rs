use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::season::Season;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unisex,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unisex => "unisex",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "unisex" => Ok(Gender::Unisex),
            _ => Err(DomainError::UnknownGender(value.trim().to_owned())),
        }
    }
}

/// One validated catalog row.
///
/// Constructed through [`OutfitRecord::new`], which enforces finite bounds and
/// `min_temp <= max_temp`; fields are read-only afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutfitRecord {
    weather: String,
    min_temp: f64,
    max_temp: f64,
    gender: Gender,
    activity: String,
    season: Season,
    formality: String,
    suggestion: String,
}

/// Unvalidated row fields, in catalog column order.
#[derive(Clone, Debug, Default)]
pub struct OutfitFields {
    pub weather: String,
    pub min_temp: f64,
    pub max_temp: f64,
    pub gender: String,
    pub activity: String,
    pub season: String,
    pub formality: String,
    pub suggestion: String,
}

impl OutfitRecord {
    pub fn new(fields: OutfitFields) -> Result<Self, DomainError> {
        if !fields.min_temp.is_finite() {
            return Err(DomainError::NonFiniteTemperature { field: "min_temp" });
        }
        if !fields.max_temp.is_finite() {
            return Err(DomainError::NonFiniteTemperature { field: "max_temp" });
        }
        if fields.min_temp > fields.max_temp {
            return Err(DomainError::InvalidTemperatureRange {
                min: fields.min_temp.to_string(),
                max: fields.max_temp.to_string(),
            });
        }

        let weather = fields.weather.trim().to_owned();
        if weather.is_empty() {
            return Err(DomainError::InvariantViolation("weather must not be empty".to_owned()));
        }
        let suggestion = fields.suggestion.trim().to_owned();
        if suggestion.is_empty() {
            return Err(DomainError::InvariantViolation(
                "suggestion must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            weather,
            min_temp: fields.min_temp,
            max_temp: fields.max_temp,
            gender: fields.gender.parse()?,
            activity: fields.activity.trim().to_owned(),
            season: fields.season.parse()?,
            formality: fields.formality.trim().to_owned(),
            suggestion,
        })
    }

    pub fn weather(&self) -> &str {
        &self.weather
    }

    pub fn min_temp(&self) -> f64 {
        self.min_temp
    }

    pub fn max_temp(&self) -> f64 {
        self.max_temp
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn activity(&self) -> &str {
        &self.activity
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn formality(&self) -> &str {
        &self.formality
    }

    pub fn suggestion(&self) -> &str {
        &self.suggestion
    }

    pub fn contains_temperature(&self, temperature: f64) -> bool {
        self.min_temp <= temperature && temperature <= self.max_temp
    }

    pub fn midpoint(&self) -> f64 {
        (self.min_temp + self.max_temp) / 2.0
    }

    /// Display form of the range, e.g. `15–25°C`.
    pub fn temp_range(&self) -> String {
        format!("{}–{}°C", self.min_temp, self.max_temp)
    }
}
