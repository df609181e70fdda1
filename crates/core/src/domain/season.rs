use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Autumn];

    /// Maps a calendar month (1-12) to its northern-hemisphere season.
    ///
    /// Months outside 1-12 are wrapped onto the calendar so the mapping stays total.
    pub fn from_month(month: u32) -> Self {
        match month % 12 {
            0..=2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    pub fn current() -> Self {
        Self::from_month(Local::now().month())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }

    pub fn matches_label(&self, label: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(label.trim())
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Season::ALL
            .into_iter()
            .find(|season| season.matches_label(value))
            .ok_or_else(|| DomainError::UnknownSeason(value.trim().to_owned()))
    }
}

/// Source of "now" for season derivation.
pub trait SeasonClock {
    fn current_season(&self) -> Season;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LocalSeasonClock;

impl SeasonClock for LocalSeasonClock {
    fn current_season(&self) -> Season {
        Season::current()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedSeasonClock(pub Season);

impl SeasonClock for FixedSeasonClock {
    fn current_season(&self) -> Season {
        self.0
    }
}
