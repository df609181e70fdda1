use serde::{Deserialize, Serialize};

/// Current conditions for a location, as reported by a weather provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub temperature_c: f64,
    /// Short category label, e.g. `Clear`, `Rain`, `Clouds`.
    pub condition: String,
}

impl WeatherObservation {
    pub fn new(temperature_c: f64, condition: impl Into<String>) -> Self {
        Self { temperature_c, condition: condition.into() }
    }
}
