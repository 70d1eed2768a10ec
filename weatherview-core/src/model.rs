use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A resolved place, either a search candidate or the location of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    /// `name, country`, the way candidates and the header show a place.
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub condition: String,
    pub wind_kph: f64,
    pub humidity_pct: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub avg_temperature_c: f64,
    pub condition: String,
    /// Local time as reported by the provider, e.g. `06:12 AM`.
    pub sunrise: String,
}

/// Current conditions plus the daily forecast for one city.
///
/// Always replaced as a whole; the view never patches individual fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Location,
    pub current: CurrentConditions,
    pub forecast: Vec<DailyForecast>,
}

impl WeatherSnapshot {
    pub fn sunrise_today(&self) -> Option<&str> {
        self.forecast.first().map(|day| day.sunrise.as_str())
    }
}
