use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    WeatherError,
    model::{CurrentConditions, DailyForecast, Location, WeatherSnapshot},
};

use super::WeatherProvider;

/// WeatherAPI.com error code for "No matching location found."
const NO_MATCHING_LOCATION: u32 = 1006;

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<String, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| WeatherError::Network(format!("{endpoint}: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::Network(format!("{endpoint}: failed to read body: {e}")))?;

        if status.is_success() {
            return Ok(body);
        }

        Err(classify_failure(status, &body))
    }
}

fn classify_failure(status: StatusCode, body: &str) -> WeatherError {
    if status.is_server_error() {
        return WeatherError::Network(format!("HTTP {status}: {}", truncate_body(body)));
    }

    match serde_json::from_str::<WaErrorResponse>(body) {
        Ok(err) if err.error.code == NO_MATCHING_LOCATION => WeatherError::NotFound(err.error.message),
        Ok(err) => WeatherError::Api { status: status.as_u16(), message: err.error.message },
        Err(_) => WeatherError::Api { status: status.as_u16(), message: truncate_body(body) },
    }
}

#[derive(Debug, Deserialize)]
struct WaErrorDetail {
    code: u32,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WaErrorResponse {
    error: WaErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

impl From<WaLocation> for Location {
    fn from(loc: WaLocation) -> Self {
        Location {
            name: loc.name,
            region: loc.region,
            country: loc.country,
            lat: loc.lat,
            lon: loc.lon,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    wind_kph: f64,
    humidity: u8,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    avgtemp_c: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaAstro {
    #[serde(default)]
    sunrise: String,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: String,
    day: WaDay,
    astro: WaAstro,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    current: WaCurrent,
    forecast: WaForecast,
}

impl TryFrom<WaForecastResponse> for WeatherSnapshot {
    type Error = WeatherError;

    fn try_from(parsed: WaForecastResponse) -> Result<Self, Self::Error> {
        let forecast = parsed
            .forecast
            .forecastday
            .into_iter()
            .map(|fd| {
                let date = NaiveDate::parse_from_str(&fd.date, "%Y-%m-%d")
                    .map_err(|e| WeatherError::Parse(format!("invalid forecast date {:?}: {e}", fd.date)))?;

                Ok(DailyForecast {
                    date,
                    avg_temperature_c: fd.day.avgtemp_c,
                    condition: fd.day.condition.text,
                    sunrise: fd.astro.sunrise,
                })
            })
            .collect::<Result<Vec<_>, WeatherError>>()?;

        Ok(WeatherSnapshot {
            location: parsed.location.into(),
            current: CurrentConditions {
                temperature_c: parsed.current.temp_c,
                condition: parsed.current.condition.text,
                wind_kph: parsed.current.wind_kph,
                humidity_pct: parsed.current.humidity,
            },
            forecast,
        })
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    #[instrument(skip(self))]
    async fn lookup_locations(&self, query: &str) -> Result<Vec<Location>, WeatherError> {
        let body = self.get("search.json", &[("q", query)]).await?;

        let parsed: Vec<WaLocation> = serde_json::from_str(&body)
            .map_err(|e| WeatherError::Parse(format!("search: {e}")))?;

        debug!(count = parsed.len(), "location lookup finished");
        Ok(parsed.into_iter().map(Location::from).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_forecast(&self, city: &str, days: u8) -> Result<WeatherSnapshot, WeatherError> {
        let days = days.max(1).to_string();

        let body = self
            .get(
                "forecast.json",
                &[("q", city), ("days", days.as_str()), ("aqi", "no"), ("alerts", "no")],
            )
            .await
            .map_err(|e| match e {
                WeatherError::NotFound(_) => WeatherError::NotFound(city.to_string()),
                other => other,
            })?;

        let parsed: WaForecastResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::Parse(format!("forecast: {e}")))?;

        let snapshot = WeatherSnapshot::try_from(parsed)?;
        debug!(location = %snapshot.location.name, days = snapshot.forecast.len(), "forecast fetched");
        Ok(snapshot)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
