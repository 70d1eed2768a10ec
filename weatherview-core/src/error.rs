use thiserror::Error;

/// Failures reported by a [`WeatherProvider`](crate::WeatherProvider).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// Transport failure, timeout or a server-side (5xx) error. No data.
    #[error("network error: {0}")]
    Network(String),

    /// The provider could not resolve the requested city.
    #[error("location not found: {0}")]
    NotFound(String),

    /// Any other non-success answer, e.g. a rejected API key.
    #[error("weather API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse weather API response: {0}")]
    Parse(String),
}

impl WeatherError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, WeatherError::NotFound(_))
    }
}
