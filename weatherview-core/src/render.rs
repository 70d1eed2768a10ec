//! Presentation: turns a [`ViewState`] into a [`Screen`].
//!
//! Nothing here talks to the provider or the preference store. `render` is a
//! pure function, and `Screen`'s `Display` impl draws it for a terminal.

use chrono::NaiveDate;
use std::fmt;

use crate::{
    WeatherSnapshot,
    controller::{FetchFailure, ViewState},
};

/// Artwork shown for a condition label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherIcon {
    Sun,
    PartlyCloudy,
    Cloud,
    Mist,
    ModerateRain,
    HeavyRain,
    /// Anything the table below doesn't know.
    Other,
}

impl WeatherIcon {
    /// Case-insensitive; surrounding whitespace is ignored.
    pub fn for_condition(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "sunny" | "clear" => WeatherIcon::Sun,
            "partly cloudy" => WeatherIcon::PartlyCloudy,
            "cloudy" | "overcast" => WeatherIcon::Cloud,
            "mist" => WeatherIcon::Mist,
            "patchy rain possible"
            | "patchy rain nearby"
            | "light rain"
            | "moderate rain"
            | "moderate rain at times" => WeatherIcon::ModerateRain,
            "heavy rain"
            | "heavy rain at times"
            | "moderate or heavy freezing rain"
            | "moderate or heavy rain shower"
            | "moderate or heavy rain with thunder" => WeatherIcon::HeavyRain,
            _ => WeatherIcon::Other,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            WeatherIcon::Sun => "☀",
            WeatherIcon::PartlyCloudy => "⛅",
            WeatherIcon::Cloud => "☁",
            WeatherIcon::Mist => "🌫",
            WeatherIcon::ModerateRain => "🌦",
            WeatherIcon::HeavyRain => "🌧",
            WeatherIcon::Other => "🌡",
        }
    }
}

/// `23°`, `23.4°`.
pub fn degrees(value: f64) -> String {
    format!("{value}\u{00B0}")
}

/// English short weekday name, e.g. `Mon`.
pub fn weekday_short(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchBar {
    pub open: bool,
    pub query: String,
    /// `name, country` per candidate, in rank order.
    pub candidates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub wind: String,
    pub humidity: String,
    pub sunrise: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayCard {
    pub weekday: String,
    pub icon: WeatherIcon,
    pub temperature: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPanel {
    pub city: String,
    pub country: String,
    pub icon: WeatherIcon,
    pub temperature: String,
    pub condition: String,
    pub stats: Stats,
    pub days: Vec<DayCard>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Weather(WeatherPanel),
    Failure { city: String, message: String },
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    /// Full-screen spinner; nothing else is interactive.
    Loading,
    Main { search: SearchBar, body: Body },
}

pub fn render(state: &ViewState) -> Screen {
    if state.loading {
        return Screen::Loading;
    }

    let search = SearchBar {
        open: state.search_open,
        query: if state.search_open { state.query.clone() } else { String::new() },
        candidates: if state.search_open {
            state.candidates.iter().map(|c| c.label()).collect()
        } else {
            Vec::new()
        },
    };

    let body = match (&state.failure, &state.snapshot) {
        (Some(failure), _) => failure_body(failure),
        (None, Some(snapshot)) => Body::Weather(weather_panel(snapshot)),
        (None, None) => Body::Empty,
    };

    Screen::Main { search, body }
}

fn failure_body(failure: &FetchFailure) -> Body {
    Body::Failure { city: failure.city.clone(), message: failure.error.to_string() }
}

pub fn weather_panel(snapshot: &WeatherSnapshot) -> WeatherPanel {
    let current = &snapshot.current;

    WeatherPanel {
        city: snapshot.location.name.clone(),
        country: snapshot.location.country.clone(),
        icon: WeatherIcon::for_condition(&current.condition),
        temperature: degrees(current.temperature_c),
        condition: current.condition.trim().to_string(),
        stats: Stats {
            wind: format!("{} km", current.wind_kph),
            humidity: format!("{}%", current.humidity_pct),
            sunrise: snapshot.sunrise_today().map(str::to_string),
        },
        days: snapshot
            .forecast
            .iter()
            .map(|day| DayCard {
                weekday: weekday_short(day.date),
                icon: WeatherIcon::for_condition(&day.condition),
                temperature: degrees(day.avg_temperature_c),
            })
            .collect(),
    }
}

impl fmt::Display for SearchBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.open {
            return writeln!(f, "{:>40}", "[/] search");
        }

        writeln!(f, "Search city: {}_   [/] close", self.query)?;
        for (i, candidate) in self.candidates.iter().enumerate() {
            writeln!(f, "  {:>2}. {candidate}", i + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for WeatherPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        if self.country.is_empty() {
            writeln!(f, "  {}", self.city)?;
        } else {
            writeln!(f, "  {}, {}", self.city, self.country)?;
        }
        writeln!(f)?;
        writeln!(f, "    {}  {}", self.icon.glyph(), self.temperature)?;
        writeln!(f, "    {}", self.condition)?;
        writeln!(f)?;

        write!(f, "  wind {}   humidity {}", self.stats.wind, self.stats.humidity)?;
        if let Some(sunrise) = &self.stats.sunrise {
            write!(f, "   sunrise {sunrise}")?;
        }
        writeln!(f)?;

        if !self.days.is_empty() {
            writeln!(f)?;
            writeln!(f, "  Daily forecast")?;
            for day in &self.days {
                writeln!(f, "    {:<4}{}  {}", day.weekday, day.icon.glyph(), day.temperature)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Loading => writeln!(f, "Loading..."),
            Screen::Main { search, body } => {
                write!(f, "{search}")?;
                match body {
                    Body::Weather(panel) => write!(f, "{panel}"),
                    Body::Failure { city, message } => {
                        writeln!(f)?;
                        writeln!(f, "  Could not load weather for {city}: {message}")?;
                        writeln!(f, "  [r] retry   [/] search another city")
                    }
                    Body::Empty => Ok(()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        WeatherError,
        model::{CurrentConditions, DailyForecast, Location},
    };

    fn snapshot(condition: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            location: Location {
                name: "Islamabad".into(),
                region: "Islamabad".into(),
                country: "Pakistan".into(),
                lat: 33.7,
                lon: 73.17,
            },
            current: CurrentConditions {
                temperature_c: 31.0,
                condition: condition.into(),
                wind_kph: 11.2,
                humidity_pct: 41,
            },
            forecast: vec![
                DailyForecast {
                    // A Monday.
                    date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
                    avg_temperature_c: 29.4,
                    condition: "Sunny".into(),
                    sunrise: "05:14 AM".into(),
                },
                DailyForecast {
                    date: NaiveDate::from_ymd_opt(2024, 5, 7).unwrap(),
                    avg_temperature_c: 27.0,
                    condition: "Volcanic ash".into(),
                    sunrise: "05:13 AM".into(),
                },
            ],
        }
    }

    fn ready_state(condition: &str) -> ViewState {
        ViewState { snapshot: Some(snapshot(condition)), ..ViewState::default() }
    }

    #[test]
    fn known_conditions_map_to_icons() {
        assert_eq!(WeatherIcon::for_condition("Partly cloudy"), WeatherIcon::PartlyCloudy);
        assert_eq!(WeatherIcon::for_condition("Partly Cloudy "), WeatherIcon::PartlyCloudy);
        assert_eq!(WeatherIcon::for_condition("Clear"), WeatherIcon::Sun);
        assert_eq!(WeatherIcon::for_condition("Overcast"), WeatherIcon::Cloud);
        assert_eq!(WeatherIcon::for_condition("Light rain"), WeatherIcon::ModerateRain);
        assert_eq!(
            WeatherIcon::for_condition("Moderate or heavy rain with thunder"),
            WeatherIcon::HeavyRain
        );
    }

    #[test]
    fn unmapped_condition_uses_fallback_icon() {
        assert_eq!(WeatherIcon::for_condition("Volcanic ash"), WeatherIcon::Other);
        assert_eq!(WeatherIcon::for_condition(""), WeatherIcon::Other);

        let screen = render(&ready_state("Blowing plasma"));
        let Screen::Main { body: Body::Weather(panel), .. } = &screen else {
            panic!("expected weather panel, got {screen:?}");
        };
        assert_eq!(panel.icon, WeatherIcon::Other);
        assert_eq!(panel.days[1].icon, WeatherIcon::Other);
        assert!(screen.to_string().contains(WeatherIcon::Other.glyph()));
    }

    #[test]
    fn weekday_and_degrees_formatting() {
        assert_eq!(weekday_short(NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()), "Mon");
        assert_eq!(weekday_short(NaiveDate::from_ymd_opt(2024, 5, 12).unwrap()), "Sun");
        assert_eq!(degrees(23.0), "23°");
        assert_eq!(degrees(-4.5), "-4.5°");
    }

    #[test]
    fn loading_renders_only_the_spinner() {
        let state = ViewState { loading: true, ..ready_state("Sunny") };
        assert_eq!(render(&state), Screen::Loading);
    }

    #[test]
    fn ready_panel_contents() {
        let screen = render(&ready_state("Partly cloudy"));
        let Screen::Main { search, body: Body::Weather(panel) } = &screen else {
            panic!("expected weather panel, got {screen:?}");
        };

        assert!(!search.open);
        assert_eq!(panel.city, "Islamabad");
        assert_eq!(panel.country, "Pakistan");
        assert_eq!(panel.temperature, "31°");
        assert_eq!(panel.stats.wind, "11.2 km");
        assert_eq!(panel.stats.humidity, "41%");
        assert_eq!(panel.stats.sunrise.as_deref(), Some("05:14 AM"));
        let weekdays: Vec<_> = panel.days.iter().map(|d| d.weekday.as_str()).collect();
        assert_eq!(weekdays, ["Mon", "Tue"]);

        let text = screen.to_string();
        assert!(text.contains("Islamabad, Pakistan"));
        assert!(text.contains("Daily forecast"));
        assert!(text.contains("29.4°"));
    }

    #[test]
    fn open_search_lists_numbered_candidates() {
        let mut state = ready_state("Sunny");
        state.search_open = true;
        state.query = "Par".into();
        state.candidates = vec![Location {
            name: "Paris".into(),
            region: "Ile-de-France".into(),
            country: "France".into(),
            lat: 48.87,
            lon: 2.33,
        }];

        let screen = render(&state);
        let Screen::Main { search, .. } = &screen else {
            panic!("expected main screen");
        };
        assert_eq!(search.candidates, ["Paris, France"]);
        assert!(screen.to_string().contains(" 1. Paris, France"));
    }

    #[test]
    fn failure_renders_retry_hint() {
        let state = ViewState {
            failure: Some(FetchFailure {
                city: "Atlantis".into(),
                error: WeatherError::NotFound("Atlantis".into()),
            }),
            ..ViewState::default()
        };

        let text = render(&state).to_string();
        assert!(text.contains("Could not load weather for Atlantis"));
        assert!(text.contains("[r] retry"));
    }

    #[test]
    fn empty_forecast_renders_without_sunrise() {
        let mut state = ready_state("Sunny");
        if let Some(s) = state.snapshot.as_mut() {
            s.forecast.clear();
        }

        let text = render(&state).to_string();
        assert!(!text.contains("sunrise"));
        assert!(!text.contains("Daily forecast"));
    }
}
