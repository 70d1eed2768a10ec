use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode, Text};
use std::sync::Arc;
use tracing::{debug, warn};
use weatherview_core::{
    Config, ControllerSettings, FilePreferenceStore, MemoryPreferenceStore, PreferenceStore,
    ViewState, WeatherProvider, WeatherView, provider_from_config, render, store::CITY_KEY,
};

use crate::session;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherview", version, about = "Weather forecast with city search")]
pub struct Cli {
    /// WeatherAPI.com key; overrides the configured one.
    #[arg(long, env = "WEATHERAPI_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API key, default city and forecast length.
    Configure,

    /// Print the forecast once and exit.
    Show {
        /// City to show; defaults to the last selected city.
        city: Option<String>,

        /// Print the raw snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List locations matching a query.
    Search {
        query: String,
    },

    /// Interactive screen with search (the default).
    Run {
        /// Don't read or remember the last selected city.
        #[arg(long)]
        ephemeral: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load()?;
        if let Some(key) = self.api_key {
            config.set_api_key(key);
        }

        match self.command.unwrap_or(Command::Run { ephemeral: false }) {
            Command::Configure => configure(config),
            Command::Show { city, json } => show(&config, city, json).await,
            Command::Search { query } => search(&config, &query).await,
            Command::Run { ephemeral } => {
                let store: Arc<dyn PreferenceStore> = if ephemeral {
                    Arc::new(MemoryPreferenceStore::new())
                } else {
                    Arc::new(FilePreferenceStore::in_data_dir()?)
                };
                let provider: Arc<dyn WeatherProvider> = Arc::from(provider_from_config(&config)?);

                let view = WeatherView::with_debounce_window(
                    ControllerSettings::from(&config),
                    provider,
                    store,
                    config.debounce_window(),
                );
                session::run(view).await
            }
        }
    }
}

fn configure(mut config: Config) -> Result<()> {
    let key = Password::new("WeatherAPI.com key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(key);

    let city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?;
    if !city.trim().is_empty() {
        config.default_city = city.trim().to_string();
    }

    config.forecast_days = CustomType::<u8>::new("Forecast days:")
        .with_default(config.forecast_days)
        .with_error_message("Please enter a number between 1 and 14")
        .prompt()
        .context("Failed to read forecast days")?
        .clamp(1, 14);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(config: &Config, city: Option<String>, json: bool) -> Result<()> {
    let provider = provider_from_config(config)?;

    let city = match city {
        Some(city) => city,
        None => preferred_city(&FilePreferenceStore::in_data_dir()?, config).await,
    };
    debug!(%city, "showing forecast");

    let snapshot = provider
        .fetch_forecast(&city, config.forecast_days)
        .await
        .with_context(|| format!("Failed to fetch forecast for {city}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        let state = ViewState { snapshot: Some(snapshot), ..ViewState::default() };
        print!("{}", render(&state));
    }
    Ok(())
}

/// Last selected city, or the configured default when none is saved or the
/// store cannot be read.
async fn preferred_city(store: &dyn PreferenceStore, config: &Config) -> String {
    let saved = match store.get(CITY_KEY).await {
        Ok(city) => city,
        Err(err) => {
            warn!(error = %err, "could not read preferred city");
            None
        }
    };
    saved
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| config.default_city.clone())
}

async fn search(config: &Config, query: &str) -> Result<()> {
    let provider = provider_from_config(config)?;

    let candidates = provider
        .lookup_locations(query)
        .await
        .with_context(|| format!("Failed to look up {query:?}"))?;

    if candidates.is_empty() {
        println!("No locations match {query:?}");
    }
    for (i, loc) in candidates.iter().enumerate() {
        println!("{:>2}. {} ({}) [{:.2}, {:.2}]", i + 1, loc.label(), loc.region, loc.lat, loc.lon);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn preferred_city_uses_saved_city() {
        let store = MemoryPreferenceStore::new();
        store.set(CITY_KEY, "Paris").await.unwrap();

        assert_eq!(preferred_city(&store, &Config::default()).await, "Paris");
    }

    #[tokio::test]
    async fn unreadable_store_falls_back_to_default_city() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        std::fs::write(&path, "city = [not toml").unwrap();
        let store = FilePreferenceStore::new(&path);

        assert_eq!(preferred_city(&store, &Config::default()).await, "Islamabad");
    }
}
