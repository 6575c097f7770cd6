use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{CustomType, InquireError, Select, Text};
use tracing::debug;
use weather_core::{
    Config, Coordinate, Dashboard, ForecastResponse, GeolocationMode, LoadState, RequestKind,
    location::resolver_from_config, presenter, provider::source_from_config,
};

use crate::render::DashboardView;

const QUIT_COMMAND: &str = ":q";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dash", version, about = "Terminal weather dashboard")]
pub struct Cli {
    /// Log more detail to stderr (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, fallback city and geolocation mode.
    Configure,

    /// Show the forecast for your location, or the fallback city.
    Show {
        /// Print the derived views as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the forecast for a city.
    Search {
        /// City name, e.g. "Lisbon".
        city: String,

        /// Print the derived views as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Your location first, then search cities until `:q`.
    Dashboard,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { json } => {
                let config = Config::load()?;
                debug!(geolocation = %config.geolocation, fallback = %config.fallback_city, "initial load");
                let resolver = resolver_from_config(&config)?;
                let source = source_from_config(&config)?;

                let mut dash = Dashboard::new();
                dash.load_initial(&resolver, source.as_ref()).await;

                report(&mut dash, json, "")?;
                Ok(exit_code(dash.state(RequestKind::Initial)))
            }
            Command::Search { city, json } => {
                let config = Config::load()?;
                let source = source_from_config(&config)?;

                let mut dash = Dashboard::new();
                if dash.search(&city, source.as_ref()).await.is_none() {
                    bail!("City name must not be empty.");
                }

                report(&mut dash, json, &city)?;
                Ok(exit_code(dash.state(RequestKind::Search)))
            }
            Command::Dashboard => {
                run_dashboard().await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

async fn run_dashboard() -> anyhow::Result<()> {
    let config = Config::load()?;
    debug!(geolocation = %config.geolocation, fallback = %config.fallback_city, "starting dashboard");
    let resolver = resolver_from_config(&config)?;
    let source = source_from_config(&config)?;

    let mut dash = Dashboard::new();
    println!("Loading...");
    dash.load_initial(&resolver, source.as_ref()).await;
    report(&mut dash, false, "")?;

    loop {
        let input = match Text::new("Search for cities:")
            .with_help_message("Enter a city name, empty to refresh, :q to quit")
            .prompt()
        {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read city input"),
        };

        let input = input.trim();
        if input == QUIT_COMMAND {
            break;
        }

        if !input.is_empty() {
            println!("Loading...");
            dash.search(input, source.as_ref()).await;
        }
        report(&mut dash, false, input)?;
    }

    Ok(())
}

/// Print the pending alert (stderr) and whatever forecast is on display.
fn report(dash: &mut Dashboard, json: bool, searched: &str) -> anyhow::Result<()> {
    if let Some(alert) = dash.take_alert() {
        eprintln!("alert: {alert}");
    }

    print!("{}", render_output(dash.displayed(), json, searched)?);
    Ok(())
}

/// Stdout text for the displayed forecast. In JSON mode a missing forecast
/// is `null` so the output always parses.
fn render_output(
    displayed: Option<&ForecastResponse>,
    json: bool,
    searched: &str,
) -> anyhow::Result<String> {
    let out = match displayed {
        Some(forecast) if json => {
            let out = serde_json::to_string_pretty(&presenter::summarize(forecast))
                .context("Failed to serialize forecast to JSON")?;
            format!("{out}\n")
        }
        Some(forecast) => DashboardView::new(forecast).to_string(),
        None if json => "null\n".to_string(),
        None if searched.is_empty() => "No weather data available.\n".to_string(),
        None => format!("No weather data available for {searched}\n"),
    };
    Ok(out)
}

fn exit_code(state: LoadState) -> ExitCode {
    if load_failed(state) { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

fn load_failed(state: LoadState) -> bool {
    state == LoadState::Failed
}

fn configure() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    let mut config = Config::load_from(&path)?;

    let api_key = Text::new("OpenWeather API key:")
        .with_default(config.api_key.as_deref().unwrap_or_default())
        .prompt()
        .context("Failed to read API key")?;
    config.api_key = Some(api_key.trim().to_string()).filter(|key| !key.is_empty());

    let fallback_city = Text::new("Fallback city:")
        .with_default(&config.fallback_city)
        .prompt()
        .context("Failed to read fallback city")?;
    if !fallback_city.trim().is_empty() {
        config.fallback_city = fallback_city.trim().to_string();
    }

    let modes = GeolocationMode::all().to_vec();
    let start = modes.iter().position(|m| *m == config.geolocation).unwrap_or(0);
    config.geolocation = Select::new("Where should your position come from?", modes)
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read geolocation mode")?;

    if config.geolocation == GeolocationMode::Fixed {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a number")
            .prompt()
            .context("Failed to read latitude")?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a number")
            .prompt()
            .context("Failed to read longitude")?;
        config.fixed_position = Some(Coordinate::new(latitude, longitude)?);
    }

    config.save_to(&path)?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
