use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, ffi::OsString, fmt, fs, path::Path, path::PathBuf};

use crate::model::Coordinate;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_FALLBACK_CITY: &str = "London";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const API_KEY_ENV: &str = "WEATHER_DASH_API_KEY";
pub const FALLBACK_CITY_ENV: &str = "WEATHER_DASH_FALLBACK_CITY";
pub const BASE_URL_ENV: &str = "WEATHER_DASH_BASE_URL";

/// Where the initial position comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeolocationMode {
    /// Look the position up from the public IP address.
    #[default]
    Ip,
    /// Use `fixed_position` from the config file.
    Fixed,
    /// Geolocation exists but the user refuses to share a position.
    Denied,
    /// No geolocation capability at all.
    None,
}

impl GeolocationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeolocationMode::Ip => "ip",
            GeolocationMode::Fixed => "fixed",
            GeolocationMode::Denied => "denied",
            GeolocationMode::None => "none",
        }
    }

    pub const fn all() -> &'static [GeolocationMode] {
        &[
            GeolocationMode::Ip,
            GeolocationMode::Fixed,
            GeolocationMode::Denied,
            GeolocationMode::None,
        ]
    }
}

impl fmt::Display for GeolocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for GeolocationMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "ip" => Ok(GeolocationMode::Ip),
            "fixed" => Ok(GeolocationMode::Fixed),
            "denied" => Ok(GeolocationMode::Denied),
            "none" => Ok(GeolocationMode::None),
            _ => Err(anyhow!(
                "Unknown geolocation mode '{value}'. Supported modes: ip, fixed, denied, none."
            )),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// fallback_city = "London"
/// geolocation = "fixed"
///
/// [fixed_position]
/// lat = 48.8566
/// lon = 2.3522
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Forecast API key. Shipped with the client, so not treated as a secret.
    pub api_key: Option<String>,
    pub fallback_city: String,
    pub base_url: String,
    pub geolocation: GeolocationMode,
    pub timeout_secs: u64,
    pub fixed_position: Option<Coordinate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            fallback_city: DEFAULT_FALLBACK_CITY.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            geolocation: GeolocationMode::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            fixed_position: None,
        }
    }
}

impl Config {
    /// Load config from disk (or defaults if absent), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env_pairs(utf8_pairs(std::env::vars_os()));
        Ok(cfg)
    }

    /// Load config from `path`, or return defaults if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to the platform config directory.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dash", "weather-dash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Override file values with non-blank `WEATHER_DASH_*` variables.
    pub fn apply_env_pairs<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();

        if let Some(key) = map.get(API_KEY_ENV) {
            self.api_key = Some(key.trim().to_string());
        }
        if let Some(city) = map.get(FALLBACK_CITY_ENV) {
            self.fallback_city = city.trim().to_string();
        }
        if let Some(url) = map.get(BASE_URL_ENV) {
            self.base_url = url.trim().to_string();
        }
    }

    /// API key, with a hint when missing.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `weather-dash configure` or set {API_KEY_ENV}."
                )
            })
    }
}

/// Keep the environment entries whose name and value are both valid UTF-8.
fn utf8_pairs<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
}
