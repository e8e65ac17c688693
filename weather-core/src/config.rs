use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use crate::{client::WeatherClient, transport::TransportOptions};

/// Overrides the location of the config file.
pub const CONFIG_PATH_ENV: &str = "AMAP_WEATHER_CONFIG";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
///
/// [transport]
/// timeout = 5
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// API key issued by the weather service.
    pub api_key: Option<String>,

    /// Transport options applied to every request.
    #[serde(default, skip_serializing_if = "TransportOptions::is_empty")]
    pub transport: TransportOptions,
}

impl Config {
    /// Read the config from [`Config::config_file_path`]; a missing file yields defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents)
                .with_context(|| format!("Invalid weather config in {}", path.display())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err).with_context(|| format!("Cannot read {}", path.display())),
        }
    }

    /// Write the config, creating missing directories. The file holds the API key, so
    /// callers should keep it out of shared locations.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let toml = self.to_toml()?;

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
        }

        fs::write(path, toml).with_context(|| format!("Cannot write {}", path.display()))
    }

    /// `$AMAP_WEATHER_CONFIG` when set, otherwise `config.toml` in the platform config dir.
    pub fn config_file_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|path| !path.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        ProjectDirs::from("dev", "amap-weather", "weather-cli")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or_else(|| anyhow!("No config directory available; set {CONFIG_PATH_ENV}"))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Returns the stored API key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    /// Build a client, preferring `key_override` over the stored key.
    pub fn client(&self, key_override: Option<&str>) -> Result<WeatherClient> {
        let api_key = key_override
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `weather configure`, pass --key or set AMAP_WEATHER_KEY."
                )
            })?;

        let mut client = WeatherClient::new(api_key);
        client.set_transport_options(self.transport.clone());
        Ok(client)
    }
}
