use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use mileage_core::distance::DirectionsConfig;
use mileage_core::oauth::OAuthClientConfig;

pub const ENV_MAPS_API_KEY: &str = "GOOGLE_MAPS_API_KEY";
pub const ENV_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MileageConfig {
    #[serde(default)]
    pub directions: DirectionsSection,
    #[serde(default)]
    pub oauth: OAuthSection,
    #[serde(default)]
    pub export: ExportSection,
    #[serde(default)]
    pub ui: UiSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DirectionsSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OAuthSection {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ExportSection {
    pub output_dir: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UiSection {
    pub timezone: Option<String>,
}

impl MileageConfig {
    /// Apply environment overrides through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = non_empty(ENV_MAPS_API_KEY) {
            self.directions.api_key = Some(key);
        }
        if let Some(id) = non_empty(ENV_CLIENT_ID) {
            self.oauth.client_id = Some(id);
        }
        if let Some(secret) = non_empty(ENV_CLIENT_SECRET) {
            self.oauth.client_secret = Some(secret);
        }
    }

    pub fn has_directions_key(&self) -> bool {
        self.directions
            .api_key
            .as_deref()
            .map(|key| !key.trim().is_empty())
            .unwrap_or(false)
    }

    /// Directions settings, or `None` when no API key is configured.
    pub fn directions_config(&self) -> Option<DirectionsConfig> {
        if !self.has_directions_key() {
            return None;
        }
        let key = self.directions.api_key.clone()?;
        let mut config = DirectionsConfig::new(key);
        if let Some(base_url) = &self.directions.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if let Some(seconds) = self.directions.timeout_seconds {
            config = config.with_timeout(Duration::from_secs(seconds));
        }
        Some(config)
    }

    pub fn oauth_config(&self) -> OAuthClientConfig {
        let config =
            OAuthClientConfig::new(self.oauth.client_id.clone(), self.oauth.client_secret.clone());
        match &self.oauth.token_url {
            Some(url) => config.with_token_url(url.clone()),
            None => config,
        }
    }

    /// Where exported workbooks are written (default: current directory).
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .as_deref()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn timezone(&self) -> anyhow::Result<Tz> {
        match self.ui.timezone.as_deref() {
            Some(name) if !name.trim().is_empty() => name
                .trim()
                .parse::<Tz>()
                .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", name, e)),
            _ => Ok(Tz::UTC),
        }
    }

    /// Today's date in the configured timezone.
    pub fn today(&self) -> anyhow::Result<NaiveDate> {
        Ok(Utc::now().with_timezone(&self.timezone()?).date_naive())
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn read_config(path: &Path) -> anyhow::Result<MileageConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("mileage"));
        }
    }
    Ok(home_dir()?.join(".config").join("mileage"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
