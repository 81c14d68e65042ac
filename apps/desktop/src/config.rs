use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use client_core::DEFAULT_ROSTER_ENDPOINT;
use url::Url;

pub const SETTINGS_FILE: &str = "picker.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub roster_endpoint: String,
    pub database_url: String,
    pub fetch_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            roster_endpoint: DEFAULT_ROSTER_ENDPOINT.into(),
            database_url: "sqlite://./data/picker.db".into(),
            fetch_timeout_seconds: 10,
        }
    }
}

impl Settings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

/// Defaults, then `picker.toml` in the working directory, then environment.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    apply_file(&mut settings, Path::new(SETTINGS_FILE));
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
        Ok(file_cfg) => {
            if let Some(v) = file_cfg.get("roster_endpoint").and_then(|v| v.as_str()) {
                settings.roster_endpoint = v.to_string();
            }
            if let Some(v) = file_cfg.get("database_url").and_then(|v| v.as_str()) {
                settings.database_url = v.to_string();
            }
            if let Some(v) = file_cfg
                .get("fetch_timeout_seconds")
                .and_then(|v| v.as_integer())
                .and_then(|v| u64::try_from(v).ok())
            {
                settings.fetch_timeout_seconds = v;
            }
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable settings file");
        }
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("PICKER_ROSTER_ENDPOINT") {
        settings.roster_endpoint = v;
    }
    if let Some(v) = lookup("APP__ROSTER_ENDPOINT") {
        settings.roster_endpoint = v;
    }

    if let Some(v) = lookup("PICKER_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = lookup("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = lookup("APP__FETCH_TIMEOUT_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.fetch_timeout_seconds = parsed;
        }
    }
}

/// The endpoint must be an absolute http(s) URL.
pub fn validate_endpoint(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim())
        .with_context(|| format!("invalid roster endpoint '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("roster endpoint '{raw}' must use http or https");
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
