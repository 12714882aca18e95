use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use url::Url;

use crate::error::Error;

/// Fully resolved and validated configuration.
#[derive(Debug)]
pub struct Config {
    pub monitor: MonitorOptions,
    pub discord: DiscordOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorOptions {
    /// Memory usage percentage above which a warning is sent.
    pub limit: f64,
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
    /// How often to re-send the warning while usage stays over the limit,
    /// in seconds. 0 means warn once and never repeat.
    #[serde(default)]
    pub warning_interval_secs: u64,
    #[serde(default = "default_content")]
    pub content: String,
}

#[derive(Debug)]
pub struct DiscordOptions {
    pub webhook_url: String,
    pub discord_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    config: MonitorOptions,
    #[serde(default)]
    discord: RawDiscordOptions,
}

#[derive(Debug, Default, Deserialize)]
struct RawDiscordOptions {
    webhook_url: Option<String>,
    discord_id: Option<u64>,
}

fn default_check_interval_ms() -> u64 {
    1000
}

fn default_content() -> String {
    "Warning: memory usage has reached %m%".to_string()
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
        let content = fs::read_to_string(path)?;
        let raw: RawConfig = toml::from_str(&content)?;

        // if webhook_url is not set use env with dotenvy
        let webhook_url = match raw.discord.webhook_url {
            Some(webhook_url) => webhook_url,
            None => dotenvy::var("WEBHOOK_URL")?,
        };

        // if discord_id is not set try env with dotenvy, tagging stays off otherwise
        let discord_id = match raw.discord.discord_id {
            Some(discord_id) => Some(discord_id),
            None => match dotenvy::var("DISCORD_ID") {
                Ok(id) => Some(id.parse().map_err(|_| {
                    Error::Config(format!("DISCORD_ID is not a valid user id: {id}"))
                })?),
                Err(_) => None,
            },
        };

        let config = Config {
            monitor: raw.config,
            discord: DiscordOptions {
                webhook_url,
                discord_id,
            },
        };
        config.validate()?;

        Ok(config)
    }

    /// Default configuration location under the user config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("memalert").join("config.toml"))
    }

    fn validate(&self) -> Result<(), Error> {
        if !(1.0..=100.0).contains(&self.monitor.limit) {
            return Err(Error::Config(format!(
                "limit must be between 1 and 100, got {}",
                self.monitor.limit
            )));
        }
        if !self.monitor.content.contains("%m") {
            return Err(Error::Config(
                "content must contain the %m placeholder".to_string(),
            ));
        }
        Url::parse(&self.discord.webhook_url)?;
        Ok(())
    }
}
