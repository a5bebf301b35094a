use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub appwrite: AppwriteSettings,
    pub collection: CollectionSettings,
    pub detector: DetectorSettings,
    pub moderation: ModerationSettings,
    pub matching: MatchingSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    pub profiles: String,
    pub requests: String,
    pub reports: String,
    pub matches: String,
    pub users: String,
    pub photo_bucket: String,
}

/// Face-detection inference endpoint settings. The token is optional here so
/// config loading never fails; the gateway refuses to start without one.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectorSettings {
    pub endpoint: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_initial_timeout_secs")]
    pub initial_timeout_secs: u64,
    #[serde(default = "default_retry_timeout_secs")]
    pub retry_timeout_secs: u64,
}

fn default_retry_delay_secs() -> u64 { 15 }
fn default_initial_timeout_secs() -> u64 { 30 }
fn default_retry_timeout_secs() -> u64 { 60 }

#[derive(Debug, Clone, Deserialize)]
pub struct ModerationSettings {
    pub admin_key: String,
    #[serde(default = "default_suspension_threshold")]
    pub suspension_threshold: usize,
}

fn default_suspension_threshold() -> usize { 5 }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_min_score")]
    pub min_score: u8,
}

fn default_min_score() -> u8 { 50 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with MILAN_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with MILAN_)
            // e.g., MILAN_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("MILAN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("MILAN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply well-known environment overrides that do not follow the MILAN_
/// prefix convention (deployment platforms inject these directly).
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let appwrite_api_key = env::var("APPWRITE_API_KEY")
        .or_else(|_| env::var("MILAN_APPWRITE__API_KEY"))
        .ok();
    let detector_token = env::var("DETECTOR_TOKEN")
        .or_else(|_| env::var("MILAN_DETECTOR__TOKEN"))
        .ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(api_key) = appwrite_api_key {
        builder = builder.set_override("appwrite.api_key", api_key)?;
    }
    if let Some(token) = detector_token {
        builder = builder.set_override("detector.token", token)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tunables() {
        assert_eq!(default_suspension_threshold(), 5);
        assert_eq!(default_min_score(), 50);
        assert_eq!(default_retry_delay_secs(), 15);
        assert_eq!(default_initial_timeout_secs(), 30);
        assert_eq!(default_retry_timeout_secs(), 60);
    }

    #[test]
    fn test_default_logging() {
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_log_format(), "json");
    }
}
