use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Prefix for environment overrides, e.g. `DAYBOOK__SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "DAYBOOK";

/// Fallback environment variable for the calendar access token
pub const TOKEN_ENV_VAR: &str = "GOOGLE_CALENDAR_TOKEN";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding journal entries (`*.md`)
    pub data_dir: PathBuf,

    /// Calendar cache file
    pub cache_file: PathBuf,

    /// Directory served under `/static`, containing `journal.html`
    pub static_dir: PathBuf,

    /// HTTP listener settings
    pub server: ServerConfig,

    /// Upstream calendar settings
    pub calendar: CalendarConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            cache_file: PathBuf::from("calendar_cache.json"),
            static_dir: PathBuf::from("static"),
            server: ServerConfig::default(),
            calendar: CalendarConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Base URL of the Calendar v3 API
    pub api_base_url: String,

    /// Calendar to read events from
    pub calendar_id: String,

    /// OAuth access token (falls back to `GOOGLE_CALENDAR_TOKEN`)
    pub access_token: Option<String>,

    /// Maximum number of events requested per fetch
    pub max_results: u32,

    /// Upstream request timeout in seconds
    pub fetch_timeout_secs: u64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            calendar_id: "primary".to_string(),
            access_token: None,
            max_results: 100,
            fetch_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from the user config directory, creating a default file if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::default().save_to(&config_path)?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from `path` layered with `DAYBOOK__*` environment overrides.
    ///
    /// A missing file is not an error; defaults fill every absent field.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config.calendar.access_token.is_none() {
            config.calendar.access_token =
                std::env::var(TOKEN_ENV_VAR).ok().filter(|t| !t.trim().is_empty());
        }

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged; errors abort with `ConfigError::Invalid`.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(
            &self.calendar.api_base_url,
            "calendar.api_base_url",
            &mut result,
        );

        if self.server.port == 0 {
            result.add_error("server.port", "Port cannot be 0");
        }

        if self.calendar.max_results == 0 {
            result.add_error("calendar.max_results", "Must request at least one event");
        }

        if self.calendar.fetch_timeout_secs == 0 {
            result.add_warning(
                "calendar.fetch_timeout_secs",
                "Upstream timeout disabled, a hung fetch blocks the request",
            );
        }

        if self.calendar.access_token.is_none() {
            result.add_warning(
                "calendar.access_token",
                "No access token configured - calendar requests will be served from cache only",
            );
        }

        if !self.data_dir.exists() {
            result.add_warning(
                "data_dir",
                format!("Path does not exist and will be created: {}", self.data_dir.display()),
            );
        } else if !self.data_dir.is_dir() {
            result.add_error(
                "data_dir",
                format!("Path is not a directory: {}", self.data_dir.display()),
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("user config directory".to_string()))?
            .join("daybook");

        Ok(config_dir.join("config.toml"))
    }
}
