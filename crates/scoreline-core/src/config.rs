// Configuration loading and validation (scoreline.toml).

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::standings::BandRules;

/// File name looked up in `./config/` and the platform config directory.
pub const CONFIG_FILE_NAME: &str = "scoreline.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Assembled configuration. Every section is optional in the file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database: DatabaseConfig,
    pub view: ViewConfig,
    pub standings: BandRules,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Path of the sports store. Falls back to the platform data directory.
    pub path: Option<String>,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5000,
        }
    }
}

impl DatabaseConfig {
    /// The configured store path, or `<data dir>/sports.db`.
    pub fn resolved_path(&self) -> String {
        if let Some(path) = &self.path {
            return path.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join("sports.db"))
            .unwrap_or_else(|| PathBuf::from("sports.db"))
            .to_string_lossy()
            .into_owned()
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Sizes and limits used by the tournament and match views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    pub round_page_size: usize,
    pub form_limit: usize,
    pub head_to_head_limit: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            round_page_size: 5,
            form_limit: 5,
            head_to_head_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "scoreline=info,warn".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate a specific config file.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    parse_config(&text, path)
}

/// Parse and validate config text. `origin` is only used in error messages.
pub fn parse_config(text: &str, origin: &Path) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: origin.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Resolve configuration for the application.
///
/// An explicit path must exist. Otherwise `./config/scoreline.toml`, then the
/// platform config directory are tried, and built-in defaults are used when
/// neither has a file.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    let mut candidates = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("config").join(CONFIG_FILE_NAME));
    }
    if let Some(dirs) = project_dirs() {
        candidates.push(dirs.config_dir().join(CONFIG_FILE_NAME));
    }

    match candidates.into_iter().find(|path| path.is_file()) {
        Some(path) => {
            debug!("loading config from {}", path.display());
            load_config_from(&path)
        }
        None => {
            debug!("no config file found, using defaults");
            Ok(Config::default())
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "scoreline")
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.database.busy_timeout_ms == 0 {
        return Err(ConfigError::ValidationError {
            field: "database.busy_timeout_ms".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.database.path.as_deref().is_some_and(|p| p.trim().is_empty()) {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be blank".into(),
        });
    }

    let view = &config.view;
    let view_fields: &[(&str, usize)] = &[
        ("view.round_page_size", view.round_page_size),
        ("view.form_limit", view.form_limit),
        ("view.head_to_head_limit", view.head_to_head_limit),
    ];
    for (name, val) in view_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
