//! Configuration for the sync client
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/coachsync/config.toml)
//! 3. Built-in defaults (lowest priority)
//!
//! The bearer credential is env-only (`COACHSYNC_TOKEN`): credential storage
//! belongs to a collaborator, never to the config file on disk.

use serde::Deserialize;
use std::path::PathBuf;

use crate::report::LayoutMetrics;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend the gateway talks to
    pub api_url: String,

    /// Trainer account id; clients are listed by owner
    pub owner_id: String,

    /// Bearer credential attached to every gateway call (env only)
    pub bearer_token: Option<String>,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Report layout constants
    pub report: ReportConfig,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level when RUST_LOG is unset: trace|debug|info|warn|error
    pub level: String,
    /// Also write logs to daily-rotated files
    pub file_enabled: bool,
    /// Directory for log files
    pub file_dir: PathBuf,
    /// Log file name prefix
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: PathBuf::from("./logs"),
            file_prefix: "coachsync".to_string(),
        }
    }
}

/// Page layout constants for the report paginator
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub page_height: u32,
    pub session_base: u32,
    pub exercise_row: u32,
    pub circuit_header: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let metrics = LayoutMetrics::default();
        Self {
            page_height: metrics.page_height,
            session_base: metrics.session_base,
            exercise_row: metrics.exercise_row,
            circuit_header: metrics.circuit_header,
        }
    }
}

impl ReportConfig {
    pub fn metrics(&self) -> LayoutMetrics {
        LayoutMetrics {
            page_height: self.page_height,
            session_base: self.session_base,
            exercise_row: self.exercise_row,
            circuit_header: self.circuit_header,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "https://api.coachsync.app".to_string(),
            owner_id: String::new(),
            bearer_token: None,
            logging: LoggingConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure (subset of Config that makes sense to persist)
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub api_url: Option<String>,
    pub owner_id: Option<String>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,

    /// Optional [report] section
    pub report: Option<FileReport>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_prefix: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileReport {
    pub page_height: Option<u32>,
    pub session_base: Option<u32>,
    pub exercise_row: Option<u32>,
    pub circuit_header: Option<u32>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/coachsync/config.toml
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("coachsync").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist, so users can
    /// discover the options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };
        if path.exists() {
            return;
        }
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // config is optional
            }
        }
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists.
    ///
    /// A config file that exists but does not parse fails fast with a clear
    /// error rather than silently falling back to defaults.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Failed to parse config file {}:\n  {e}", path.display());
                    eprintln!("To reset, delete the file and restart coachsync.");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("Cannot read config file {}: {e}", path.display());
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: env vars > file > defaults
    pub fn from_env() -> Self {
        let file = Self::load_file_config();
        let defaults = Self::default();

        let api_url = std::env::var("COACHSYNC_API_URL")
            .ok()
            .or(file.api_url)
            .unwrap_or(defaults.api_url);

        let owner_id = std::env::var("COACHSYNC_OWNER_ID")
            .ok()
            .or(file.owner_id)
            .unwrap_or(defaults.owner_id);

        // Env only: tokens never live in the config file
        let bearer_token = std::env::var("COACHSYNC_TOKEN").ok();

        let file_logging = file.logging.unwrap_or_default();
        let logging_defaults = LoggingConfig::default();
        let logging = LoggingConfig {
            level: file_logging.level.unwrap_or(logging_defaults.level),
            file_enabled: file_logging
                .file_enabled
                .unwrap_or(logging_defaults.file_enabled),
            file_dir: file_logging
                .file_dir
                .map(PathBuf::from)
                .unwrap_or(logging_defaults.file_dir),
            file_prefix: file_logging
                .file_prefix
                .unwrap_or(logging_defaults.file_prefix),
        };

        let file_report = file.report.unwrap_or_default();
        let report_defaults = ReportConfig::default();
        let report = ReportConfig {
            page_height: file_report.page_height.unwrap_or(report_defaults.page_height),
            session_base: file_report.session_base.unwrap_or(report_defaults.session_base),
            exercise_row: file_report.exercise_row.unwrap_or(report_defaults.exercise_row),
            circuit_header: file_report
                .circuit_header
                .unwrap_or(report_defaults.circuit_header),
        };

        Self {
            api_url,
            owner_id,
            bearer_token,
            logging,
            report,
        }
    }

    /// Serialize to the TOML template written on first run. Single source of
    /// truth for the config file shape; the round-trip test below keeps it
    /// honest.
    pub fn to_toml(&self) -> String {
        format!(
            r#"# coachsync configuration
# Values here are overridden by COACHSYNC_* environment variables.
# The bearer token is env-only: COACHSYNC_TOKEN.

api_url = "{api_url}"
owner_id = "{owner_id}"

[logging]
level = "{level}"
file_enabled = {file_enabled}
file_dir = "{file_dir}"
file_prefix = "{file_prefix}"

[report]
page_height = {page_height}
session_base = {session_base}
exercise_row = {exercise_row}
circuit_header = {circuit_header}
"#,
            api_url = self.api_url,
            owner_id = self.owner_id,
            level = self.logging.level,
            file_enabled = self.logging.file_enabled,
            file_dir = self.logging.file_dir.display(),
            file_prefix = self.logging.file_prefix,
            page_height = self.report.page_height,
            session_base = self.report.session_base,
            exercise_row = self.report.exercise_row,
            circuit_header = self.report.circuit_header,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The generated template must parse back; catches TOML syntax drift
    /// when fields are added
    #[test]
    fn default_config_round_trips() {
        let toml_str = Config::default().to_toml();
        let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
        assert!(
            parsed.is_ok(),
            "default config should round-trip.\nTOML:\n{toml_str}\nError: {:?}",
            parsed.err()
        );
    }

    #[test]
    fn file_values_survive_the_round_trip() {
        let mut config = Config::default();
        config.api_url = "http://localhost:3000".into();
        config.owner_id = "trainer-9".into();
        config.report.page_height = 500;

        let parsed: FileConfig = toml::from_str(&config.to_toml()).unwrap();
        assert_eq!(parsed.api_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(parsed.owner_id.as_deref(), Some("trainer-9"));
        assert_eq!(parsed.report.unwrap().page_height, Some(500));
    }
}
