//! Server configuration from environment variables.
//!
//! Every knob has a default that matches the reference deployment:
//! port 5000, SQLite file in the working directory, staging under the
//! system temp dir, Ollama-compatible completion service on localhost.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "medreport";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Request bodies above this size are rejected by the transport layer
/// before any handler runs.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub fn default_log_filter() -> String {
    format!("{APP_NAME}=info,tower_http=info")
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Completion service settings (Ollama-compatible HTTP API).
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

/// Full server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub staging_dir: PathBuf,
    pub render_dpi: u32,
    pub tessdata_dir: PathBuf,
    pub completion: CompletionConfig,
}

impl Config {
    /// Read configuration from `MEDREPORT_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: parse_env("MEDREPORT_ADDR", "0.0.0.0:5000")?,
            db_path: PathBuf::from(env_or("MEDREPORT_DB", "medreport.db")),
            staging_dir: std::env::var("MEDREPORT_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir().join("medreport-uploads")),
            render_dpi: parse_env("MEDREPORT_RENDER_DPI", "200")?,
            tessdata_dir: PathBuf::from(env_or(
                "MEDREPORT_TESSDATA_DIR",
                "/usr/share/tesseract-ocr/5/tessdata",
            )),
            completion: CompletionConfig {
                base_url: env_or("MEDREPORT_COMPLETION_URL", "http://localhost:11434"),
                model: env_or("MEDREPORT_COMPLETION_MODEL", "llama3"),
                temperature: parse_env("MEDREPORT_COMPLETION_TEMPERATURE", "1.0")?,
                timeout_secs: parse_env("MEDREPORT_COMPLETION_TIMEOUT_SECS", "300")?,
            },
        })
    }
}

fn env_or(var: &'static str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(
    var: &'static str,
    default: &str,
) -> Result<T, ConfigError> {
    let raw = env_or(var, default);
    raw.parse()
        .map_err(|_| ConfigError::InvalidValue { var, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var reads are process-global, so these tests only exercise the
    // default paths and leave the environment untouched.

    #[test]
    fn defaults_are_valid() {
        let config = Config::from_env().unwrap();
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.render_dpi, 200);
        assert!((config.completion.temperature - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.completion.timeout_secs, 300);
    }

    #[test]
    fn staging_dir_defaults_under_temp() {
        let config = Config::from_env().unwrap();
        assert!(config.staging_dir.starts_with(std::env::temp_dir()));
    }

    #[test]
    fn upload_cap_is_16_mib() {
        assert_eq!(MAX_UPLOAD_BYTES, 16 * 1024 * 1024);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
