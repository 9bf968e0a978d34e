use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_NOTIFICATION_TTL_MS: u64 = 4000;

/// What the HR dashboard does when an application status update is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusUpdateErrors {
    /// Log the failure and refresh as if it had succeeded.
    #[default]
    Swallow,
    /// Raise an error notification, then refresh.
    Report,
}

impl FromStr for StatusUpdateErrors {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "swallow" => Ok(Self::Swallow),
            "report" => Ok(Self::Report),
            other => Err(format!("expected `swallow` or `report`, got `{}`", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub session_file: Option<PathBuf>,
    pub notification_ttl: Duration,
    pub status_update_errors: StatusUpdateErrors,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_file: None,
            notification_ttl: Duration::from_millis(DEFAULT_NOTIFICATION_TTL_MS),
            status_update_errors: StatusUpdateErrors::default(),
        }
    }
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let api_base_url = env::var("API_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let session_file = match env::var("SESSION_FILE") {
            Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
            _ => default_session_file(),
        };

        Ok(Self {
            api_base_url,
            session_file,
            notification_ttl: Duration::from_millis(get_env_parse_or(
                "NOTIFICATION_TTL_MS",
                DEFAULT_NOTIFICATION_TTL_MS,
            )?),
            status_update_errors: get_env_parse_or(
                "STATUS_UPDATE_ERRORS",
                StatusUpdateErrors::default(),
            )?,
        })
    }

    /// Configuration pointing at an explicit backend, with no session file.
    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }
}

fn default_session_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "job-platform")
        .map(|dirs| dirs.data_dir().join("sessions.json"))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        _ => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
