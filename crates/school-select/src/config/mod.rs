use chrono::{Datelike, Local};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::selection::DEFAULT_APPENDIX_MARKER;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub selection: SelectionConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            selection: SelectionConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Register location and the guideline knobs that vary between intake years.
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    pub registry_path: Option<PathBuf>,
    pub appendix_marker: String,
    pub selection_year: i32,
}

impl SelectionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let registry_path = env::var("APP_REGISTRY_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let appendix_marker = match env::var("APP_APPENDIX_MARKER") {
            Ok(value) if value.trim().is_empty() => return Err(ConfigError::BlankAppendixMarker),
            Ok(value) => value.trim().to_string(),
            Err(_) => DEFAULT_APPENDIX_MARKER.to_string(),
        };

        let selection_year = match env::var("APP_SELECTION_YEAR") {
            Ok(value) => value
                .trim()
                .parse::<i32>()
                .map_err(|_| ConfigError::InvalidSelectionYear { value })?,
            Err(_) => Local::now().year(),
        };

        Ok(Self {
            registry_path,
            appendix_marker,
            selection_year,
        })
    }

    /// Resolve the register path, preferring an explicit override.
    pub fn registry_path_or(&self, overridden: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
        overridden
            .or_else(|| self.registry_path.clone())
            .ok_or(ConfigError::MissingRegistryPath)
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            registry_path: None,
            appendix_marker: DEFAULT_APPENDIX_MARKER.to_string(),
            selection_year: Local::now().year(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    MissingRegistryPath,
    BlankAppendixMarker,
    InvalidSelectionYear { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::MissingRegistryPath => write!(
                f,
                "no school register configured: set APP_REGISTRY_PATH or pass --registry"
            ),
            ConfigError::BlankAppendixMarker => {
                write!(f, "APP_APPENDIX_MARKER must not be blank")
            }
            ConfigError::InvalidSelectionYear { value } => {
                write!(f, "APP_SELECTION_YEAR must be a year, found '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::MissingRegistryPath
            | ConfigError::BlankAppendixMarker
            | ConfigError::InvalidSelectionYear { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_REGISTRY_PATH");
        env::remove_var("APP_APPENDIX_MARKER");
        env::remove_var("APP_SELECTION_YEAR");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.selection.registry_path.is_none());
        assert_eq!(config.selection.appendix_marker, "APPENDIX 3");
        assert_eq!(config.selection.selection_year, Local::now().year());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_selection_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_REGISTRY_PATH", "/data/register.csv");
        env::set_var("APP_APPENDIX_MARKER", " APPENDIX 4 ");
        env::set_var("APP_SELECTION_YEAR", "2025");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.selection.registry_path,
            Some(PathBuf::from("/data/register.csv"))
        );
        assert_eq!(config.selection.appendix_marker, "APPENDIX 4");
        assert_eq!(config.selection.selection_year, 2025);
        reset_env();
    }

    #[test]
    fn rejects_blank_marker_and_bad_year() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_APPENDIX_MARKER", "   ");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::BlankAppendixMarker)
        ));

        reset_env();
        env::set_var("APP_SELECTION_YEAR", "next year");
        match AppConfig::load() {
            Err(ConfigError::InvalidSelectionYear { value }) => assert_eq!(value, "next year"),
            other => panic!("expected invalid year, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn registry_override_wins_over_environment() {
        let config = SelectionConfig {
            registry_path: Some(PathBuf::from("from-env.csv")),
            ..SelectionConfig::default()
        };
        assert_eq!(
            config
                .registry_path_or(Some(PathBuf::from("from-cli.csv")))
                .expect("path"),
            PathBuf::from("from-cli.csv")
        );
        assert_eq!(
            config.registry_path_or(None).expect("path"),
            PathBuf::from("from-env.csv")
        );
        assert!(matches!(
            SelectionConfig::default().registry_path_or(None),
            Err(ConfigError::MissingRegistryPath)
        ));
    }
}
