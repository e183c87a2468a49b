use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_REGISTRY_BASE_URL: &str = "https://api.company-information.service.gov.uk";

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
    pub data: DataConfig,
    pub relay: RelayConfig,
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

        let data_dir = env::var("ASSESS_DATA_DIR").unwrap_or_else(|_| "data".to_string());

        let api_key = env::var("CH_API_KEY")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let base_url = env::var("CH_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_REGISTRY_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let max_requests_per_window = env::var("CH_RELAY_MAX_REQUESTS")
            .unwrap_or_else(|_| "500".to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidRelayLimit)?;
        let window_secs = env::var("CH_RELAY_WINDOW_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidRelayWindow)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            data: DataConfig {
                directory: PathBuf::from(data_dir),
            },
            relay: RelayConfig {
                api_key,
                base_url,
                max_requests_per_window,
                window: Duration::from_secs(window_secs),
            },
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location of the registry, local-authority, rating and company-cache exports.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub directory: PathBuf,
}

impl DataConfig {
    pub fn schools_path(&self) -> PathBuf {
        self.directory.join("schools.json")
    }

    pub fn local_authorities_path(&self) -> PathBuf {
        self.directory.join("local_authorities.json")
    }

    pub fn ratings_path(&self) -> PathBuf {
        self.directory.join("ratings.json")
    }

    pub fn company_cache_path(&self) -> PathBuf {
        self.directory.join("ch-cache.json")
    }
}

/// Upstream registry relay settings. The relay is disabled without a credential.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub max_requests_per_window: u32,
    pub window: Duration,
}

impl RelayConfig {
    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidRelayLimit,
    InvalidRelayWindow,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidRelayLimit => {
                write!(f, "CH_RELAY_MAX_REQUESTS must be a non-negative integer")
            }
            ConfigError::InvalidRelayWindow => {
                write!(f, "CH_RELAY_WINDOW_SECS must be a positive number of seconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidRelayLimit
            | ConfigError::InvalidRelayWindow => None,
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
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "ASSESS_DATA_DIR",
            "CH_API_KEY",
            "CH_BASE_URL",
            "CH_RELAY_MAX_REQUESTS",
            "CH_RELAY_WINDOW_SECS",
        ] {
            env::remove_var(key);
        }
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
        assert_eq!(config.data.schools_path(), PathBuf::from("data/schools.json"));
        assert!(!config.relay.enabled());
        assert_eq!(config.relay.base_url, DEFAULT_REGISTRY_BASE_URL);
        assert_eq!(config.relay.max_requests_per_window, 500);
        assert_eq!(config.relay.window, Duration::from_secs(60));
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
    fn relay_settings_follow_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CH_API_KEY", "  secret-key ");
        env::set_var("CH_BASE_URL", "http://127.0.0.1:9999/");
        env::set_var("CH_RELAY_MAX_REQUESTS", "12");
        env::set_var("CH_RELAY_WINDOW_SECS", "5");
        let config = AppConfig::load().expect("config loads");
        assert!(config.relay.enabled());
        assert_eq!(config.relay.api_key.as_deref(), Some("secret-key"));
        assert_eq!(config.relay.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.relay.max_requests_per_window, 12);
        assert_eq!(config.relay.window, Duration::from_secs(5));
        reset_env();
    }

    #[test]
    fn rejects_zero_relay_window() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CH_RELAY_WINDOW_SECS", "0");
        let err = AppConfig::load().expect_err("zero window rejected");
        assert!(matches!(err, ConfigError::InvalidRelayWindow));
        reset_env();
    }
}
