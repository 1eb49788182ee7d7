use std::env;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::screening::MatchingTolerances;

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

/// Top-level configuration for the verification service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub matching: MatchingTolerances,
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
        let ansi = matches!(
            env::var("APP_LOG_ANSI")
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
                .as_str(),
            "1" | "true" | "yes"
        );

        let defaults = MatchingTolerances::default();
        let matching = MatchingTolerances {
            amount_tolerance: read_tolerance("VERIFY_AMOUNT_TOLERANCE", defaults.amount_tolerance)?,
            early_days: read_days("VERIFY_DEPOSIT_EARLY_DAYS", defaults.early_days)?,
            late_days: read_days("VERIFY_DEPOSIT_LATE_DAYS", defaults.late_days)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, ansi },
            matching,
        })
    }
}

fn read_tolerance(variable: &'static str, default: f64) -> Result<f64, ConfigError> {
    let Ok(raw) = env::var(variable) else {
        return Ok(default);
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(ConfigError::InvalidTolerance { variable, value: raw }),
    }
}

fn read_days(variable: &'static str, default: i64) -> Result<i64, ConfigError> {
    let Ok(raw) = env::var(variable) else {
        return Ok(default);
    };

    match raw.trim().parse::<i64>() {
        Ok(value) if value >= 0 => Ok(value),
        _ => Err(ConfigError::InvalidTolerance { variable, value: raw }),
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

/// Log filter and formatting controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost { source: std::net::AddrParseError },
    #[error("{variable} must be a non-negative number (found '{value}')")]
    InvalidTolerance { variable: &'static str, value: String },
}
