use std::env;
use std::fmt;

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

pub const DEFAULT_PRICE_LIST_VERSION: &str = "NOO_2026";
pub const DEFAULT_ACTIVITY_CODE: &str = "ZE41";

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub pricing: PricingConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let price_list_version =
            non_blank_var("ARBOMAP_PRICE_LIST_VERSION", DEFAULT_PRICE_LIST_VERSION)?;
        let activity_code = non_blank_var("ARBOMAP_ACTIVITY_CODE", DEFAULT_ACTIVITY_CODE)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            pricing: PricingConfig {
                price_list_version,
                activity_code,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn non_blank_var(key: &'static str, default: &str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::BlankValue { key }),
        Ok(value) => Ok(value.trim().to_string()),
        Err(_) => Ok(default.to_string()),
    }
}

/// Selects which price-list version and activity the estimator prices against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingConfig {
    pub price_list_version: String,
    pub activity_code: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            price_list_version: DEFAULT_PRICE_LIST_VERSION.to_string(),
            activity_code: DEFAULT_ACTIVITY_CODE.to_string(),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    BlankValue { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BlankValue { key } => write!(f, "{key} must not be blank when set"),
        }
    }
}

impl std::error::Error for ConfigError {}
