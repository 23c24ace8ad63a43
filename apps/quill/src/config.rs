//! Application configuration loaded from environment variables.

use quill_infra::database::DatabaseConfig;
use quill_infra::telemetry::TelemetryConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: Option<DatabaseConfig>,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
        }
    }
}
