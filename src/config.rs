use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Model artifact locations
    pub models: ModelsConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        let settings = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: STARTUP_PREDICTOR_)
            .add_source(
                config::Environment::with_prefix("STARTUP_PREDICTOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Address the HTTP server binds to
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.http_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            models: ModelsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Serialized classifier
    #[serde(default = "default_classifier_path")]
    pub classifier_path: PathBuf,

    /// Serialized industry label encoder
    #[serde(default = "default_industry_encoder_path")]
    pub industry_encoder_path: PathBuf,

    /// Serialized region label encoder
    #[serde(default = "default_region_encoder_path")]
    pub region_encoder_path: PathBuf,
}

impl ModelsConfig {
    /// Point all three artifacts at files inside `dir` using the default names
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            classifier_path: dir.join("startup_model.json"),
            industry_encoder_path: dir.join("industry_encoder.json"),
            region_encoder_path: dir.join("region_encoder.json"),
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            classifier_path: default_classifier_path(),
            industry_encoder_path: default_industry_encoder_path(),
            region_encoder_path: default_region_encoder_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
            prometheus_enabled: true,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8501
}

fn default_classifier_path() -> PathBuf {
    PathBuf::from("models/startup_model.json")
}

fn default_industry_encoder_path() -> PathBuf {
    PathBuf::from("models/industry_encoder.json")
}

fn default_region_encoder_path() -> PathBuf {
    PathBuf::from("models/region_encoder.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "startup-predictor".to_string()
}

fn default_true() -> bool {
    true
}
