//! Configuration management for the traffic dashboard

use crate::types::features::TrafficInputs;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub model: ModelConfig,
    #[serde(default)]
    pub inputs: InputsConfig,
    #[serde(default)]
    pub insights: InsightsConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the `.onnx` or `.json` model artifact
    pub path: PathBuf,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_onnx_threads() -> usize {
    1
}

/// Slider values used when rendering from the command line
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputsConfig {
    pub cars: u32,
    pub bikes: u32,
    pub buses: u32,
    pub trucks: u32,
    /// Fixed hour; the current hour when absent
    pub hour: Option<u8>,
}

impl InputsConfig {
    /// Resolve into clamped inputs at the given wall-clock time.
    pub fn to_inputs(&self, now: chrono::NaiveDateTime) -> TrafficInputs {
        let mut inputs = TrafficInputs::at(now, self.cars, self.bikes, self.buses, self.trucks);
        if let Some(hour) = self.hour {
            inputs.hour = hour;
        }
        inputs.clamped()
    }
}

impl Default for InputsConfig {
    fn default() -> Self {
        let defaults = TrafficInputs::default();
        Self {
            cars: defaults.cars,
            bikes: defaults.bikes,
            buses: defaults.buses,
            trucks: defaults.trucks,
            hour: None,
        }
    }
}

/// Historical insights configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    /// CSV log with `Timestamp` and `Predicted Volume` columns
    pub log_path: PathBuf,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("logs.csv"),
        }
    }
}

/// Performance page configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Rows in the synthetic workload
    pub samples: usize,
    /// Seed for the synthetic workload
    pub seed: u64,
    /// Labeled CSV; when set, error metrics are computed against it
    pub labels_path: Option<PathBuf>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            samples: 200,
            seed: 42,
            labels_path: None,
        }
    }
}

/// Randomized render sections
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderConfig {
    /// Seed for trend and map; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `TRAFFIC_CONFIG` or the default path
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("TRAFFIC_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(path)
    }

    /// Load configuration from a specific path.
    ///
    /// The file is optional; `TRAFFIC__SECTION__KEY` environment variables
    /// override it and built-in defaults fill the rest.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let defaults = AppConfig::default();
        let config = Config::builder()
            .set_default("model.path", defaults.model.path.display().to_string())?
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("TRAFFIC").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                path: PathBuf::from("models/best_model.onnx"),
                onnx_threads: default_onnx_threads(),
            },
            inputs: InputsConfig::default(),
            insights: InsightsConfig::default(),
            performance: PerformanceConfig::default(),
            render: RenderConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.model.path, PathBuf::from("models/best_model.onnx"));
        assert_eq!(config.insights.log_path, PathBuf::from("logs.csv"));
        assert_eq!(config.performance.samples, 200);
        assert_eq!(config.performance.seed, 42);
        assert_eq!(config.inputs.cars, 120);
        assert!(config.render.seed.is_none());
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[model]
path = "models/traffic.json"

[inputs]
cars = 300
bikes = 20
buses = 5
trucks = 40
hour = 17

[render]
seed = 7

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.model.path, PathBuf::from("models/traffic.json"));
        assert_eq!(config.model.onnx_threads, 1);
        assert_eq!(config.inputs.cars, 300);
        assert_eq!(config.inputs.hour, Some(17));
        assert_eq!(config.render.seed, Some(7));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.performance.samples, 200);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load_from_path("no/such/config.toml").unwrap();
        assert_eq!(config.model.path, PathBuf::from("models/best_model.onnx"));
    }

    #[test]
    fn test_inputs_resolution() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 18)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        let inputs = InputsConfig {
            cars: 999,
            bikes: 1,
            buses: 2,
            trucks: 3,
            hour: Some(6),
        }
        .to_inputs(now);

        assert_eq!(inputs.cars, 500);
        assert_eq!(inputs.hour, 6);
        // 2024-05-18 is a Saturday
        assert_eq!(inputs.weekday, 5);
    }
}
