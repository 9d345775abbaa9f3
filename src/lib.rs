//! Traffic Flow Prediction Library
//!
//! Turns vehicle counts and time of day into a model's traffic volume
//! prediction, a severity alert and the illustrative sections of the
//! traffic dashboard.

pub mod config;
pub mod congestion_map;
pub mod dashboard;
pub mod error;
pub mod feature_builder;
pub mod importance;
pub mod insights;
pub mod metrics;
pub mod models;
pub mod performance;
pub mod trend;
pub mod types;

pub use config::AppConfig;
pub use dashboard::{Dashboard, DashboardSnapshot, PredictionView};
pub use error::{DashboardError, DashboardResult};
pub use feature_builder::FeatureVectorBuilder;
pub use models::{ModelHandle, ModelLoader, PredictionInvoker, PredictionResult, TrafficModel};
pub use trend::{TrendPoint, TrendProjector};
pub use types::{classify, AlertColor, FeatureRecord, SeverityTier, TrafficInputs};
