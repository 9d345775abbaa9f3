//! Type definitions for the traffic prediction pipeline

pub mod features;
pub mod severity;

pub use features::{FeatureRecord, TrafficInputs, FEATURE_COUNT, FEATURE_NAMES};
pub use severity::{classify, AlertColor, Gauge, SeverityTier};
