//! Traffic volume models and inference

pub mod inference;
pub mod linear;
pub mod loader;
pub mod onnx;

use crate::types::features::FeatureRecord;
use anyhow::Result;
use std::sync::Arc;

pub use inference::{PredictionInvoker, PredictionResult};
pub use linear::LinearRegressor;
pub use loader::ModelLoader;
pub use onnx::OnnxRegressor;

/// Capability shared by every loaded model format.
///
/// Implementations must be read-only after load so a single handle can be
/// shared across sessions.
pub trait TrafficModel: Send + Sync {
    /// Name used in logs and reports.
    fn name(&self) -> &str;

    /// Predict vehicles per hour for one feature row.
    fn predict(&self, record: &FeatureRecord) -> Result<f64>;

    /// Predict a batch of rows. Defaults to one call per row.
    fn predict_batch(&self, records: &[FeatureRecord]) -> Result<Vec<f64>> {
        records.iter().map(|r| self.predict(r)).collect()
    }

    /// Per-feature weights aligned with `FEATURE_NAMES`, when the format
    /// carries them.
    fn feature_importances(&self) -> Option<Vec<f64>> {
        None
    }
}

/// Result of the one-time model load: `None` when loading failed.
pub type ModelHandle = Option<Arc<dyn TrafficModel>>;
