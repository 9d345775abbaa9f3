//! Prediction invoker: one guarded model call per feature row

use super::{ModelHandle, TrafficModel};
use crate::error::{DashboardError, DashboardResult};
use crate::types::features::FeatureRecord;
use crate::types::severity::{AlertColor, SeverityTier};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

/// Result of model inference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted vehicles per hour
    pub volume: f64,
}

impl PredictionResult {
    pub fn severity(&self) -> SeverityTier {
        SeverityTier::from_volume(self.volume)
    }

    pub fn color(&self) -> AlertColor {
        self.severity().color()
    }
}

/// Calls the injected model and turns every failure into a
/// [`DashboardError`] instead of letting it escape.
#[derive(Clone)]
pub struct PredictionInvoker {
    model: ModelHandle,
}

impl PredictionInvoker {
    /// The handle comes from the one-time startup load; `None` means that
    /// load failed.
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }

    pub fn with_model(model: Arc<dyn TrafficModel>) -> Self {
        Self { model: Some(model) }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Option<&Arc<dyn TrafficModel>> {
        self.model.as_ref()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_ref().map(|m| m.name())
    }

    /// Run inference on one feature row. No retries.
    pub fn predict(&self, record: &FeatureRecord) -> DashboardResult<PredictionResult> {
        let model = self.model.as_ref().ok_or(DashboardError::ModelUnavailable)?;

        let volume = guarded(model.name(), || model.predict(record))?;
        if !volume.is_finite() {
            error!(model = %model.name(), volume = volume, "Model returned a non-finite prediction");
            return Err(DashboardError::InferenceError(format!(
                "model returned non-finite value {}",
                volume
            )));
        }

        debug!(model = %model.name(), volume = volume, "Prediction complete");
        Ok(PredictionResult { volume })
    }

    /// Run inference on a batch of rows in one model call.
    pub fn predict_batch(&self, records: &[FeatureRecord]) -> DashboardResult<Vec<f64>> {
        let model = self.model.as_ref().ok_or(DashboardError::ModelUnavailable)?;

        let volumes = guarded(model.name(), || model.predict_batch(records))?;
        if volumes.len() != records.len() {
            return Err(DashboardError::InferenceError(format!(
                "model returned {} predictions for {} rows",
                volumes.len(),
                records.len()
            )));
        }
        if let Some(volume) = volumes.iter().copied().find(|v| !v.is_finite()) {
            error!(model = %model.name(), volume = volume, "Model returned a non-finite prediction");
            return Err(DashboardError::InferenceError(format!(
                "model returned non-finite value {}",
                volume
            )));
        }
        Ok(volumes)
    }
}

/// Run a model call, mapping both errors and panics to `InferenceError`.
fn guarded<T>(
    model_name: &str,
    call: impl FnOnce() -> anyhow::Result<T>,
) -> DashboardResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            error!(model = %model_name, error = %e, "Inference failed");
            Err(DashboardError::InferenceError(format!("{:#}", e)))
        }
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "model panicked".to_string());
            error!(model = %model_name, error = %reason, "Inference panicked");
            Err(DashboardError::InferenceError(reason))
        }
    }
}
