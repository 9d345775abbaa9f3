//! ONNX regression model served through ONNX Runtime

use super::TrafficModel;
use crate::types::features::{FeatureRecord, FEATURE_COUNT};
use anyhow::{anyhow, Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Regressor exported to ONNX (e.g. a scikit-learn model via skl2onnx).
///
/// Expects a single float input of shape `[batch, 7]` and reads the
/// predicted volume from the first value of the output tensor.
pub struct OnnxRegressor {
    name: String,
    /// Running a session needs exclusive access
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxRegressor {
    /// Load a regressor from an `.onnx` file
    pub fn load<P: AsRef<Path>>(path: P, name: &str, threads: usize) -> Result<Self> {
        let path = path.as_ref();

        info!(model = %name, path = %path.display(), threads = threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("variable") || o.name.contains("predict"))
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "variable".to_string());

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        Ok(Self {
            name: name.to_string(),
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    fn run(&self, rows: &[FeatureRecord]) -> Result<Vec<f64>> {
        let features: Vec<f32> = rows.iter().flat_map(|r| r.to_vec()).collect();
        let shape = vec![rows.len() as i64, FEATURE_COUNT as i64];
        let input_tensor =
            Tensor::from_array((shape, features)).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Lock error: {}", e))?;

        let outputs = session.run(ort::inputs![self.input_name.as_str() => input_tensor])?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| anyhow!("model output {} missing", self.output_name))?;
        let (_, data) = output.try_extract_tensor::<f32>()?;

        if data.len() < rows.len() {
            return Err(anyhow!(
                "model returned {} values for {} rows",
                data.len(),
                rows.len()
            ));
        }

        // [batch, 1] or [batch]: one value per row
        let per_row = data.len() / rows.len();
        let volumes: Vec<f64> = data
            .iter()
            .step_by(per_row)
            .take(rows.len())
            .map(|&v| v as f64)
            .collect();

        debug!(model = %self.name, rows = rows.len(), "ONNX inference complete");
        Ok(volumes)
    }
}

impl TrafficModel for OnnxRegressor {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, record: &FeatureRecord) -> Result<f64> {
        self.run(std::slice::from_ref(record))?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("model returned no prediction"))
    }

    fn predict_batch(&self, records: &[FeatureRecord]) -> Result<Vec<f64>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        self.run(records)
    }
}
