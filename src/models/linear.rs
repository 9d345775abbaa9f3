//! Linear regression model stored as JSON

use super::TrafficModel;
use crate::types::features::{FeatureRecord, FEATURE_COUNT};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// `volume = bias + sum(weights[i] * feature[i])`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub model_name: String,
    pub weights: Vec<f64>,
    pub bias: f64,
    /// Importances exported alongside the weights, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,
}

impl LinearRegressor {
    pub fn new(model_name: &str, weights: Vec<f64>, bias: f64) -> Result<Self> {
        let model = Self {
            model_name: model_name.to_string(),
            weights,
            bias,
            feature_importances: None,
        };
        model.validate()?;
        Ok(model)
    }

    /// Load a model from a JSON artifact.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model file {}", path.display()))?;
        let model: LinearRegressor = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse model file {}", path.display()))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.weights.len() != FEATURE_COUNT {
            bail!(
                "model {} has {} weights, expected {}",
                self.model_name,
                self.weights.len(),
                FEATURE_COUNT
            );
        }
        if let Some(importances) = &self.feature_importances {
            if importances.len() != FEATURE_COUNT {
                bail!(
                    "model {} has {} feature importances, expected {}",
                    self.model_name,
                    importances.len(),
                    FEATURE_COUNT
                );
            }
        }
        Ok(())
    }
}

impl TrafficModel for LinearRegressor {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn predict(&self, record: &FeatureRecord) -> Result<f64> {
        let sum: f64 = self
            .weights
            .iter()
            .zip(record.values())
            .map(|(w, x)| w * x)
            .sum();
        Ok(sum + self.bias)
    }

    /// Exported importances, or |weights| normalized to sum to 1.
    fn feature_importances(&self) -> Option<Vec<f64>> {
        if let Some(importances) = &self.feature_importances {
            return Some(importances.clone());
        }

        let total: f64 = self.weights.iter().map(|w| w.abs()).sum();
        if total == 0.0 {
            return Some(vec![0.0; self.weights.len()]);
        }
        Some(self.weights.iter().map(|w| w.abs() / total).collect())
    }
}
