//! Feature impact: the model's importances paired with feature names

use crate::error::{DashboardError, DashboardResult};
use crate::models::TrafficModel;
use crate::types::features::{FEATURE_COUNT, FEATURE_NAMES};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Importances sorted from most to least influential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImpact {
    pub model: String,
    pub features: Vec<FeatureImportance>,
}

impl FeatureImpact {
    pub fn from_model(model: &dyn TrafficModel) -> DashboardResult<Self> {
        let importances =
            model
                .feature_importances()
                .ok_or_else(|| DashboardError::ImportancesUnavailable {
                    model: model.name().to_string(),
                })?;

        if importances.len() != FEATURE_COUNT {
            return Err(DashboardError::ImportanceLengthMismatch {
                got: importances.len(),
                expected: FEATURE_COUNT,
            });
        }

        let mut features: Vec<FeatureImportance> = FEATURE_NAMES
            .iter()
            .zip(importances)
            .map(|(name, importance)| FeatureImportance {
                feature: name.to_string(),
                importance,
            })
            .collect();
        // Stable sort keeps model order among ties
        features.sort_by(|a, b| b.importance.total_cmp(&a.importance));

        Ok(Self {
            model: model.name().to_string(),
            features,
        })
    }

    pub fn top(&self) -> Option<&FeatureImportance> {
        self.features.first()
    }
}
