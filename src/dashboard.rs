//! One full render pass of the traffic dashboard.
//!
//! Inputs flow through the feature builder, the prediction invoker and the
//! severity classifier; the trend projector fans the prediction out for
//! display. Each section degrades on its own and a render never fails.

use crate::congestion_map::CongestionMap;
use crate::error::DashboardError;
use crate::feature_builder::FeatureVectorBuilder;
use crate::metrics::DashboardMetrics;
use crate::models::PredictionInvoker;
use crate::trend::{TrendPoint, TrendProjector};
use crate::types::features::{FeatureRecord, TrafficInputs};
use crate::types::severity::{AlertColor, Gauge, SeverityTier};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Prediction section of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PredictionView {
    Ready {
        volume: f64,
        severity: SeverityTier,
        color: AlertColor,
        alert_text: String,
        gauge: Gauge,
    },
    Failed {
        error: String,
    },
}

impl PredictionView {
    pub fn volume(&self) -> Option<f64> {
        match self {
            PredictionView::Ready { volume, .. } => Some(*volume),
            PredictionView::Failed { .. } => None,
        }
    }

    pub fn severity(&self) -> Option<SeverityTier> {
        match self {
            PredictionView::Ready { severity, .. } => Some(*severity),
            PredictionView::Failed { .. } => None,
        }
    }
}

/// Everything the presentation layer needs for one render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub render_id: String,
    pub rendered_at: DateTime<Utc>,
    /// Persistent warnings, e.g. a failed model load
    pub warnings: Vec<String>,
    pub features: FeatureRecord,
    pub prediction: PredictionView,
    /// Illustrative only; absent when there is no prediction
    pub trend: Option<Vec<TrendPoint>>,
    pub congestion_map: CongestionMap,
}

/// Owns the pipeline components for the lifetime of the application
pub struct Dashboard {
    builder: FeatureVectorBuilder,
    invoker: PredictionInvoker,
    projector: TrendProjector,
    metrics: Arc<DashboardMetrics>,
    /// Set when the startup model load failed
    load_failure: Option<DashboardError>,
}

impl Dashboard {
    pub fn new(invoker: PredictionInvoker) -> Self {
        Self {
            builder: FeatureVectorBuilder::new(),
            invoker,
            projector: TrendProjector::new(),
            metrics: Arc::new(DashboardMetrics::new()),
            load_failure: None,
        }
    }

    /// Keep the startup load failure so every render can warn about it.
    pub fn with_load_failure(mut self, failure: Option<DashboardError>) -> Self {
        self.load_failure = failure;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<DashboardMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn invoker(&self) -> &PredictionInvoker {
        &self.invoker
    }

    pub fn metrics(&self) -> &Arc<DashboardMetrics> {
        &self.metrics
    }

    /// Persistent warnings shown above every page
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(failure) = &self.load_failure {
            warnings.push(failure.to_string());
        }
        if !self.invoker.is_available() {
            warnings.push(DashboardError::ModelUnavailable.to_string());
        }
        warnings
    }

    /// Render one interaction. Randomized sections draw from `rng`.
    pub fn render<R: Rng + ?Sized>(&self, inputs: &TrafficInputs, rng: &mut R) -> DashboardSnapshot {
        self.metrics.record_render();

        let features = self.builder.build(inputs);
        let started = Instant::now();

        let prediction = match self.invoker.predict(&features) {
            Ok(result) => {
                let severity = result.severity();
                self.metrics.record_prediction(started.elapsed(), severity);
                PredictionView::Ready {
                    volume: result.volume,
                    severity,
                    color: severity.color(),
                    alert_text: severity.alert_text().to_string(),
                    gauge: Gauge::new(result.volume),
                }
            }
            Err(e) => {
                self.metrics.record_failure();
                PredictionView::Failed {
                    error: e.to_string(),
                }
            }
        };

        let trend = prediction
            .volume()
            .map(|volume| self.projector.project(volume, features.hour, rng));
        let congestion_map = CongestionMap::simulate(rng);

        let snapshot = DashboardSnapshot {
            render_id: uuid::Uuid::new_v4().to_string(),
            rendered_at: Utc::now(),
            warnings: self.warnings(),
            features,
            prediction,
            trend,
            congestion_map,
        };

        match &snapshot.prediction {
            PredictionView::Ready {
                volume, severity, ..
            } => info!(
                render_id = %snapshot.render_id,
                volume = *volume,
                severity = severity.as_str(),
                "Dashboard rendered"
            ),
            PredictionView::Failed { error } => debug!(
                render_id = %snapshot.render_id,
                error = %error,
                "Dashboard rendered without prediction"
            ),
        }

        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrafficModel;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::PathBuf;

    struct FixedModel(f64);

    impl TrafficModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict(&self, _record: &FeatureRecord) -> anyhow::Result<f64> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_render_with_prediction() {
        let dashboard = Dashboard::new(PredictionInvoker::with_model(Arc::new(FixedModel(180.0))));
        let snapshot = dashboard.render(&TrafficInputs::default(), &mut StdRng::seed_from_u64(1));

        assert!(snapshot.warnings.is_empty());
        assert_eq!(snapshot.prediction.severity(), Some(SeverityTier::Medium));
        assert_eq!(snapshot.trend.as_ref().map(|t| t.len()), Some(6));
        assert_eq!(snapshot.congestion_map.zones.len(), 5);
        assert_eq!(dashboard.metrics().get_tier_counts().get(&SeverityTier::Medium), Some(&1));
    }

    #[test]
    fn test_render_without_model() {
        let failure = DashboardError::ModelLoadFailure {
            path: PathBuf::from("best_model.onnx"),
            reason: "file not found".to_string(),
        };
        let dashboard = Dashboard::new(PredictionInvoker::new(None)).with_load_failure(Some(failure));
        let snapshot = dashboard.render(&TrafficInputs::default(), &mut StdRng::seed_from_u64(1));

        assert_eq!(snapshot.warnings.len(), 2);
        assert!(snapshot.warnings[0].contains("best_model.onnx"));
        assert!(matches!(snapshot.prediction, PredictionView::Failed { .. }));
        assert!(snapshot.trend.is_none());
        assert_eq!(snapshot.congestion_map.zones.len(), 5);
        assert_eq!(
            dashboard
                .metrics()
                .predictions_failed
                .load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let dashboard = Dashboard::new(PredictionInvoker::with_model(Arc::new(FixedModel(90.0))));
        let snapshot = dashboard.render(&TrafficInputs::default(), &mut StdRng::seed_from_u64(2));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["prediction"]["status"], "ready");
        assert_eq!(json["prediction"]["severity"], "low");
        assert_eq!(json["prediction"]["color"], "green");
        assert_eq!(json["features"]["CarCount"], 120);
    }
}
