//! Model performance overview.
//!
//! Error metrics are only computed against real labels. A synthetic
//! workload exercises the model and reports its prediction distribution,
//! but has no ground truth and therefore no MAE/RMSE/R².

use crate::error::{DashboardError, DashboardResult};
use crate::feature_builder::FeatureVectorBuilder;
use crate::models::PredictionInvoker;
use crate::types::features::{FeatureRecord, TrafficInputs};
use crate::types::severity::GAUGE_MAX;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Rows shown in the actual vs predicted comparison.
pub const COMPARISON_ROWS: usize = 50;

/// Histogram buckets across `[0, GAUGE_MAX)`.
pub const HISTOGRAM_BUCKETS: usize = 10;

/// Feature rows to evaluate, with true volumes when known
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSet {
    pub records: Vec<FeatureRecord>,
    pub actuals: Option<Vec<f64>>,
}

/// Random feature rows spanning typical sensor ranges
pub struct SyntheticWorkload;

impl SyntheticWorkload {
    /// Generate `n` unlabeled rows. IsWeekend is derived from the weekday.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, n: usize) -> EvaluationSet {
        let builder = FeatureVectorBuilder::new();
        let records = (0..n)
            .map(|_| {
                builder.build(&TrafficInputs {
                    cars: rng.gen_range(50..500),
                    bikes: rng.gen_range(10..300),
                    buses: rng.gen_range(0..100),
                    trucks: rng.gen_range(0..80),
                    hour: rng.gen_range(0..24),
                    weekday: rng.gen_range(0..7),
                })
            })
            .collect();

        EvaluationSet {
            records,
            actuals: None,
        }
    }
}

/// One row of a labeled evaluation CSV
#[derive(Debug, Deserialize)]
struct LabeledRow {
    #[serde(rename = "CarCount")]
    car_count: u32,
    #[serde(rename = "BikeCount")]
    bike_count: u32,
    #[serde(rename = "BusCount")]
    bus_count: u32,
    #[serde(rename = "TruckCount")]
    truck_count: u32,
    #[serde(rename = "Hour")]
    hour: u8,
    #[serde(rename = "Weekday")]
    weekday: u8,
    #[serde(rename = "IsWeekend")]
    is_weekend: u8,
    #[serde(rename = "TrafficVolume")]
    traffic_volume: f64,
}

/// Load feature rows and their observed `TrafficVolume` from a CSV file.
pub fn load_labeled_samples<P: AsRef<Path>>(path: P) -> DashboardResult<EvaluationSet> {
    let path = path.as_ref();
    let invalid = |reason: String| {
        DashboardError::InvalidLabeledData(format!("{}: {}", path.display(), reason))
    };

    let mut reader = csv::Reader::from_path(path).map_err(|e| invalid(e.to_string()))?;
    let mut records = Vec::new();
    let mut actuals = Vec::new();

    for row in reader.deserialize::<LabeledRow>() {
        let row = row.map_err(|e| invalid(e.to_string()))?;
        records.push(FeatureRecord {
            car_count: row.car_count,
            bike_count: row.bike_count,
            bus_count: row.bus_count,
            truck_count: row.truck_count,
            hour: row.hour,
            weekday: row.weekday,
            is_weekend: row.is_weekend,
        });
        actuals.push(row.traffic_volume);
    }

    if records.is_empty() {
        return Err(invalid("no rows".to_string()));
    }

    Ok(EvaluationSet {
        records,
        actuals: Some(actuals),
    })
}

/// Regression error metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
}

impl ErrorMetrics {
    /// Both slices must be non-empty and of equal length.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Self {
        Self {
            mae: mean_absolute_error(actual, predicted),
            rmse: root_mean_squared_error(actual, predicted),
            r2: r2_score(actual, predicted),
        }
    }
}

pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum();
    sum / actual.len() as f64
}

pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    (sum / actual.len() as f64).sqrt()
}

/// Coefficient of determination. Constant targets score 1.0 when predicted
/// exactly and 0.0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Shape of the predicted volumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionDistribution {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Counts per 30 vehicles/hour bucket across [0, 300)
    pub buckets: [u64; HISTOGRAM_BUCKETS],
    pub below_range: u64,
    pub above_range: u64,
}

impl PredictionDistribution {
    pub fn from_predictions(predicted: &[f64]) -> Self {
        let width = GAUGE_MAX / HISTOGRAM_BUCKETS as f64;
        let mut buckets = [0u64; HISTOGRAM_BUCKETS];
        let mut below_range = 0;
        let mut above_range = 0;

        for &p in predicted {
            if p < 0.0 {
                below_range += 1;
            } else if p >= GAUGE_MAX {
                above_range += 1;
            } else {
                let bucket = ((p / width) as usize).min(HISTOGRAM_BUCKETS - 1);
                buckets[bucket] += 1;
            }
        }

        let count = predicted.len();
        let (min, max, mean) = if count == 0 {
            (0.0, 0.0, 0.0)
        } else {
            (
                predicted.iter().copied().fold(f64::INFINITY, f64::min),
                predicted.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                predicted.iter().sum::<f64>() / count as f64,
            )
        };

        Self {
            count,
            min,
            max,
            mean,
            buckets,
            below_range,
            above_range,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPoint {
    pub actual: f64,
    pub predicted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub model: String,
    /// True when no ground truth was available
    pub synthetic: bool,
    pub distribution: PredictionDistribution,
    pub metrics: Option<ErrorMetrics>,
    pub comparison: Vec<ComparisonPoint>,
}

impl PerformanceReport {
    /// Run batch inference over `set` and summarize it.
    pub fn evaluate(invoker: &PredictionInvoker, set: &EvaluationSet) -> DashboardResult<Self> {
        if let Some(actuals) = &set.actuals {
            if actuals.len() != set.records.len() {
                return Err(DashboardError::InvalidLabeledData(format!(
                    "{} labels for {} rows",
                    actuals.len(),
                    set.records.len()
                )));
            }
        }

        let predicted = invoker.predict_batch(&set.records)?;
        let distribution = PredictionDistribution::from_predictions(&predicted);

        let (metrics, comparison) = match &set.actuals {
            Some(actuals) if !actuals.is_empty() => {
                let comparison = actuals
                    .iter()
                    .zip(&predicted)
                    .take(COMPARISON_ROWS)
                    .map(|(&actual, &predicted)| ComparisonPoint { actual, predicted })
                    .collect();
                (Some(ErrorMetrics::compute(actuals, &predicted)), comparison)
            }
            _ => (None, Vec::new()),
        };

        let report = Self {
            model: invoker.model_name().unwrap_or_default().to_string(),
            synthetic: set.actuals.is_none(),
            distribution,
            metrics,
            comparison,
        };

        info!(
            model = %report.model,
            samples = report.distribution.count,
            synthetic = report.synthetic,
            mae = report.metrics.map(|m| m.mae),
            "Performance evaluation complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrafficModel;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;
    use std::sync::Arc;

    /// Predicts the car count
    struct CarModel;

    impl TrafficModel for CarModel {
        fn name(&self) -> &str {
            "cars"
        }

        fn predict(&self, record: &FeatureRecord) -> anyhow::Result<f64> {
            Ok(record.car_count as f64)
        }
    }

    struct NanModel;

    impl TrafficModel for NanModel {
        fn name(&self) -> &str {
            "nan"
        }

        fn predict(&self, _record: &FeatureRecord) -> anyhow::Result<f64> {
            Ok(f64::NAN)
        }
    }

    #[test]
    fn test_non_finite_predictions_fail_evaluation() {
        let invoker = PredictionInvoker::with_model(Arc::new(NanModel));
        let set = SyntheticWorkload::generate(&mut StdRng::seed_from_u64(42), 5);

        assert!(matches!(
            PerformanceReport::evaluate(&invoker, &set),
            Err(DashboardError::InferenceError(_))
        ));
    }

    #[test]
    fn test_error_metrics() {
        let actual = [3.0, -0.5, 2.0, 7.0];
        let predicted = [2.5, 0.0, 2.0, 8.0];
        let metrics = ErrorMetrics::compute(&actual, &predicted);

        assert!((metrics.mae - 0.5).abs() < 1e-9);
        assert!((metrics.rmse - 0.375f64.sqrt()).abs() < 1e-9);
        assert!((metrics.r2 - 0.948_608_137).abs() < 1e-6);
    }

    #[test]
    fn test_r2_constant_target() {
        assert_eq!(r2_score(&[5.0, 5.0], &[5.0, 5.0]), 1.0);
        assert_eq!(r2_score(&[5.0, 5.0], &[4.0, 6.0]), 0.0);
    }

    #[test]
    fn test_synthetic_workload_ranges() {
        let set = SyntheticWorkload::generate(&mut StdRng::seed_from_u64(42), 200);

        assert_eq!(set.records.len(), 200);
        assert!(set.actuals.is_none());
        for r in &set.records {
            assert!((50..500).contains(&r.car_count));
            assert!((10..300).contains(&r.bike_count));
            assert!(r.bus_count < 100);
            assert!(r.truck_count < 80);
            assert!(r.hour < 24);
            assert_eq!(r.is_weekend, u8::from(r.weekday >= 5));
        }
    }

    #[test]
    fn test_synthetic_report_has_no_metrics() {
        let invoker = PredictionInvoker::with_model(Arc::new(CarModel));
        let set = SyntheticWorkload::generate(&mut StdRng::seed_from_u64(42), 20);
        let report = PerformanceReport::evaluate(&invoker, &set).unwrap();

        assert!(report.synthetic);
        assert!(report.metrics.is_none());
        assert!(report.comparison.is_empty());
        assert_eq!(report.distribution.count, 20);
        let binned: u64 = report.distribution.buckets.iter().sum::<u64>()
            + report.distribution.above_range
            + report.distribution.below_range;
        assert_eq!(binned, 20);
    }

    #[test]
    fn test_labeled_evaluation_from_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "CarCount,BikeCount,BusCount,TruckCount,Hour,Weekday,IsWeekend,TrafficVolume\n\
             100,10,1,1,8,2,0,110\n\
             200,10,1,1,9,5,1,190\n"
        )
        .unwrap();

        let set = load_labeled_samples(file.path()).unwrap();
        let invoker = PredictionInvoker::with_model(Arc::new(CarModel));
        let report = PerformanceReport::evaluate(&invoker, &set).unwrap();

        assert!(!report.synthetic);
        let metrics = report.metrics.unwrap();
        assert!((metrics.mae - 10.0).abs() < 1e-9);
        assert_eq!(report.comparison.len(), 2);
        assert_eq!(report.comparison[1].predicted, 200.0);
    }

    #[test]
    fn test_missing_model_is_reported() {
        let invoker = PredictionInvoker::new(None);
        let set = SyntheticWorkload::generate(&mut StdRng::seed_from_u64(1), 5);
        assert_eq!(
            PerformanceReport::evaluate(&invoker, &set),
            Err(DashboardError::ModelUnavailable)
        );
    }

    #[test]
    fn test_distribution_buckets() {
        let dist = PredictionDistribution::from_predictions(&[-1.0, 0.0, 29.9, 30.0, 299.9, 300.0]);
        assert_eq!(dist.below_range, 1);
        assert_eq!(dist.above_range, 1);
        assert_eq!(dist.buckets[0], 2);
        assert_eq!(dist.buckets[1], 1);
        assert_eq!(dist.buckets[9], 1);
        assert_eq!(dist.min, -1.0);
        assert_eq!(dist.max, 300.0);
    }
}
