//! Render and inference statistics for the dashboard.

use crate::types::severity::SeverityTier;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;
use tracing::info;

/// Counters shared by every render pass
pub struct DashboardMetrics {
    /// Total render passes
    pub renders: AtomicU64,
    /// Predictions that produced a volume
    pub predictions_succeeded: AtomicU64,
    /// Predictions that ended in an error
    pub predictions_failed: AtomicU64,
    /// Successful predictions by severity tier
    by_tier: RwLock<HashMap<SeverityTier, u64>>,
    /// Inference times (in microseconds)
    inference_times: RwLock<Vec<u64>>,
}

impl DashboardMetrics {
    pub fn new() -> Self {
        Self {
            renders: AtomicU64::new(0),
            predictions_succeeded: AtomicU64::new(0),
            predictions_failed: AtomicU64::new(0),
            by_tier: RwLock::new(HashMap::new()),
            inference_times: RwLock::new(Vec::with_capacity(1000)),
        }
    }

    pub fn record_render(&self) {
        self.renders.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, inference_time: Duration, tier: SeverityTier) {
        self.predictions_succeeded.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.inference_times.write() {
            times.push(inference_time.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        if let Ok(mut by_tier) = self.by_tier.write() {
            *by_tier.entry(tier).or_insert(0) += 1;
        }
    }

    pub fn record_failure(&self) {
        self.predictions_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get inference time statistics
    pub fn get_inference_stats(&self) -> InferenceStats {
        let sorted = match self.inference_times.read() {
            Ok(times) if !times.is_empty() => {
                let mut sorted = times.clone();
                sorted.sort_unstable();
                sorted
            }
            _ => return InferenceStats::default(),
        };

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let percentile = |p: f64| sorted[((count as f64 * p) as usize).min(count - 1)];

        InferenceStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Successful predictions per tier
    pub fn get_tier_counts(&self) -> HashMap<SeverityTier, u64> {
        self.by_tier
            .read()
            .map(|by_tier| by_tier.clone())
            .unwrap_or_default()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let renders = self.renders.load(Ordering::Relaxed);
        let succeeded = self.predictions_succeeded.load(Ordering::Relaxed);
        let failed = self.predictions_failed.load(Ordering::Relaxed);
        let stats = self.get_inference_stats();
        let tiers = self.get_tier_counts();

        info!(
            renders = renders,
            predictions = succeeded,
            failures = failed,
            "Dashboard summary"
        );
        info!(
            mean_us = stats.mean_us,
            p50_us = stats.p50_us,
            p95_us = stats.p95_us,
            p99_us = stats.p99_us,
            max_us = stats.max_us,
            "Inference time"
        );
        for tier in [SeverityTier::Low, SeverityTier::Medium, SeverityTier::High] {
            let count = tiers.get(&tier).copied().unwrap_or(0);
            let pct = if succeeded > 0 {
                (count as f64 / succeeded as f64) * 100.0
            } else {
                0.0
            };
            info!(tier = tier.as_str(), count = count, "{:>5.1}% of predictions", pct);
        }
    }
}

impl Default for DashboardMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Inference time statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InferenceStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = DashboardMetrics::new();

        metrics.record_render();
        metrics.record_render();
        metrics.record_prediction(Duration::from_micros(100), SeverityTier::High);
        metrics.record_failure();

        assert_eq!(metrics.renders.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.predictions_succeeded.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.predictions_failed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.get_tier_counts().get(&SeverityTier::High), Some(&1));
    }

    #[test]
    fn test_inference_stats() {
        let metrics = DashboardMetrics::new();
        for us in 1..=100 {
            metrics.record_prediction(Duration::from_micros(us), SeverityTier::Low);
        }

        let stats = metrics.get_inference_stats();
        assert_eq!(stats.count, 100);
        assert_eq!(stats.mean_us, 50);
        assert_eq!(stats.p50_us, 51);
        assert_eq!(stats.p99_us, 100);
        assert_eq!(stats.max_us, 100);
    }

    #[test]
    fn test_empty_stats() {
        assert_eq!(
            DashboardMetrics::new().get_inference_stats(),
            InferenceStats::default()
        );
    }
}
