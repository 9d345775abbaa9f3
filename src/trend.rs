//! Illustrative short-horizon trend around a single prediction.
//!
//! This is not a forecast: every point is the current prediction with an
//! independent random perturbation, regenerated on each render.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of hours projected, starting at the current hour.
pub const TREND_HOURS: usize = 6;

/// Maximum relative perturbation applied to each point.
pub const TREND_SPREAD: f64 = 0.15;

/// Synthetic (hour, volume) point for display only
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Hour of day (0-23)
    pub hour: u8,
    /// Perturbed volume in vehicles per hour
    pub volume: f64,
}

/// Fans a prediction out into [`TREND_HOURS`] perturbed points.
pub struct TrendProjector {
    hours: usize,
    spread: f64,
}

impl TrendProjector {
    pub fn new() -> Self {
        Self {
            hours: TREND_HOURS,
            spread: TREND_SPREAD,
        }
    }

    /// Project `prediction` over hours `start_hour..start_hour + 6` (mod 24).
    ///
    /// Each volume is `prediction * (1 + u)` with `u` uniform in
    /// `[-0.15, 0.15]`, drawn from `rng`.
    pub fn project<R: Rng + ?Sized>(
        &self,
        prediction: f64,
        start_hour: u8,
        rng: &mut R,
    ) -> Vec<TrendPoint> {
        (0..self.hours)
            .map(|offset| {
                let u: f64 = rng.gen_range(-self.spread..=self.spread);
                TrendPoint {
                    hour: ((start_hour as usize + offset) % 24) as u8,
                    volume: prediction * (1.0 + u),
                }
            })
            .collect()
    }
}

impl Default for TrendProjector {
    fn default() -> Self {
        Self::new()
    }
}
