//! Severity tiers for predicted traffic volume

use serde::{Deserialize, Serialize};

/// Predictions above this volume are High.
pub const HIGH_THRESHOLD: f64 = 250.0;

/// Predictions above this volume (and up to [`HIGH_THRESHOLD`]) are Medium.
pub const MEDIUM_THRESHOLD: f64 = 150.0;

/// Upper end of the gauge axis. Predictions are not clamped to it.
pub const GAUGE_MAX: f64 = 300.0;

/// Congestion severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Low,
    Medium,
    High,
}

/// Display color attached to a severity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertColor {
    Green,
    Orange,
    Red,
}

impl SeverityTier {
    /// Classify a predicted volume (vehicles per hour).
    ///
    /// Total over all inputs: both boundaries fall into the lower tier and
    /// negative or NaN volumes map to Low.
    pub fn from_volume(volume: f64) -> Self {
        if volume > HIGH_THRESHOLD {
            SeverityTier::High
        } else if volume > MEDIUM_THRESHOLD {
            SeverityTier::Medium
        } else {
            SeverityTier::Low
        }
    }

    pub fn color(&self) -> AlertColor {
        match self {
            SeverityTier::Low => AlertColor::Green,
            SeverityTier::Medium => AlertColor::Orange,
            SeverityTier::High => AlertColor::Red,
        }
    }

    /// Banner text shown with the prediction.
    pub fn alert_text(&self) -> &'static str {
        match self {
            SeverityTier::Low => "Smooth Traffic Flow - Roads are Clear!",
            SeverityTier::Medium => "Moderate Traffic - Plan Accordingly.",
            SeverityTier::High => "High Congestion Expected!",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityTier::Low => "low",
            SeverityTier::Medium => "medium",
            SeverityTier::High => "high",
        }
    }
}

/// Classify a predicted volume into its tier and display color.
pub fn classify(volume: f64) -> (SeverityTier, AlertColor) {
    let tier = SeverityTier::from_volume(volume);
    (tier, tier.color())
}

/// Colored band drawn behind the gauge needle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GaugeBand {
    pub from: f64,
    pub to: f64,
    pub color: String,
}

/// Gauge chart description for a single prediction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Gauge {
    pub value: f64,
    pub axis_min: f64,
    pub axis_max: f64,
    pub bar_color: AlertColor,
    pub bands: Vec<GaugeBand>,
}

impl Gauge {
    pub fn new(value: f64) -> Self {
        let band = |from: f64, to: f64, color: &str| GaugeBand {
            from,
            to,
            color: color.to_string(),
        };

        Self {
            value,
            axis_min: 0.0,
            axis_max: GAUGE_MAX,
            bar_color: SeverityTier::from_volume(value).color(),
            bands: vec![
                band(0.0, MEDIUM_THRESHOLD, "lightgreen"),
                band(MEDIUM_THRESHOLD, HIGH_THRESHOLD, "gold"),
                band(HIGH_THRESHOLD, GAUGE_MAX, "crimson"),
            ],
        }
    }
}
