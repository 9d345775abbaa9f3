//! Simulated congestion zones for the heatmap section

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fixed zones as (name, latitude, longitude).
const ZONES: [(&str, f64, f64); 5] = [
    ("Midtown", 40.758, -73.985),
    ("Greenwich", 40.730, -73.997),
    ("Downtown", 40.712, -74.006),
    ("Financial District", 40.706, -74.009),
    ("Grand Central", 40.751, -73.977),
];

/// One heatmap point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CongestionZone {
    pub zone: String,
    pub lat: f64,
    pub lon: f64,
    /// Random weight in [0, 1)
    pub intensity: f64,
}

/// Initial camera for the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            latitude: 40.75,
            longitude: -73.98,
            zoom: 11.0,
            pitch: 45.0,
        }
    }
}

/// Synthetic congestion map. Intensities are random, not measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CongestionMap {
    pub synthetic: bool,
    pub view: MapView,
    pub zones: Vec<CongestionZone>,
}

impl CongestionMap {
    pub fn simulate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let zones = ZONES
            .iter()
            .map(|&(zone, lat, lon)| CongestionZone {
                zone: zone.to_string(),
                lat,
                lon,
                intensity: rng.gen_range(0.0..1.0),
            })
            .collect();

        Self {
            synthetic: true,
            view: MapView::default(),
            zones,
        }
    }

    /// Zone with the highest simulated intensity.
    pub fn hottest(&self) -> Option<&CongestionZone> {
        self.zones
            .iter()
            .max_by(|a, b| a.intensity.total_cmp(&b.intensity))
    }
}
