//! Raw sensor inputs and the fixed-schema feature row consumed by the model

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Feature names in the exact order the model was trained on.
pub const FEATURE_NAMES: [&str; 7] = [
    "CarCount",
    "BikeCount",
    "BusCount",
    "TruckCount",
    "Hour",
    "Weekday",
    "IsWeekend",
];

/// Number of features in a [`FeatureRecord`].
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Upper bounds of the input sliders (all lower bounds are zero).
pub const MAX_CARS: u32 = 500;
pub const MAX_BIKES: u32 = 300;
pub const MAX_BUSES: u32 = 100;
pub const MAX_TRUCKS: u32 = 100;
pub const MAX_HOUR: u8 = 23;
pub const MAX_WEEKDAY: u8 = 6;

/// Vehicle counts and time of day as entered by the user.
///
/// `weekday` follows Monday = 0 .. Sunday = 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficInputs {
    pub cars: u32,
    pub bikes: u32,
    pub buses: u32,
    pub trucks: u32,
    pub hour: u8,
    pub weekday: u8,
}

impl TrafficInputs {
    /// Build inputs for the given vehicle counts at a wall-clock time.
    pub fn at(time: NaiveDateTime, cars: u32, bikes: u32, buses: u32, trucks: u32) -> Self {
        Self {
            cars,
            bikes,
            buses,
            trucks,
            hour: time.hour() as u8,
            weekday: time.weekday().num_days_from_monday() as u8,
        }
    }

    /// Clamp every field into its slider range.
    pub fn clamped(self) -> Self {
        Self {
            cars: self.cars.min(MAX_CARS),
            bikes: self.bikes.min(MAX_BIKES),
            buses: self.buses.min(MAX_BUSES),
            trucks: self.trucks.min(MAX_TRUCKS),
            hour: self.hour.min(MAX_HOUR),
            weekday: self.weekday.min(MAX_WEEKDAY),
        }
    }
}

impl Default for TrafficInputs {
    fn default() -> Self {
        Self {
            cars: 120,
            bikes: 80,
            buses: 10,
            trucks: 15,
            hour: 8,
            weekday: 0,
        }
    }
}

/// Single input row for the traffic volume model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(rename = "CarCount")]
    pub car_count: u32,

    #[serde(rename = "BikeCount")]
    pub bike_count: u32,

    #[serde(rename = "BusCount")]
    pub bus_count: u32,

    #[serde(rename = "TruckCount")]
    pub truck_count: u32,

    /// Hour of day (0-23)
    #[serde(rename = "Hour")]
    pub hour: u8,

    /// Day of week, Monday = 0
    #[serde(rename = "Weekday")]
    pub weekday: u8,

    /// 1 on Saturday and Sunday, 0 otherwise
    #[serde(rename = "IsWeekend")]
    pub is_weekend: u8,
}

impl FeatureRecord {
    /// Values in [`FEATURE_NAMES`] order, as the model consumes them.
    pub fn to_vec(&self) -> Vec<f32> {
        self.values().iter().map(|&v| v as f32).collect()
    }

    /// Values in [`FEATURE_NAMES`] order.
    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        [
            self.car_count as f64,
            self.bike_count as f64,
            self.bus_count as f64,
            self.truck_count as f64,
            self.hour as f64,
            self.weekday as f64,
            self.is_weekend as f64,
        ]
    }

    /// Name/value pairs for the input summary.
    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        FEATURE_NAMES.iter().copied().zip(self.values()).collect()
    }
}
