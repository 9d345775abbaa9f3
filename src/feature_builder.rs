//! Feature assembly for traffic volume model inference.
//!
//! Turns the sensor inputs into the feature row the trained model expects.

use crate::types::features::{FeatureRecord, TrafficInputs, FEATURE_COUNT, FEATURE_NAMES};

/// Builds [`FeatureRecord`]s from user inputs.
///
/// Field order and names match the columns the model was trained on.
/// Inputs are assumed to already be within slider ranges; no validation
/// happens here.
pub struct FeatureVectorBuilder;

impl FeatureVectorBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the feature row for one interaction.
    pub fn build(&self, inputs: &TrafficInputs) -> FeatureRecord {
        FeatureRecord {
            car_count: inputs.cars,
            bike_count: inputs.bikes,
            bus_count: inputs.buses,
            truck_count: inputs.trucks,
            hour: inputs.hour,
            weekday: inputs.weekday,
            is_weekend: Self::is_weekend(inputs.weekday),
        }
    }

    /// Saturday (5) and Sunday (6) count as weekend.
    pub fn is_weekend(weekday: u8) -> u8 {
        u8::from(weekday >= 5)
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Get feature names in model order.
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

impl Default for FeatureVectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
