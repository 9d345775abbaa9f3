//! Sample Data Generator
//!
//! Writes a demo linear model and a synthetic prediction log so the
//! dashboard can be exercised without a trained artifact.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use traffic_flow_prediction::models::{LinearRegressor, TrafficModel};
use traffic_flow_prediction::{FeatureVectorBuilder, TrafficInputs};

/// Log row matching what the insights page reads
#[derive(Debug, Serialize)]
struct LogRecord {
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Predicted Volume")]
    predicted_volume: f64,
}

/// Generates sensor readings with rush-hour peaks
struct ReadingGenerator {
    rng: StdRng,
}

impl ReadingGenerator {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Vehicle counts for a time slot, busier at 08:00 and 17:00
    fn generate(&mut self, time: NaiveDateTime) -> TrafficInputs {
        let mut inputs = TrafficInputs::at(time, 0, 0, 0, 0);
        let rush = match inputs.hour {
            7..=9 | 16..=18 => 2.0,
            0..=5 => 0.3,
            _ => 1.0,
        };
        let weekend = if inputs.weekday >= 5 { 0.7 } else { 1.0 };
        let scale = rush * weekend;

        inputs.cars = (self.rng.gen_range(40.0..160.0) * scale) as u32;
        inputs.bikes = (self.rng.gen_range(10.0..90.0) * scale) as u32;
        inputs.buses = (self.rng.gen_range(0.0..25.0) * scale) as u32;
        inputs.trucks = (self.rng.gen_range(0.0..30.0) * scale) as u32;
        inputs.clamped()
    }
}

fn demo_model() -> anyhow::Result<LinearRegressor> {
    let mut model = LinearRegressor::new(
        "demo_linear",
        vec![0.55, 0.2, 1.1, 0.9, 1.5, -2.0, -12.0],
        10.0,
    )?;
    model.feature_importances = Some(vec![0.42, 0.11, 0.08, 0.12, 0.2, 0.04, 0.03]);
    Ok(model)
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_sample_data=info".parse()?),
        )
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let out_dir = PathBuf::from(args.get(1).map(|s| s.as_str()).unwrap_or("."));
    let days: i64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(7);
    let seed: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(42);

    info!(out_dir = %out_dir.display(), days = days, seed = seed, "Generating sample data");

    let model = demo_model()?;
    let models_dir = out_dir.join("models");
    std::fs::create_dir_all(&models_dir)?;
    let model_path = models_dir.join("demo_model.json");
    std::fs::write(&model_path, serde_json::to_string_pretty(&model)?)?;
    info!(path = %model_path.display(), "Wrote demo model");

    let builder = FeatureVectorBuilder::new();
    let mut generator = ReadingGenerator::new(seed);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow::anyhow!("invalid start date"))?;

    let log_path = out_dir.join("logs.csv");
    let mut writer = csv::Writer::from_path(&log_path)?;
    let mut rows = 0;

    for slot in 0..days * 24 * 4 {
        let time = start + Duration::minutes(15 * slot);
        let record = builder.build(&generator.generate(time));
        let volume = model.predict(&record)?;

        writer.serialize(LogRecord {
            timestamp: time.format("%Y-%m-%d %H:%M:%S").to_string(),
            predicted_volume: (volume * 100.0).round() / 100.0,
        })?;
        rows += 1;
    }
    writer.flush()?;

    info!(path = %log_path.display(), rows = rows, "Wrote prediction log");
    info!(
        "Run the dashboard with TRAFFIC__MODEL__PATH={}",
        model_path.display()
    );

    Ok(())
}
