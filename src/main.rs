//! Traffic Dashboard - Main Entry Point
//!
//! Loads the model once, renders the requested page and prints it as JSON
//! for the presentation layer.

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use traffic_flow_prediction::{
    config::{AppConfig, LoggingConfig},
    dashboard::Dashboard,
    importance::FeatureImpact,
    insights::HourlyInsights,
    metrics::DashboardMetrics,
    models::{ModelLoader, PredictionInvoker},
    performance::{load_labeled_samples, PerformanceReport, SyntheticWorkload},
    DashboardError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Dashboard,
    Impact,
    Performance,
    Insights,
}

impl Page {
    fn parse(arg: Option<&str>) -> Result<Self> {
        match arg.unwrap_or("dashboard") {
            "dashboard" => Ok(Page::Dashboard),
            "impact" => Ok(Page::Impact),
            "performance" => Ok(Page::Performance),
            "insights" => Ok(Page::Insights),
            other => bail!(
                "unknown page {:?} (expected dashboard, impact, performance or insights)",
                other
            ),
        }
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("traffic_flow_prediction={}", logging.level).parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Section-level failures are printed, not returned
fn print_error(error: &DashboardError) -> Result<()> {
    warn!(error = %error, "Page unavailable");
    print_json(&serde_json::json!({ "error": error.to_string() }))
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let page = Page::parse(args.get(1).map(|s| s.as_str()))?;

    // Load configuration
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;
    info!(page = ?page, model = %config.model.path.display(), "Starting Traffic Dashboard");

    // Load the model once; a failure only disables prediction
    let loader = ModelLoader::with_threads(config.model.onnx_threads);
    let (model, load_failure) = loader.load_optional(&config.model.path);
    let invoker = PredictionInvoker::new(model);

    let mut rng = match config.render.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match page {
        Page::Dashboard => {
            let metrics = Arc::new(DashboardMetrics::new());
            let dashboard = Dashboard::new(invoker)
                .with_load_failure(load_failure)
                .with_metrics(metrics.clone());

            let now = chrono::Local::now().naive_local();
            let inputs = config.inputs.to_inputs(now);
            let snapshot = dashboard.render(&inputs, &mut rng);
            print_json(&snapshot)?;
            metrics.print_summary();
        }
        Page::Impact => match invoker.model() {
            Some(model) => match FeatureImpact::from_model(model.as_ref()) {
                Ok(impact) => print_json(&impact)?,
                Err(e) => print_error(&e)?,
            },
            None => print_error(&load_failure.unwrap_or(DashboardError::ModelUnavailable))?,
        },
        Page::Performance => {
            let set = match &config.performance.labels_path {
                Some(path) => load_labeled_samples(path),
                None => {
                    let mut workload_rng = StdRng::seed_from_u64(config.performance.seed);
                    Ok(SyntheticWorkload::generate(
                        &mut workload_rng,
                        config.performance.samples,
                    ))
                }
            };
            match set.and_then(|set| PerformanceReport::evaluate(&invoker, &set)) {
                Ok(report) => print_json(&report)?,
                Err(e) => print_error(&e)?,
            }
        }
        Page::Insights => {
            let insights = HourlyInsights::load(&config.insights.log_path, &mut rng);
            print_json(&insights)?;
        }
    }

    Ok(())
}
