//! Hourly traffic insights from the prediction log.
//!
//! A missing or unreadable log never fails the page: the loader falls back
//! to a simulated daily pattern and records which source was used.

use crate::error::{DashboardError, DashboardResult};
use chrono::{DateTime, NaiveDateTime, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Floor applied to the simulated pattern.
const SIMULATED_MIN_VOLUME: f64 = 20.0;

/// One row of the prediction log
#[derive(Debug, Deserialize)]
struct LogRow {
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Predicted Volume")]
    predicted_volume: f64,
}

/// Where the hourly series came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum InsightSource {
    Log { path: String },
    Simulated,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyVolume {
    pub hour: u8,
    pub volume: f64,
}

/// Average predicted volume per hour of day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyInsights {
    pub source: InsightSource,
    pub hourly: Vec<HourlyVolume>,
}

impl HourlyInsights {
    /// Read the log at `path`, falling back to [`HourlyInsights::simulated`]
    /// on any failure.
    pub fn load<P: AsRef<Path>, R: Rng + ?Sized>(path: P, rng: &mut R) -> Self {
        let path = path.as_ref();
        match Self::from_log(path) {
            Ok(insights) => {
                info!(
                    path = %path.display(),
                    hours = insights.hourly.len(),
                    "Hourly insights loaded from log"
                );
                insights
            }
            Err(e) => {
                debug!(error = %e, "Falling back to simulated hourly pattern");
                Self::simulated(rng)
            }
        }
    }

    /// Group the log by hour of day and average the predicted volume.
    pub fn from_log(path: &Path) -> DashboardResult<Self> {
        let failure = |reason: String| DashboardError::LogReadFailure {
            path: path.to_path_buf(),
            reason,
        };

        let mut reader = csv::Reader::from_path(path).map_err(|e| failure(e.to_string()))?;

        let mut sums = [0.0f64; 24];
        let mut counts = [0u32; 24];
        for row in reader.deserialize::<LogRow>() {
            let row = row.map_err(|e| failure(e.to_string()))?;
            let hour = parse_timestamp(&row.timestamp)
                .ok_or_else(|| failure(format!("invalid timestamp {:?}", row.timestamp)))?
                .hour() as usize;
            if !row.predicted_volume.is_finite() {
                return Err(failure(format!("invalid volume {}", row.predicted_volume)));
            }
            sums[hour] += row.predicted_volume;
            counts[hour] += 1;
        }

        let hourly: Vec<HourlyVolume> = (0..24)
            .filter(|&h| counts[h] > 0)
            .map(|h| HourlyVolume {
                hour: h as u8,
                volume: sums[h] / counts[h] as f64,
            })
            .collect();

        if hourly.is_empty() {
            return Err(failure("log contains no records".to_string()));
        }

        Ok(Self {
            source: InsightSource::Log {
                path: path.display().to_string(),
            },
            hourly,
        })
    }

    /// Sinusoidal daily pattern with integer noise in [-10, 10).
    pub fn simulated<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let hourly = (0..24u8)
            .map(|hour| {
                let h = hour as f64;
                let base = 60.0 + 60.0 * (((h - 7.0) / 3.0).sin() + ((h - 17.0) / 3.0).sin());
                let noise = rng.gen_range(-10..10) as f64;
                HourlyVolume {
                    hour,
                    volume: (base + noise).max(SIMULATED_MIN_VOLUME),
                }
            })
            .collect();

        Self {
            source: InsightSource::Simulated,
            hourly,
        }
    }

    /// Busiest hour in the series.
    pub fn peak(&self) -> Option<HourlyVolume> {
        self.hourly
            .iter()
            .copied()
            .max_by(|a, b| a.volume.total_cmp(&b.volume))
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    fn write_log(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_hourly_means_from_log() {
        let log = write_log(
            "Timestamp,Predicted Volume\n\
             2024-05-15 08:05:00,100\n\
             2024-05-15 08:45:00,200\n\
             2024-05-16T17:30:00,240\n\
             2024-05-16T09:00:00+02:00,50\n",
        );

        let insights = HourlyInsights::from_log(log.path()).unwrap();
        assert!(matches!(insights.source, InsightSource::Log { .. }));
        assert_eq!(
            insights.hourly,
            vec![
                HourlyVolume { hour: 8, volume: 150.0 },
                HourlyVolume { hour: 9, volume: 50.0 },
                HourlyVolume { hour: 17, volume: 240.0 },
            ]
        );
        assert_eq!(insights.peak().unwrap().hour, 17);
    }

    #[test]
    fn test_missing_log_falls_back() {
        let mut rng = StdRng::seed_from_u64(0);
        let insights = HourlyInsights::load("no/such/logs.csv", &mut rng);

        assert_eq!(insights.source, InsightSource::Simulated);
        assert_eq!(insights.hourly.len(), 24);
    }

    #[test]
    fn test_malformed_log_falls_back() {
        let log = write_log("Timestamp,Predicted Volume\nyesterday,abc\n");
        let mut rng = StdRng::seed_from_u64(0);

        assert!(matches!(
            HourlyInsights::from_log(log.path()),
            Err(DashboardError::LogReadFailure { .. })
        ));
        let insights = HourlyInsights::load(log.path(), &mut rng);
        assert_eq!(insights.source, InsightSource::Simulated);
    }

    #[test]
    fn test_non_finite_volume_falls_back() {
        let log = write_log(
            "Timestamp,Predicted Volume\n2024-05-15 08:00:00,120.0\n2024-05-15 08:15:00,NaN\n",
        );
        let mut rng = StdRng::seed_from_u64(0);

        assert!(matches!(
            HourlyInsights::from_log(log.path()),
            Err(DashboardError::LogReadFailure { .. })
        ));
        let insights = HourlyInsights::load(log.path(), &mut rng);
        assert_eq!(insights.source, InsightSource::Simulated);

        let log = write_log("Timestamp,Predicted Volume\n2024-05-15 08:00:00,inf\n");
        assert!(HourlyInsights::from_log(log.path()).is_err());
    }

    #[test]
    fn test_empty_log_falls_back() {
        let log = write_log("Timestamp,Predicted Volume\n");
        let insights = HourlyInsights::load(log.path(), &mut StdRng::seed_from_u64(0));
        assert_eq!(insights.source, InsightSource::Simulated);
    }

    #[test]
    fn test_simulated_pattern_is_floored() {
        let insights = HourlyInsights::simulated(&mut StdRng::seed_from_u64(5));
        let hours: Vec<u8> = insights.hourly.iter().map(|h| h.hour).collect();

        assert_eq!(hours, (0..24).collect::<Vec<u8>>());
        assert!(insights.hourly.iter().all(|h| h.volume >= 20.0));
        // base is ~71.4 at 07:00 and ~48.6 at 17:00; noise is at most 10
        let at = |hour: usize| insights.hourly[hour].volume;
        assert!(at(7) > at(17));
    }
}
