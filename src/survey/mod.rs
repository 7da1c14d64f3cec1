//! Survey document: configuration, benchmark points, persisted results.
//!
//! The document is a JSON file owned by the surrounding application; this
//! module consumes it, validates its structure, and extracts per-metric
//! sample sets for field computation. Load failures and structural problems
//! are [`Error::Config`] and abort before any measurement or rendering.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::field::Sample;
use crate::metrics::{self, Capability, MetricSet};
use crate::normalize::SpeedtestVariant;

/// Minimum benchmarked points before any plot may be requested.
pub const MIN_PLOT_POINTS: usize = 4;

/// A position in floor-plan pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal pixel coordinate.
    pub x: f64,
    /// Vertical pixel coordinate.
    pub y: f64,
}

/// One survey point on the floor plan.
///
/// `results` stays `None` until a benchmark run completes for the point; a
/// run either finishes and writes the full set or leaves the point untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkPoint {
    /// Where on the floor plan the point sits.
    pub position: Position,
    /// Marks the access point / base station.
    #[serde(default)]
    pub station: bool,
    /// Finalized averaged metrics, or `None` if not yet benchmarked.
    #[serde(default)]
    pub results: Option<MetricSet>,
}

impl BenchmarkPoint {
    /// Create an unbenchmarked point.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Position { x, y },
            station: false,
            results: None,
        }
    }
}

/// Persisted survey configuration (consumed, not owned, by this library).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    /// Ordered selection of metric keys to plot.
    pub graphs: Vec<String>,
    /// Enabled capability tags.
    pub modes: Vec<Capability>,
    /// External tool identifiers the survey was captured with.
    #[serde(default)]
    pub backends: Vec<String>,
    /// Trials per point; must be positive.
    pub benchmark_iterations: u32,
    /// Speed test backend variant, when the speedtest capability is enabled.
    #[serde(default)]
    pub speedtest: Option<SpeedtestVariant>,
    /// Network the survey belongs to.
    #[serde(default)]
    pub ssid: Option<String>,
}

impl SurveyConfig {
    /// Structural validation of the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.benchmark_iterations == 0 {
            return Err(Error::Config(
                "benchmark_iterations must be a positive integer".to_string(),
            ));
        }
        if self.graphs.is_empty() {
            return Err(Error::Config("no graphs selected".to_string()));
        }
        for key in &self.graphs {
            let descriptor = metrics::descriptor(key)
                .ok_or_else(|| Error::Config(format!("unknown graph key: {key}")))?;
            for req in descriptor.requirements {
                if !self.modes.contains(req) {
                    return Err(Error::Config(format!(
                        "graph {key} requires mode {req}, which is not enabled"
                    )));
                }
            }
        }
        if self.modes.contains(&Capability::Speedtest) && self.speedtest.is_none() {
            return Err(Error::Config(
                "speedtest mode enabled but no speedtest backend selected".to_string(),
            ));
        }
        Ok(())
    }
}

/// The persisted survey: configuration plus per-point results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyDocument {
    /// Survey configuration.
    pub configuration: SurveyConfig,
    /// Benchmark points keyed by point identifier.
    pub results: BTreeMap<String, BenchmarkPoint>,
    /// When the document was last written.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl SurveyDocument {
    /// Create an empty document for a configuration.
    #[must_use]
    pub fn new(configuration: SurveyConfig) -> Self {
        Self {
            configuration,
            results: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Load and validate a survey document from disk.
    ///
    /// A missing, unreadable, or structurally invalid file is an
    /// [`Error::Config`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let doc: Self = serde_json::from_str(&data)
            .map_err(|e| Error::Config(format!("invalid survey document {}: {e}", path.display())))?;
        doc.configuration.validate()?;
        Ok(doc)
    }

    /// Write the document to disk with a fresh timestamp.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.timestamp = Utc::now();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Points that have completed benchmark results.
    pub fn benchmarked(&self) -> impl Iterator<Item = (&str, &BenchmarkPoint)> {
        self.results
            .iter()
            .filter(|(_, p)| p.results.is_some())
            .map(|(id, p)| (id.as_str(), p))
    }

    /// Number of points with completed results.
    #[must_use]
    pub fn benchmarked_count(&self) -> usize {
        self.benchmarked().count()
    }

    /// Enforce the minimum point count for a plot request.
    pub fn check_plottable(&self) -> Result<()> {
        let actual = self.benchmarked_count();
        if actual < MIN_PLOT_POINTS {
            return Err(Error::TooFewPoints {
                needed: MIN_PLOT_POINTS,
                actual,
            });
        }
        Ok(())
    }

    /// Extract the (x, y, z) sample set for one metric across all
    /// benchmarked points.
    ///
    /// Every benchmarked point must carry the metric; a gap is an
    /// [`Error::MissingMetric`], fatal to this metric's plot only.
    pub fn sample_set(&self, metric: &str) -> Result<Vec<Sample>> {
        let mut samples = Vec::new();
        for (id, point) in &self.results {
            let Some(results) = &point.results else {
                continue;
            };
            let z = results.get(metric).ok_or_else(|| Error::MissingMetric {
                metric: metric.to_string(),
                point: id.to_string(),
            })?;
            samples.push(Sample {
                x: point.position.x,
                y: point.position.y,
                z,
            });
        }
        Ok(samples)
    }

    /// Positions of all benchmarked points.
    #[must_use]
    pub fn point_positions(&self) -> Vec<Position> {
        self.benchmarked().map(|(_, p)| p.position).collect()
    }

    /// Positions of points marked as the base station.
    #[must_use]
    pub fn station_positions(&self) -> Vec<Position> {
        self.results
            .values()
            .filter(|p| p.station)
            .map(|p| p.position)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SurveyConfig {
        SurveyConfig {
            graphs: vec!["signal_quality".to_string(), "download_bits_tcp".to_string()],
            modes: vec![Capability::Base, Capability::TcpReverse],
            backends: vec!["iperf3".to_string()],
            benchmark_iterations: 3,
            speedtest: None,
            ssid: Some("lab".to_string()),
        }
    }

    fn point_with(metric_values: &[(&str, f64)], x: f64, y: f64) -> BenchmarkPoint {
        let mut point = BenchmarkPoint::new(x, y);
        let mut set = MetricSet::new();
        for (name, value) in metric_values {
            set.insert(*name, *value);
        }
        point.results = Some(set);
        point
    }

    #[test]
    fn test_config_validates() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_unknown_graph_key_rejected() {
        let mut cfg = config();
        cfg.graphs.push("warp_factor".to_string());
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_graph_without_mode_rejected() {
        let mut cfg = config();
        cfg.graphs.push("upload_bits_udp".to_string());
        let err = cfg.validate().unwrap_err();
        match err {
            Error::Config(msg) => assert!(msg.contains("udp")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_speedtest_mode_needs_variant() {
        let mut cfg = config();
        cfg.modes.push(Capability::Speedtest);
        assert!(cfg.validate().is_err());
        cfg.speedtest = Some(SpeedtestVariant::Librespeed);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let mut cfg = config();
        cfg.benchmark_iterations = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_sample_set_extraction() {
        let mut doc = SurveyDocument::new(config());
        doc.results
            .insert("1".to_string(), point_with(&[("signal_quality", 50.0)], 10.0, 20.0));
        doc.results
            .insert("2".to_string(), point_with(&[("signal_quality", 60.0)], 30.0, 40.0));
        doc.results.insert("3".to_string(), BenchmarkPoint::new(1.0, 1.0));

        let samples = doc.sample_set("signal_quality").unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].z, 50.0);
        assert_eq!(doc.benchmarked_count(), 2);
    }

    #[test]
    fn test_missing_metric_names_the_point() {
        let mut doc = SurveyDocument::new(config());
        doc.results
            .insert("a".to_string(), point_with(&[("signal_quality", 50.0)], 0.0, 0.0));
        doc.results
            .insert("b".to_string(), point_with(&[("signal_strength", -60.0)], 5.0, 5.0));

        let err = doc.sample_set("signal_quality").unwrap_err();
        match err {
            Error::MissingMetric { metric, point } => {
                assert_eq!(metric, "signal_quality");
                assert_eq!(point, "b");
            }
            other => panic!("expected missing metric, got {other:?}"),
        }
    }

    #[test]
    fn test_check_plottable_minimum() {
        let mut doc = SurveyDocument::new(config());
        for i in 0..3 {
            doc.results.insert(
                i.to_string(),
                point_with(&[("signal_quality", 40.0)], f64::from(i), 0.0),
            );
        }
        let err = doc.check_plottable().unwrap_err();
        assert!(matches!(err, Error::TooFewPoints { needed: 4, actual: 3 }));

        doc.results
            .insert("3".to_string(), point_with(&[("signal_quality", 40.0)], 9.0, 9.0));
        assert!(doc.check_plottable().is_ok());
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = SurveyDocument::load("/nonexistent/survey.json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.json");

        let mut doc = SurveyDocument::new(config());
        doc.results
            .insert("1".to_string(), point_with(&[("signal_quality", 42.5)], 10.0, 20.0));
        doc.results.insert("2".to_string(), BenchmarkPoint::new(3.0, 4.0));
        doc.save(&path).unwrap();

        let loaded = SurveyDocument::load(&path).unwrap();
        assert_eq!(loaded.results.len(), 2);
        assert_eq!(loaded.configuration.graphs, doc.configuration.graphs);
        let point = &loaded.results["1"];
        assert_eq!(point.results.as_ref().unwrap().get("signal_quality"), Some(42.5));
        assert!(loaded.results["2"].results.is_none());
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = SurveyDocument::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
