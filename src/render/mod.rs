//! Per-metric field computation for an entire survey.
//!
//! Walks the configured graph selection, computes one bounded, unit-scaled
//! raster per metric, and packages everything an external renderer needs
//! (values, bounds, unit, point positions, plot title). Color mapping,
//! contour drawing and image export stay outside this library.
//!
//! Field computation is pure and per-metric independent, so metrics run in
//! parallel. Per-metric failures (a point missing the metric, too few
//! points for that metric) are collected rather than aborting the batch;
//! only configuration-level problems are fatal.

use std::path::Path;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::field::{self, FieldSpec, RasterField, DEFAULT_RESOLUTION};
use crate::metrics;
use crate::survey::{Position, SurveyDocument};
use crate::units;

/// Floor-plan pixel dimensions, as reported by the plan collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlanDimensions {
    /// Plan width in pixels.
    pub width: u32,
    /// Plan height in pixels.
    pub height: u32,
}

/// A request to compute fields for every configured graph.
#[derive(Debug, Clone, Copy)]
pub struct FieldRequest {
    /// Floor-plan pixel dimensions.
    pub plan: PlanDimensions,
    /// Grid cells per axis.
    pub resolution: usize,
}

impl FieldRequest {
    /// Request with the default grid resolution.
    #[must_use]
    pub fn new(plan: PlanDimensions) -> Self {
        Self {
            plan,
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

/// One computed metric field, ready for an external renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricField {
    /// Canonical metric name.
    pub metric: String,
    /// Plot title with the resolved unit substituted in.
    pub title: String,
    /// The bounded (and, for rate metrics, unit-scaled) raster.
    pub raster: RasterField,
    /// Measured point positions, for overlay markers.
    pub points: Vec<Position>,
    /// Base-station positions, for overlay markers.
    pub stations: Vec<Position>,
    /// When the field was computed.
    pub timestamp: DateTime<Utc>,
}

impl MetricField {
    /// Write the field as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Write the raster grid as CSV, one row per grid row.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;
        let resolution = self.raster.resolution;
        for row in 0..resolution {
            let record: Vec<String> = (0..resolution)
                .map(|col| format!("{:.6}", self.raster.get(row, col)))
                .collect();
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Outcome of a batch render: computed fields plus per-metric failures.
#[derive(Debug)]
pub struct RenderOutcome {
    /// Successfully computed fields, in configuration order.
    pub fields: Vec<MetricField>,
    /// Metrics that failed, with the error that sank them.
    pub failures: Vec<(String, Error)>,
}

/// Compute a field for every metric in `configuration.graphs`.
///
/// Fails outright on configuration problems or when fewer than the minimum
/// number of benchmarked points exist; individual metric failures are
/// reported in the outcome instead.
pub fn render_fields(document: &SurveyDocument, request: &FieldRequest) -> Result<RenderOutcome> {
    document.configuration.validate()?;
    document.check_plottable()?;

    let results: Vec<(String, Result<MetricField>)> = document
        .configuration
        .graphs
        .par_iter()
        .map(|key| (key.clone(), render_one(document, request, key)))
        .collect();

    let mut fields = Vec::new();
    let mut failures = Vec::new();
    for (key, result) in results {
        match result {
            Ok(field) => fields.push(field),
            Err(err) => failures.push((key, err)),
        }
    }
    Ok(RenderOutcome { fields, failures })
}

/// Compute the field for a single metric.
pub fn render_one(
    document: &SurveyDocument,
    request: &FieldRequest,
    metric: &str,
) -> Result<MetricField> {
    let descriptor = metrics::descriptor(metric)
        .ok_or_else(|| Error::Config(format!("unknown graph key: {metric}")))?;

    let samples = document.sample_set(metric)?;

    let spec = FieldSpec {
        plan_width: f64::from(request.plan.width),
        plan_height: f64::from(request.plan.height),
        resolution: request.resolution,
        bounds: descriptor.bounds,
        reverse: descriptor.reverse,
    };

    let raster = field::interpolate(&samples, &spec)?;

    let raster = if descriptor.conversion {
        // Scale selection looks at the control-point values, anchors
        // included, exactly as the field was fit.
        let (vmin, vmax) = (raster.vmin, raster.vmax);
        let anchor_z = if descriptor.reverse { vmax } else { vmin };
        let mut control_values: Vec<f64> = samples.iter().map(|s| s.z).collect();
        control_values.extend(std::iter::repeat_n(anchor_z, 4));
        units::scale_field(&raster, &control_values, descriptor.bits)
    } else {
        raster
    };

    Ok(MetricField {
        metric: metric.to_string(),
        title: descriptor.title(raster.unit.as_deref()),
        raster,
        points: document.point_positions(),
        stations: document.station_positions(),
        timestamp: Utc::now(),
    })
}
