//! Continuous raster fields from sparse survey samples.
//!
//! Converts one metric's scattered (x, y, z) samples into a bounded,
//! regular raster suitable for rendering:
//!
//! 1. Resolve (vmin, vmax) from the descriptor's fixed bounds or the
//!    pre-anchor sample extrema.
//! 2. Inject four synthetic anchors at the floor plan's pixel corners so
//!    extrapolation far from any measured point settles at the
//!    least-favorable end of the scale (vmax for reverse metrics, vmin
//!    otherwise).
//! 3. Fit a linear-kernel radial-basis interpolant over samples + anchors.
//! 4. Evaluate on a regular grid over `[0, max(W, H)]²`.
//! 5. Clamp every cell into `[vmin, vmax]`; the interpolant itself is not
//!    range-bounded and overshoots beyond the observed extrema.

pub mod rbf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use rbf::RbfInterpolant;

/// Default grid resolution (cells per axis).
pub const DEFAULT_RESOLUTION: usize = 100;

/// One measured sample: floor-plan position plus metric value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Horizontal pixel coordinate.
    pub x: f64,
    /// Vertical pixel coordinate.
    pub y: f64,
    /// Metric value in base units.
    pub z: f64,
}

/// Parameters for computing one metric's field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Floor-plan width in pixels.
    pub plan_width: f64,
    /// Floor-plan height in pixels.
    pub plan_height: f64,
    /// Grid cells per axis; must be at least 2.
    pub resolution: usize,
    /// Fixed bounds from the metric descriptor, if any.
    pub bounds: Option<(f64, f64)>,
    /// Larger value means worse performance; flips which extreme the
    /// boundary anchors adopt.
    pub reverse: bool,
}

impl FieldSpec {
    /// Spec with default resolution and sample-derived bounds.
    #[must_use]
    pub fn new(plan_width: f64, plan_height: f64) -> Self {
        Self {
            plan_width,
            plan_height,
            resolution: DEFAULT_RESOLUTION,
            bounds: None,
            reverse: false,
        }
    }
}

/// A computed raster field with its bounds and optional display unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterField {
    /// Cells per axis; the grid is square.
    pub resolution: usize,
    /// Row-major cell values, `resolution * resolution` entries.
    pub values: Vec<f64>,
    /// Lower bound of the color scale.
    pub vmin: f64,
    /// Upper bound of the color scale.
    pub vmax: f64,
    /// Display unit suffix once scaling has run, e.g. `"MiB"` or `"Mb"`.
    pub unit: Option<String>,
}

impl RasterField {
    /// Cell value at (row, col).
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.resolution + col]
    }
}

/// Synthesize the four corner anchors for a sample set.
///
/// Anchor z is `vmax` for reverse metrics and `vmin` otherwise: corners are
/// typically far from every measured point, and an unconstrained linear
/// extrapolation there is visually misleading.
#[must_use]
pub fn boundary_anchors(spec: &FieldSpec, vmin: f64, vmax: f64) -> [Sample; 4] {
    let z = if spec.reverse { vmax } else { vmin };
    let (w, h) = (spec.plan_width, spec.plan_height);
    [
        Sample { x: 0.0, y: 0.0, z },
        Sample { x: 0.0, y: h, z },
        Sample { x: w, y: h, z },
        Sample { x: w, y: 0.0, z },
    ]
}

/// Resolve the field bounds for a pre-anchor sample set.
///
/// Fixed descriptor bounds win; otherwise the extrema of the measured
/// samples are used.
pub fn resolve_bounds(samples: &[Sample], spec: &FieldSpec) -> Result<(f64, f64)> {
    if let Some(bounds) = spec.bounds {
        return Ok(bounds);
    }
    if samples.is_empty() {
        return Err(Error::Interpolation(
            "cannot derive bounds from an empty sample set".to_string(),
        ));
    }
    let mut vmin = f64::INFINITY;
    let mut vmax = f64::NEG_INFINITY;
    for s in samples {
        vmin = vmin.min(s.z);
        vmax = vmax.max(s.z);
    }
    Ok((vmin, vmax))
}

/// Compute the clamped raster field for one metric.
///
/// `samples` is the pre-anchor measured set; the caller has already
/// enforced the minimum-point precondition for the plot request. At least
/// one measured sample is still required here for a numerically defined
/// fit.
pub fn interpolate(samples: &[Sample], spec: &FieldSpec) -> Result<RasterField> {
    if spec.resolution < 2 {
        return Err(Error::Config(format!(
            "grid resolution must be at least 2, got {}",
            spec.resolution
        )));
    }
    if samples.is_empty() {
        return Err(Error::Interpolation(
            "at least one measured sample is required for a defined fit".to_string(),
        ));
    }
    let (vmin, vmax) = resolve_bounds(samples, spec)?;

    let mut control = samples.to_vec();
    control.extend_from_slice(&boundary_anchors(spec, vmin, vmax));

    let interpolant = RbfInterpolant::fit(&control)?;

    let resolution = spec.resolution;
    let extent = spec.plan_width.max(spec.plan_height);
    let step = extent / (resolution - 1) as f64;

    let mut values = Vec::with_capacity(resolution * resolution);
    for row in 0..resolution {
        let y = row as f64 * step;
        for col in 0..resolution {
            let x = col as f64 * step;
            values.push(interpolant.evaluate(x, y).clamp(vmin, vmax));
        }
    }

    Ok(RasterField {
        resolution,
        values,
        vmin,
        vmax,
        unit: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spread_samples(values: &[f64]) -> Vec<Sample> {
        // Interior positions, away from the anchored corners.
        let positions = [(200.0, 150.0), (700.0, 200.0), (400.0, 600.0), (800.0, 650.0)];
        values
            .iter()
            .zip(positions)
            .map(|(&z, (x, y))| Sample { x, y, z })
            .collect()
    }

    #[test]
    fn test_bounds_from_samples() {
        let spec = FieldSpec::new(1000.0, 800.0);
        let samples = spread_samples(&[1.0e8, 2.0e8, 1.5e8, 3.0e8]);
        let (vmin, vmax) = resolve_bounds(&samples, &spec).unwrap();
        assert_eq!(vmin, 1.0e8);
        assert_eq!(vmax, 3.0e8);
    }

    #[test]
    fn test_fixed_bounds_win() {
        let mut spec = FieldSpec::new(1000.0, 800.0);
        spec.bounds = Some((0.0, 70.0));
        let samples = spread_samples(&[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(resolve_bounds(&samples, &spec).unwrap(), (0.0, 70.0));
    }

    #[test]
    fn test_anchors_use_vmin_for_normal_metrics() {
        let spec = FieldSpec::new(1000.0, 800.0);
        let anchors = boundary_anchors(&spec, 1.0e8, 3.0e8);
        assert!(anchors.iter().all(|a| a.z == 1.0e8));
        let corners: Vec<(f64, f64)> = anchors.iter().map(|a| (a.x, a.y)).collect();
        assert_eq!(
            corners,
            vec![(0.0, 0.0), (0.0, 800.0), (1000.0, 800.0), (1000.0, 0.0)]
        );
    }

    #[test]
    fn test_anchors_use_vmax_for_reverse_metrics() {
        let mut spec = FieldSpec::new(1000.0, 800.0);
        spec.reverse = true;
        let anchors = boundary_anchors(&spec, 1.0, 8.0);
        assert!(anchors.iter().all(|a| a.z == 8.0));
    }

    #[test]
    fn test_raster_within_bounds() {
        // Scenario A: download throughput, no fixed bounds, 1000x800 plan.
        let spec = FieldSpec::new(1000.0, 800.0);
        let samples = spread_samples(&[1.0e8, 2.0e8, 1.5e8, 3.0e8]);
        let field = interpolate(&samples, &spec).unwrap();
        assert_eq!(field.vmin, 1.0e8);
        assert_eq!(field.vmax, 3.0e8);
        assert_eq!(field.values.len(), 100 * 100);
        assert!(field
            .values
            .iter()
            .all(|&v| v >= field.vmin && v <= field.vmax));
    }

    #[test]
    fn test_reverse_raster_within_bounds() {
        // Scenario B: jitter in ms, reverse metric.
        let mut spec = FieldSpec::new(1000.0, 800.0);
        spec.reverse = true;
        let samples = spread_samples(&[1.0, 5.0, 2.0, 8.0]);
        let field = interpolate(&samples, &spec).unwrap();
        assert_eq!((field.vmin, field.vmax), (1.0, 8.0));
        assert!(field.values.iter().all(|&v| (1.0..=8.0).contains(&v)));
    }

    #[test]
    fn test_grid_spans_larger_plan_dimension() {
        let mut spec = FieldSpec::new(400.0, 300.0);
        spec.resolution = 3;
        let samples = spread_samples(&[5.0, 6.0, 7.0, 8.0])
            .into_iter()
            .map(|s| Sample { x: s.x * 0.3, y: s.y * 0.3, z: s.z })
            .collect::<Vec<_>>();
        let field = interpolate(&samples, &spec).unwrap();
        // 3x3 grid over [0, 400]^2; all cells defined and clamped.
        assert_eq!(field.values.len(), 9);
        assert!(field.values.iter().all(|&v| (5.0..=8.0).contains(&v)));
    }

    #[test]
    fn test_degenerate_resolution_rejected() {
        let samples = spread_samples(&[1.0, 2.0, 3.0, 4.0]);
        for resolution in [0, 1] {
            let mut spec = FieldSpec::new(1000.0, 800.0);
            spec.resolution = resolution;
            let err = interpolate(&samples, &spec).unwrap_err();
            assert!(matches!(err, Error::Config(_)));
        }
    }

    #[test]
    fn test_empty_sample_set_fails_fast() {
        let spec = FieldSpec::new(100.0, 100.0);
        let err = interpolate(&[], &spec).unwrap_err();
        assert!(matches!(err, Error::Interpolation(_)));
    }

    #[test]
    fn test_raster_get_indexing() {
        let field = RasterField {
            resolution: 2,
            values: vec![1.0, 2.0, 3.0, 4.0],
            vmin: 1.0,
            vmax: 4.0,
            unit: None,
        };
        assert_eq!(field.get(0, 1), 2.0);
        assert_eq!(field.get(1, 0), 3.0);
    }
}
