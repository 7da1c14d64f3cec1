//! # netheat
//!
//! Wireless survey benchmark aggregation and heat-field interpolation
//! library.
//!
//! This library provides an **API-first design** where the surrounding
//! application invokes the external measurement tools and handles rendering,
//! and this library turns raw tool output into a continuous, bounded,
//! unit-scaled scalar field per metric:
//!
//! 1. Normalize heterogeneous backend output into canonical metrics
//!    ([`normalize`]).
//! 2. Aggregate repeated trials per survey point with bounded retry on
//!    malformed output ([`bench`]).
//! 3. Interpolate the sparse (position, value) samples into a clamped
//!    raster with corner anchoring ([`field`]) and rescale rate metrics to
//!    a human unit multiple ([`units`]).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use netheat::{BenchSession, FieldRequest, PlanDimensions, SurveyDocument};
//!
//! let mut session = BenchSession::new(modes, iterations, Box::new(|mode| {
//!     // Invoke iperf3 / speedtest and return raw stdout.
//!     Ok(raw_json)
//! }))?;
//! let results = session.run(&station_info)?;
//!
//! let document = SurveyDocument::load("survey.json")?;
//! let outcome = netheat::render::render_fields(
//!     &document,
//!     &FieldRequest::new(PlanDimensions { width: 1000, height: 800 }),
//! )?;
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`metrics`]: Canonical metric registry and metric sets
//! - [`normalize`]: Backend output normalization
//! - [`bench`]: Benchmark aggregation session
//! - [`survey`]: Survey document, points, configuration
//! - [`field`]: Radial-basis raster interpolation
//! - [`units`]: Human-scale unit selection
//! - [`render`]: Per-metric field computation and export

pub mod bench;
pub mod error;
pub mod field;
pub mod metrics;
pub mod normalize;
pub mod render;
pub mod survey;
pub mod units;

// Re-export commonly used types
pub use bench::{BenchMode, BenchSession, MeasureFn, StationInfo};
pub use error::{Error, Result};
pub use field::{FieldSpec, RasterField, Sample, DEFAULT_RESOLUTION};
pub use metrics::{descriptor, Capability, MetricDescriptor, MetricSet, REGISTRY};
pub use normalize::{Backend, RawRecord, SpeedtestVariant};
pub use render::{FieldRequest, MetricField, PlanDimensions, RenderOutcome};
pub use survey::{BenchmarkPoint, Position, SurveyConfig, SurveyDocument, MIN_PLOT_POINTS};
