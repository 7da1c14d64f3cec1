//! Benchmark aggregation with callback-based measurement interface.
//!
//! This module provides [`BenchSession`], which drives repeated measurement
//! trials for one survey point. The external crate provides a measurement
//! callback (process invocation stays outside this library), and the session
//! handles ordering, bounded retry on malformed output, and averaging.
//!
//! Measurements execute strictly sequentially: one invocation in flight at a
//! time, because concurrent runs contend for the same wireless medium and
//! corrupt both results.
//!
//! ## Example
//!
//! ```rust,ignore
//! use netheat::bench::{BenchMode, BenchSession, StationInfo};
//!
//! let mut session = BenchSession::new(modes, iterations, Box::new(|mode| {
//!     // Invoke iperf3 / speedtest here and return raw stdout.
//!     Ok(raw_json)
//! }))?;
//!
//! let results = session.run(&station)?;
//! ```

use crate::error::{Error, Result};
use crate::metrics::{Capability, MetricSet};
use crate::normalize::{self, Backend, SpeedtestVariant};

/// Attempts per trial: the first invocation plus two retries.
const MAX_ATTEMPTS: u32 = 3;

/// One measurement mode the session can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchMode {
    /// TCP download (iperf3 reverse).
    TcpDownload,
    /// TCP upload.
    TcpUpload,
    /// UDP download (iperf3 reverse).
    UdpDownload,
    /// UDP upload.
    UdpUpload,
    /// Internet speed test through the configured backend.
    Speedtest(SpeedtestVariant),
}

impl BenchMode {
    /// Backend variant whose output schema this mode produces.
    #[must_use]
    pub fn backend(self) -> Backend {
        match self {
            Self::TcpDownload => Backend::TcpForward,
            Self::TcpUpload => Backend::TcpUpload,
            Self::UdpDownload => Backend::UdpForward,
            Self::UdpUpload => Backend::UdpUpload,
            Self::Speedtest(v) => Backend::Speedtest(v),
        }
    }
}

impl std::fmt::Display for BenchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.backend())
    }
}

/// Derive the active mode list from enabled capability tags.
///
/// The order is fixed and deterministic regardless of the order the tags
/// appear in the configuration: TCP download, TCP upload, UDP download,
/// UDP upload, then the speed test.
#[must_use]
pub fn modes_for(tags: &[Capability], speedtest: Option<SpeedtestVariant>) -> Vec<BenchMode> {
    let mut modes = Vec::new();
    if tags.contains(&Capability::TcpReverse) {
        modes.push(BenchMode::TcpDownload);
    }
    if tags.contains(&Capability::Tcp) {
        modes.push(BenchMode::TcpUpload);
    }
    if tags.contains(&Capability::UdpReverse) {
        modes.push(BenchMode::UdpDownload);
    }
    if tags.contains(&Capability::Udp) {
        modes.push(BenchMode::UdpUpload);
    }
    if tags.contains(&Capability::Speedtest)
        && let Some(v) = speedtest
    {
        modes.push(BenchMode::Speedtest(v));
    }
    modes
}

/// Measurement callback type.
///
/// Takes the mode to run, returns the tool's raw output. Invocation failures
/// (timeout, tool unavailable) surface as [`Error::External`]; the session
/// never retries those.
pub type MeasureFn = Box<dyn FnMut(BenchMode) -> Result<String> + Send>;

/// Progress callback, called with the monotonically increasing count of
/// completed trials.
pub type ProgressFn = Box<dyn FnMut(u64) + Send>;

/// Instantaneous wireless status at the survey point, captured once per
/// point rather than per iteration.
#[derive(Debug, Clone, Copy)]
pub struct StationInfo {
    /// Average signal level in dBm, as reported by the interface.
    pub signal_strength: f64,
    /// Channel number.
    pub channel: u32,
    /// Channel center frequency in MHz.
    pub channel_frequency: u32,
}

impl StationInfo {
    /// Point-local metrics derived from the interface status.
    ///
    /// Quality maps dBm onto a 0..70 scale (dBm + 110), and the percent
    /// variant stretches that onto 0..100.
    #[must_use]
    pub fn metrics(&self) -> MetricSet {
        let mut set = MetricSet::new();
        set.insert("signal_strength", self.signal_strength);
        set.insert("signal_quality", self.signal_strength + 110.0);
        set.insert(
            "signal_quality_percent",
            (self.signal_strength + 110.0) * (10.0 / 7.0),
        );
        set.insert("channel", f64::from(self.channel));
        set.insert("channel_frequency", f64::from(self.channel_frequency));
        set
    }
}

/// Aggregation session for one survey point.
///
/// Runs `iterations` passes over the active modes, feeding each raw output
/// through normalization, and averages every canonical metric over the
/// iterations. No accumulator is readable before aggregation completes; the
/// only observable state mid-run is [`BenchSession::trials_completed`].
pub struct BenchSession {
    modes: Vec<BenchMode>,
    iterations: u32,
    measure: MeasureFn,
    progress: Option<ProgressFn>,
    trials_completed: u64,
}

impl BenchSession {
    /// Create a session over the given modes.
    ///
    /// Fails with [`Error::Config`] when the mode list is empty or the
    /// iteration count is zero.
    pub fn new(modes: Vec<BenchMode>, iterations: u32, measure: MeasureFn) -> Result<Self> {
        if modes.is_empty() {
            return Err(Error::Config(
                "no measurement modes enabled; nothing to benchmark".to_string(),
            ));
        }
        if iterations == 0 {
            return Err(Error::Config(
                "benchmark_iterations must be a positive integer".to_string(),
            ));
        }
        Ok(Self {
            modes,
            iterations,
            measure,
            progress: None,
            trials_completed: 0,
        })
    }

    /// Register a progress callback, invoked after every completed trial.
    pub fn on_progress(&mut self, progress: ProgressFn) -> &mut Self {
        self.progress = Some(progress);
        self
    }

    /// Number of trials completed so far; monotonically increasing.
    #[must_use]
    pub fn trials_completed(&self) -> u64 {
        self.trials_completed
    }

    /// Total trials a full run performs.
    #[must_use]
    pub fn total_trials(&self) -> u64 {
        u64::from(self.iterations) * self.modes.len() as u64
    }

    /// Run the full benchmark for one point and return its finalized,
    /// averaged metric set, merged with the point-local station metrics.
    ///
    /// Any [`Error::External`] aborts the run for this point; the point's
    /// stored results are only ever written by a completed run.
    pub fn run(&mut self, station: &StationInfo) -> Result<MetricSet> {
        let mut acc = MetricSet::new();

        for _ in 0..self.iterations {
            for i in 0..self.modes.len() {
                let mode = self.modes[i];
                let trial = self.measure_once(mode)?;
                acc.accumulate(&trial);
                self.trials_completed += 1;
                if let Some(progress) = self.progress.as_mut() {
                    progress(self.trials_completed);
                }
            }
        }

        let n = f64::from(self.iterations);
        let mut averaged: MetricSet = acc.iter().map(|(k, v)| (k.to_string(), v / n)).collect();
        averaged.merge(&station.metrics());
        Ok(averaged)
    }

    /// One trial: invoke the tool and normalize its output, re-invoking on
    /// malformed output up to the retry bound.
    ///
    /// A retry always re-runs the measurement; the failed output is never
    /// reused. After the bound, the persistent parse failure escalates to
    /// [`Error::External`] carrying the last parse payload.
    fn measure_once(&mut self, mode: BenchMode) -> Result<MetricSet> {
        let backend = mode.backend();
        let mut last_reason = String::new();

        for _ in 0..MAX_ATTEMPTS {
            let raw = (self.measure)(mode)?;
            match normalize::normalize(backend, &raw) {
                Ok(set) => return Ok(set),
                Err(Error::Parse { reason, .. }) => last_reason = reason,
                Err(other) => return Err(other),
            }
        }

        Err(Error::External {
            tool: backend.tool().to_string(),
            message: last_reason,
        })
    }
}
