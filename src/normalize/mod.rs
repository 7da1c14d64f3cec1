//! Normalization of raw backend output into canonical metrics.
//!
//! Each external measurement tool reports its results in its own JSON
//! schema. This module deserializes one raw record per invocation into a
//! strongly typed variant of [`RawRecord`] and maps it onto a
//! [`MetricSet`](crate::metrics::MetricSet) in base units (bits/s, bytes/s,
//! milliseconds). Normalization is a pure function: a field that is absent
//! or of the wrong type is a [`Error::Parse`], never a silent zero.
//!
//! ## Backend variants
//!
//! Throughput family (iperf3): TCP/UDP crossed with forward (download,
//! reverse-mode stream) and upload. Speed test family: Ookla, Sivel and
//! Librespeed CLIs, each with distinct units on the wire:
//!
//! | Variant    | Bandwidth unit | Latency fields   |
//! |------------|----------------|------------------|
//! | Ookla      | bytes/s        | latency + jitter |
//! | Sivel      | bits/s         | ping only        |
//! | Librespeed | Mbps           | ping + jitter    |

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metrics::MetricSet;

/// Speed test backend variant tag, as persisted in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedtestVariant {
    /// Ookla `speedtest -f json`.
    Ookla,
    /// Sivel `speedtest --json` (speedtest-cli).
    Sivel,
    /// `librespeed-cli --json`.
    Librespeed,
}

impl std::fmt::Display for SpeedtestVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ookla => write!(f, "ookla"),
            Self::Sivel => write!(f, "sivel"),
            Self::Librespeed => write!(f, "librespeed"),
        }
    }
}

/// Closed set of backend variants a raw record can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// iperf3 TCP, reverse mode (server sends, measures download).
    TcpForward,
    /// iperf3 TCP, normal mode (client sends, measures upload).
    TcpUpload,
    /// iperf3 UDP, reverse mode.
    UdpForward,
    /// iperf3 UDP, normal mode.
    UdpUpload,
    /// One of the speed test CLIs.
    Speedtest(SpeedtestVariant),
}

impl Backend {
    /// Name of the external tool behind this variant, for error messages.
    #[must_use]
    pub fn tool(self) -> &'static str {
        match self {
            Self::TcpForward | Self::TcpUpload | Self::UdpForward | Self::UdpUpload => "iperf3",
            Self::Speedtest(SpeedtestVariant::Ookla) => "speedtest-ookla",
            Self::Speedtest(SpeedtestVariant::Sivel) => "speedtest-sivel",
            Self::Speedtest(SpeedtestVariant::Librespeed) => "librespeed-cli",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TcpForward => write!(f, "tcp-forward"),
            Self::TcpUpload => write!(f, "tcp-upload"),
            Self::UdpForward => write!(f, "udp-forward"),
            Self::UdpUpload => write!(f, "udp-upload"),
            Self::Speedtest(v) => write!(f, "speedtest-{v}"),
        }
    }
}

//=============================================================================
// Raw record schemas
//=============================================================================

/// Per-stream summary inside an iperf3 `end` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamSum {
    /// Measured throughput in bits per second.
    pub bits_per_second: f64,
}

/// iperf3 TCP reverse-mode record: throughput is what the receiver saw.
#[derive(Debug, Clone, Deserialize)]
pub struct TcpForwardRecord {
    end: TcpForwardEnd,
}

#[derive(Debug, Clone, Deserialize)]
struct TcpForwardEnd {
    sum_received: StreamSum,
}

/// iperf3 TCP normal-mode record: throughput is what the sender pushed.
#[derive(Debug, Clone, Deserialize)]
pub struct TcpUploadRecord {
    end: TcpUploadEnd,
}

#[derive(Debug, Clone, Deserialize)]
struct TcpUploadEnd {
    sum_sent: StreamSum,
}

/// iperf3 UDP record; the `sum` section carries jitter alongside throughput.
#[derive(Debug, Clone, Deserialize)]
pub struct UdpRecord {
    end: UdpEnd,
}

#[derive(Debug, Clone, Deserialize)]
struct UdpEnd {
    sum: UdpSum,
}

#[derive(Debug, Clone, Deserialize)]
struct UdpSum {
    bits_per_second: f64,
    jitter_ms: f64,
}

/// Ookla speedtest record. Bandwidths are already bytes per second.
#[derive(Debug, Clone, Deserialize)]
pub struct OoklaRecord {
    ping: OoklaPing,
    download: OoklaBandwidth,
    upload: OoklaBandwidth,
}

#[derive(Debug, Clone, Deserialize)]
struct OoklaPing {
    latency: f64,
    jitter: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct OoklaBandwidth {
    bandwidth: f64,
}

/// Sivel speedtest-cli record. Bandwidths are bits per second; the CLI
/// reports no jitter.
#[derive(Debug, Clone, Deserialize)]
pub struct SivelRecord {
    download: f64,
    upload: f64,
    ping: f64,
}

/// librespeed-cli record. Bandwidths are megabits per second.
#[derive(Debug, Clone, Deserialize)]
pub struct LibrespeedRecord {
    download: f64,
    upload: f64,
    ping: f64,
    jitter: f64,
}

/// Error envelope iperf3 emits instead of a result section.
#[derive(Debug, Clone, Deserialize)]
struct ToolError {
    error: String,
}

const MBPS_TO_BYTES: f64 = 125_000.0;

/// One raw output record, tagged by the backend variant that produced it.
#[derive(Debug, Clone)]
pub enum RawRecord {
    /// TCP download (reverse) result.
    TcpForward(TcpForwardRecord),
    /// TCP upload result.
    TcpUpload(TcpUploadRecord),
    /// UDP download (reverse) result.
    UdpForward(UdpRecord),
    /// UDP upload result.
    UdpUpload(UdpRecord),
    /// Ookla speed test result.
    Ookla(OoklaRecord),
    /// Sivel speed test result.
    Sivel(SivelRecord),
    /// Librespeed speed test result.
    Librespeed(LibrespeedRecord),
}

impl RawRecord {
    /// Parse one raw tool output string for the given backend variant.
    ///
    /// Fails with [`Error::Parse`] when an expected field is absent or of
    /// the wrong type, which signals an incompatible tool version or
    /// truncated output. When the tool itself reported an error payload,
    /// that payload becomes the parse reason.
    pub fn parse(backend: Backend, raw: &str) -> Result<Self> {
        let parse = |e: serde_json::Error| parse_error(backend, raw, &e);
        match backend {
            Backend::TcpForward => serde_json::from_str(raw)
                .map(Self::TcpForward)
                .map_err(parse),
            Backend::TcpUpload => serde_json::from_str(raw)
                .map(Self::TcpUpload)
                .map_err(parse),
            Backend::UdpForward => serde_json::from_str(raw)
                .map(Self::UdpForward)
                .map_err(parse),
            Backend::UdpUpload => serde_json::from_str(raw)
                .map(Self::UdpUpload)
                .map_err(parse),
            Backend::Speedtest(SpeedtestVariant::Ookla) => {
                serde_json::from_str(raw).map(Self::Ookla).map_err(parse)
            }
            Backend::Speedtest(SpeedtestVariant::Sivel) => {
                serde_json::from_str(raw).map(Self::Sivel).map_err(parse)
            }
            Backend::Speedtest(SpeedtestVariant::Librespeed) => serde_json::from_str(raw)
                .map(Self::Librespeed)
                .map_err(parse),
        }
    }

    /// Map the record onto canonical metrics in base units.
    ///
    /// Pure; the output is restricted to the metrics this variant can
    /// produce. Bit rates are mirrored into byte rates by dividing by 8.
    #[must_use]
    pub fn normalize(&self) -> MetricSet {
        let mut set = MetricSet::new();
        match self {
            Self::TcpForward(r) => {
                let bits = r.end.sum_received.bits_per_second;
                set.insert("download_bits_tcp", bits);
                set.insert("download_bytes_tcp", bits / 8.0);
            }
            Self::TcpUpload(r) => {
                let bits = r.end.sum_sent.bits_per_second;
                set.insert("upload_bits_tcp", bits);
                set.insert("upload_bytes_tcp", bits / 8.0);
            }
            Self::UdpForward(r) => {
                let bits = r.end.sum.bits_per_second;
                set.insert("download_bits_udp", bits);
                set.insert("download_bytes_udp", bits / 8.0);
                set.insert("download_jitter_udp", r.end.sum.jitter_ms);
            }
            Self::UdpUpload(r) => {
                let bits = r.end.sum.bits_per_second;
                set.insert("upload_bits_udp", bits);
                set.insert("upload_bytes_udp", bits / 8.0);
                set.insert("upload_jitter_udp", r.end.sum.jitter_ms);
            }
            Self::Ookla(r) => {
                set.insert("speedtest_download_bandwidth", r.download.bandwidth);
                set.insert("speedtest_upload_bandwidth", r.upload.bandwidth);
                set.insert("speedtest_latency", r.ping.latency);
                set.insert("speedtest_jitter", r.ping.jitter);
            }
            Self::Sivel(r) => {
                set.insert("speedtest_download_bandwidth", r.download / 8.0);
                set.insert("speedtest_upload_bandwidth", r.upload / 8.0);
                set.insert("speedtest_latency", r.ping);
            }
            Self::Librespeed(r) => {
                set.insert("speedtest_download_bandwidth", r.download * MBPS_TO_BYTES);
                set.insert("speedtest_upload_bandwidth", r.upload * MBPS_TO_BYTES);
                set.insert("speedtest_latency", r.ping);
                set.insert("speedtest_jitter", r.jitter);
            }
        }
        set
    }
}

/// Parse and normalize in one step.
pub fn normalize(backend: Backend, raw: &str) -> Result<MetricSet> {
    Ok(RawRecord::parse(backend, raw)?.normalize())
}

fn parse_error(backend: Backend, raw: &str, cause: &serde_json::Error) -> Error {
    // Prefer the tool's own error payload when it sent one.
    let reason = match serde_json::from_str::<ToolError>(raw) {
        Ok(t) => t.error,
        Err(_) => cause.to_string(),
    };
    Error::Parse {
        backend: backend.to_string(),
        reason,
    }
}
