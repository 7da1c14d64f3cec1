//! Canonical metric descriptors and metric sets.
//!
//! Every measurement flowing through the pipeline is keyed by a canonical
//! metric name with an assumed base unit (bits/s, bytes/s, milliseconds,
//! dBm, percentage). The registry is a static, immutable table built into
//! the binary; it is never mutated at runtime.
//!
//! ## Key Types
//!
//! - [`MetricDescriptor`]: static per-metric record (bounds, flags, tags)
//! - [`Capability`]: backend capability tag a metric requires
//! - [`MetricSet`]: mapping from metric name to value in base units

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Backend capability tag required to produce a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    /// Instantaneous wireless status (signal, channel).
    #[serde(rename = "base")]
    Base,
    /// Throughput upload over TCP.
    #[serde(rename = "tcp")]
    Tcp,
    /// Throughput download over TCP (reverse direction).
    #[serde(rename = "tcp_r")]
    TcpReverse,
    /// Throughput upload over UDP.
    #[serde(rename = "udp")]
    Udp,
    /// Throughput download over UDP (reverse direction).
    #[serde(rename = "udp_r")]
    UdpReverse,
    /// Internet speed test via an external backend.
    #[serde(rename = "speedtest")]
    Speedtest,
}

impl Capability {
    /// Configuration-file spelling of the tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Tcp => "tcp",
            Self::TcpReverse => "tcp_r",
            Self::Udp => "udp",
            Self::UdpReverse => "udp_r",
            Self::Speedtest => "speedtest",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static, immutable description of one canonical metric.
#[derive(Debug, Clone, Copy)]
pub struct MetricDescriptor {
    /// Canonical metric name, used as the key everywhere.
    pub name: &'static str,
    /// Human description. For metrics with `conversion` set, `{}` marks
    /// where the resolved unit suffix goes.
    pub description: &'static str,
    /// Capability tags the active configuration must enable.
    pub requirements: &'static [Capability],
    /// Fixed plot bounds; `None` means bounds come from the samples.
    pub bounds: Option<(f64, f64)>,
    /// Value is a byte/bit rate that gets rescaled to a human unit multiple.
    pub conversion: bool,
    /// Larger numeric value means worse performance (latency, jitter).
    pub reverse: bool,
    /// Metric counts bits rather than bytes; selects bit-style unit labels.
    pub bits: bool,
}

impl MetricDescriptor {
    /// Description with the unit suffix substituted in, for plot titles.
    #[must_use]
    pub fn title(&self, unit: Option<&str>) -> String {
        match unit {
            Some(u) if self.conversion => self.description.replacen("{}", u, 1),
            _ => self.description.to_string(),
        }
    }
}

const fn throughput(
    name: &'static str,
    description: &'static str,
    requirements: &'static [Capability],
    bits: bool,
) -> MetricDescriptor {
    MetricDescriptor {
        name,
        description,
        requirements,
        bounds: None,
        conversion: true,
        reverse: false,
        bits,
    }
}

/// Ordered registry of every canonical metric, built once at compile time.
///
/// Iteration order is the presentation order; it never changes at runtime.
pub const REGISTRY: &[MetricDescriptor] = &[
    MetricDescriptor {
        name: "signal_quality",
        description: "Wi-Fi Signal Quality (out of 70)",
        requirements: &[Capability::Base],
        bounds: Some((0.0, 70.0)),
        conversion: false,
        reverse: false,
        bits: false,
    },
    MetricDescriptor {
        name: "signal_quality_percent",
        description: "Wi-Fi Signal Quality (in percentage)",
        requirements: &[Capability::Base],
        bounds: Some((0.0, 100.0)),
        conversion: false,
        reverse: false,
        bits: false,
    },
    MetricDescriptor {
        name: "signal_strength",
        description: "Wi-Fi Signal Strength (in dBm)",
        requirements: &[Capability::Base],
        bounds: Some((-100.0, 0.0)),
        conversion: false,
        reverse: false,
        bits: false,
    },
    throughput(
        "download_bits_tcp",
        "Wi-Fi Download [TCP] (in {})",
        &[Capability::TcpReverse],
        true,
    ),
    throughput(
        "download_bytes_tcp",
        "Wi-Fi Download [TCP] (in {})",
        &[Capability::TcpReverse],
        false,
    ),
    throughput(
        "upload_bits_tcp",
        "Wi-Fi Upload [TCP] (in {})",
        &[Capability::Tcp],
        true,
    ),
    throughput(
        "upload_bytes_tcp",
        "Wi-Fi Upload [TCP] (in {})",
        &[Capability::Tcp],
        false,
    ),
    throughput(
        "download_bits_udp",
        "Wi-Fi Download [UDP] (in {})",
        &[Capability::UdpReverse],
        true,
    ),
    throughput(
        "download_bytes_udp",
        "Wi-Fi Download [UDP] (in {})",
        &[Capability::UdpReverse],
        false,
    ),
    throughput(
        "upload_bits_udp",
        "Wi-Fi Upload [UDP] (in {})",
        &[Capability::Udp],
        true,
    ),
    throughput(
        "upload_bytes_udp",
        "Wi-Fi Upload [UDP] (in {})",
        &[Capability::Udp],
        false,
    ),
    MetricDescriptor {
        name: "download_jitter_udp",
        description: "Wi-Fi Download Jitter (in ms)",
        requirements: &[Capability::UdpReverse],
        bounds: None,
        conversion: false,
        reverse: true,
        bits: false,
    },
    MetricDescriptor {
        name: "upload_jitter_udp",
        description: "Wi-Fi Upload Jitter (in ms)",
        requirements: &[Capability::Udp],
        bounds: None,
        conversion: false,
        reverse: true,
        bits: false,
    },
    throughput(
        "speedtest_download_bandwidth",
        "Speedtest Download Bandwidth (in {})",
        &[Capability::Speedtest],
        false,
    ),
    throughput(
        "speedtest_upload_bandwidth",
        "Speedtest Upload Bandwidth (in {})",
        &[Capability::Speedtest],
        false,
    ),
    MetricDescriptor {
        name: "speedtest_latency",
        description: "Speedtest Latency (in ms)",
        requirements: &[Capability::Speedtest],
        bounds: None,
        conversion: false,
        reverse: true,
        bits: false,
    },
    MetricDescriptor {
        name: "speedtest_jitter",
        description: "Speedtest Jitter (in ms)",
        requirements: &[Capability::Speedtest],
        bounds: None,
        conversion: false,
        reverse: true,
        bits: false,
    },
];

/// Look up a metric descriptor by canonical name.
#[must_use]
pub fn descriptor(name: &str) -> Option<&'static MetricDescriptor> {
    REGISTRY.iter().find(|d| d.name == name)
}

/// A set of canonical metric values, keyed by metric name.
///
/// Values are always in backend-independent base units. Produced fresh per
/// trial by normalization and per point by aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet(pub BTreeMap<String, f64>);

impl MetricSet {
    /// Create an empty metric set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a metric value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Insert or replace a metric value.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    /// Whether the set contains the named metric.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of metrics in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over (name, value) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Add every value from `other` into the matching entries of `self`,
    /// creating zero-initialized entries as needed.
    pub fn accumulate(&mut self, other: &MetricSet) {
        for (name, value) in &other.0 {
            *self.0.entry(name.clone()).or_insert(0.0) += value;
        }
    }

    /// Merge `other` into `self`, replacing any overlapping entries.
    pub fn merge(&mut self, other: &MetricSet) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), *value);
        }
    }
}

impl FromIterator<(String, f64)> for MetricSet {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let d = descriptor("download_bits_tcp").unwrap();
        assert!(d.conversion);
        assert!(d.bits);
        assert!(!d.reverse);
        assert_eq!(d.requirements, &[Capability::TcpReverse]);
        assert!(descriptor("nonexistent_metric").is_none());
    }

    #[test]
    fn test_registry_names_unique() {
        for (i, d) in REGISTRY.iter().enumerate() {
            assert!(
                REGISTRY[i + 1..].iter().all(|o| o.name != d.name),
                "duplicate metric name {}",
                d.name
            );
        }
    }

    #[test]
    fn test_reverse_metrics() {
        for name in ["download_jitter_udp", "upload_jitter_udp", "speedtest_latency"] {
            assert!(descriptor(name).unwrap().reverse, "{name} should be reverse");
        }
        assert!(!descriptor("signal_quality").unwrap().reverse);
    }

    #[test]
    fn test_fixed_bounds() {
        assert_eq!(descriptor("signal_strength").unwrap().bounds, Some((-100.0, 0.0)));
        assert_eq!(descriptor("download_bits_tcp").unwrap().bounds, None);
    }

    #[test]
    fn test_title_substitution() {
        let d = descriptor("download_bits_tcp").unwrap();
        assert_eq!(d.title(Some("Mb")), "Wi-Fi Download [TCP] (in Mb)");
        let d = descriptor("signal_strength").unwrap();
        assert_eq!(d.title(Some("Mb")), "Wi-Fi Signal Strength (in dBm)");
    }

    #[test]
    fn test_metric_set_accumulate() {
        let mut acc = MetricSet::new();
        let mut one = MetricSet::new();
        one.insert("a", 2.0);
        one.insert("b", 3.0);
        acc.accumulate(&one);
        acc.accumulate(&one);
        assert_eq!(acc.get("a"), Some(4.0));
        assert_eq!(acc.get("b"), Some(6.0));
    }

    #[test]
    fn test_metric_set_merge_overwrites() {
        let mut base = MetricSet::new();
        base.insert("a", 1.0);
        let mut extra = MetricSet::new();
        extra.insert("a", 9.0);
        extra.insert("b", 2.0);
        base.merge(&extra);
        assert_eq!(base.get("a"), Some(9.0));
        assert_eq!(base.get("b"), Some(2.0));
    }
}
