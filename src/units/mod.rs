//! Human-scale unit selection for rate metrics.
//!
//! Raw throughput fields hold bits/s or bytes/s values in the hundreds of
//! millions, which make for unreadable legends. This module rescales a
//! raster and its bounds by a power-of-1024 multiple chosen from the
//! smallest meaningful sample magnitude, so the whole rendered field shares
//! one consistent unit.

use crate::field::RasterField;

/// Descending power-of-1024 multiples with byte-style labels.
const BYTE_SCALE: &[(f64, &str)] = &[
    ((1u64 << 60) as f64, "EiB"),
    ((1u64 << 50) as f64, "PiB"),
    ((1u64 << 40) as f64, "TiB"),
    ((1u64 << 30) as f64, "GiB"),
    ((1u64 << 20) as f64, "MiB"),
    ((1u64 << 10) as f64, "KiB"),
    (1.0, "Byte"),
];

/// Bit-equivalent label for a byte-style label.
///
/// A metric that counts bits gets the bit spelling of the same multiple
/// rather than a byte label slapped onto bit quantities.
#[must_use]
pub fn bit_label(byte_label: &str) -> &'static str {
    match byte_label {
        "EiB" => "Eb",
        "PiB" => "Pb",
        "TiB" => "Tb",
        "GiB" => "Gb",
        "MiB" => "Mb",
        "KiB" => "Kb",
        _ => "Bit",
    }
}

/// Pick the scale factor and label for a set of sample magnitudes.
///
/// Takes the two smallest distinct magnitudes and uses the smallest
/// non-degenerate one: a zero sample (typically a zero-valued boundary
/// anchor when vmin is zero) would otherwise force the smallest-unit
/// branch for the entire field.
#[must_use]
pub fn choose_scale(sample_values: &[f64]) -> (f64, &'static str) {
    let mut magnitudes: Vec<f64> = sample_values.iter().map(|v| v.abs()).collect();
    magnitudes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    magnitudes.dedup();

    let pick = match magnitudes.as_slice() {
        [] => 0.0,
        [only] => *only,
        [first, second, ..] => {
            if *first == 0.0 {
                *second
            } else {
                *first
            }
        }
    };

    for &(limit, label) in BYTE_SCALE {
        if pick >= limit {
            return (limit, label);
        }
    }
    (1.0, "Byte")
}

/// Rescale a raster field and its bounds to a human unit multiple.
///
/// `sample_values` are the control-point z values the field was built from
/// (anchors included); `bits` selects bit-style labels. Returns the scaled
/// field with its unit suffix filled in.
#[must_use]
pub fn scale_field(field: &RasterField, sample_values: &[f64], bits: bool) -> RasterField {
    let (factor, label) = choose_scale(sample_values);
    let suffix = if bits { bit_label(label) } else { label };

    RasterField {
        resolution: field.resolution,
        values: field.values.iter().map(|v| v / factor).collect(),
        vmin: field.vmin / factor,
        vmax: field.vmax / factor,
        unit: Some(suffix.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(values: Vec<f64>, vmin: f64, vmax: f64) -> RasterField {
        RasterField {
            resolution: 2,
            values,
            vmin,
            vmax,
            unit: None,
        }
    }

    #[test]
    fn test_choose_scale_mib_range() {
        // ~100 Mbit/s in bits/s territory: smallest magnitude picks the scale.
        let (factor, label) = choose_scale(&[1.0e8, 2.0e8, 3.0e8]);
        assert_eq!(label, "MiB");
        assert_eq!(factor, (1u64 << 20) as f64);
    }

    #[test]
    fn test_choose_scale_skips_zero_anchor() {
        // Zero anchors (vmin == 0) must not force the Byte branch.
        let (_, label) = choose_scale(&[0.0, 0.0, 1.5e9, 2.0e9]);
        assert_eq!(label, "GiB");
    }

    #[test]
    fn test_choose_scale_all_zero_degenerates_to_byte() {
        let (factor, label) = choose_scale(&[0.0, 0.0]);
        assert_eq!((factor, label), (1.0, "Byte"));
    }

    #[test]
    fn test_bit_labels() {
        assert_eq!(bit_label("MiB"), "Mb");
        assert_eq!(bit_label("Byte"), "Bit");
        assert_eq!(bit_label("EiB"), "Eb");
    }

    #[test]
    fn test_scale_field_divides_values_and_bounds() {
        let raw = field(vec![1.0e8, 2.0e8, 1.5e8, 3.0e8], 1.0e8, 3.0e8);
        let scaled = scale_field(&raw, &raw.values.clone(), false);
        let factor = (1u64 << 20) as f64;
        assert_eq!(scaled.unit.as_deref(), Some("MiB"));
        assert!((scaled.vmin - 1.0e8 / factor).abs() < 1e-9);
        assert!((scaled.vmax - 3.0e8 / factor).abs() < 1e-9);
        assert!((scaled.values[0] - 1.0e8 / factor).abs() < 1e-9);
    }

    #[test]
    fn test_scale_field_bit_suffix() {
        let raw = field(vec![1.0e8, 2.0e8, 1.5e8, 3.0e8], 1.0e8, 3.0e8);
        let scaled = scale_field(&raw, &raw.values.clone(), true);
        assert_eq!(scaled.unit.as_deref(), Some("Mb"));
    }

    #[test]
    fn test_scale_round_trip() {
        let raw = field(vec![1.0e8, 2.0e8, 1.5e8, 3.0e8], 1.0e8, 3.0e8);
        let (factor, _) = choose_scale(&raw.values);
        let scaled = scale_field(&raw, &raw.values.clone(), false);
        for (orig, s) in raw.values.iter().zip(&scaled.values) {
            assert!((s * factor - orig).abs() < 1e-6);
        }
    }
}
