//! Count estimation from a phase-estimation histogram.
//!
//! The dominant outcome `m` of a `p`-bit register gives the angle
//! `θ = π·m / 2^p`, and the number of marked states among
//! `N = 2^num_state_qubits` is estimated as `N·sin²(θ/2)`.

use std::f64::consts::PI;

use serde::Serialize;
use tracing::debug;

use qtally_hal::Counts;
use qtally_synth::MAX_PRECISION;

use crate::error::{CountError, CountResult};

/// Decoded result of a counting run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CountEstimate {
    /// Most frequent outcome as read from the register.
    pub raw_outcome: u64,
    /// Outcome after removing the phase offset.
    pub outcome: u64,
    /// How often the dominant outcome occurred.
    pub frequency: u64,
    /// Total shots in the histogram.
    pub shots: u64,
    /// `π·outcome / 2^p`.
    pub theta: f64,
    /// Size of the searched space, `2^num_state_qubits`.
    pub search_space: f64,
    /// Estimated number of marked states.
    pub estimated_count: f64,
}

/// Decode a histogram without any phase offset.
pub fn estimate_count(
    histogram: &Counts,
    precision_width: u32,
    num_state_qubits: u32,
) -> CountResult<CountEstimate> {
    estimate_count_with_offset(histogram, precision_width, num_state_qubits, 0)
}

/// Decode a histogram, subtracting `phase_offset` modulo `2^p` from the
/// dominant outcome before computing the angle.
#[allow(clippy::cast_precision_loss)]
pub fn estimate_count_with_offset(
    histogram: &Counts,
    precision_width: u32,
    num_state_qubits: u32,
    phase_offset: u64,
) -> CountResult<CountEstimate> {
    if precision_width == 0 || precision_width > MAX_PRECISION {
        return Err(CountError::InvalidConfig(format!(
            "precision_width must be between 1 and {MAX_PRECISION}, got {precision_width}"
        )));
    }
    if histogram.is_empty() {
        return Err(CountError::EmptyHistogram);
    }

    // Keys share one width, so the lexicographic tie-break of
    // `most_frequent` is also the lowest integer.
    for (key, _) in histogram.iter() {
        parse_outcome(key, precision_width)?;
    }
    let (key, frequency) = histogram
        .most_frequent()
        .ok_or(CountError::EmptyHistogram)?;
    let raw_outcome = parse_outcome(key, precision_width)?;

    let modulus = 1u64 << precision_width;
    let outcome = (raw_outcome + modulus - phase_offset % modulus) % modulus;
    let theta = PI * outcome as f64 / modulus as f64;
    let search_space = 2f64.powf(f64::from(num_state_qubits));
    let estimated_count = search_space * (theta / 2.0).sin().powi(2);

    debug!(
        raw_outcome,
        outcome,
        frequency,
        theta,
        estimated_count,
        "decoded counting histogram"
    );

    Ok(CountEstimate {
        raw_outcome,
        outcome,
        frequency,
        shots: histogram.total(),
        theta,
        search_space,
        estimated_count,
    })
}

impl CountEstimate {
    /// Share of shots that landed on the dominant outcome, in percent.
    #[allow(clippy::cast_precision_loss)]
    pub fn dominant_percent(&self) -> f64 {
        if self.shots == 0 {
            return 0.0;
        }
        self.frequency as f64 * 100.0 / self.shots as f64
    }
}

fn parse_outcome(key: &str, width: u32) -> CountResult<u64> {
    let invalid = || CountError::InvalidOutcome {
        outcome: key.to_string(),
        width,
    };
    if key.len() != width as usize || !key.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(invalid());
    }
    u64::from_str_radix(key, 2).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(entries: &[(&str, u64)]) -> Counts {
        entries.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_dominant_outcome_decoding() {
        let h = counts(&[("100", 900), ("011", 100)]);
        let est = estimate_count(&h, 3, 1).unwrap();
        assert_eq!(est.outcome, 4);
        assert_eq!(est.frequency, 900);
        assert_eq!(est.shots, 1000);
        assert!((est.theta - PI / 2.0).abs() < 1e-12);
        assert!((est.estimated_count - 1.0).abs() < 1e-12);
        assert!((est.dominant_percent() - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_outcome_takes_every_shot() {
        let h = counts(&[("010", 4096)]);
        let est = estimate_count(&h, 3, 2).unwrap();
        assert_eq!(est.frequency, est.shots);
        assert!((est.dominant_percent() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_bitstring_is_msb_first() {
        let h = counts(&[("001", 10)]);
        assert_eq!(estimate_count(&h, 3, 2).unwrap().outcome, 1);
    }

    #[test]
    fn test_ties_resolve_to_lowest_outcome() {
        let h = counts(&[("110", 50), ("010", 50)]);
        assert_eq!(estimate_count(&h, 3, 2).unwrap().outcome, 2);
    }

    #[test]
    fn test_offset_wraps_modulo_register() {
        let h = counts(&[("000", 1)]);
        let est = estimate_count_with_offset(&h, 3, 1, 4).unwrap();
        assert_eq!(est.raw_outcome, 0);
        assert_eq!(est.outcome, 4);
        assert!((est.estimated_count - 1.0).abs() < 1e-12);

        let h = counts(&[("100", 1)]);
        let est = estimate_count_with_offset(&h, 3, 1, 4).unwrap();
        assert_eq!(est.outcome, 0);
        assert!(est.estimated_count.abs() < 1e-12);
    }

    #[test]
    fn test_empty_histogram() {
        assert!(matches!(
            estimate_count(&Counts::new(), 3, 1),
            Err(CountError::EmptyHistogram)
        ));
    }

    #[test]
    fn test_invalid_outcomes() {
        for bad in ["10", "1000", "1x0", "   "] {
            let h = counts(&[(bad, 1)]);
            assert!(
                matches!(
                    estimate_count(&h, 3, 1),
                    Err(CountError::InvalidOutcome { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_precision_range() {
        let h = counts(&[("0", 1)]);
        assert!(matches!(
            estimate_count(&h, 0, 1),
            Err(CountError::InvalidConfig(_))
        ));
    }
}
