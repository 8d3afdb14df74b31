//! Per-run statistics of a decoded result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ftdemo_catalog::CircuitId;
use ftdemo_hal::{Calibration, Counts};

use crate::decode::DecodedCounts;
use crate::error::{AnalysisError, AnalysisResult};

/// Total variation distance `½ Σ |p_i − q_i|`.
pub fn statistical_distance(p: &[f64; 4], q: &[f64; 4]) -> f64 {
    0.5 * p.iter().zip(q).map(|(a, b)| (a - b).abs()).sum::<f64>()
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (`n − 1` denominator); `None` below two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Statistics of one run of one circuit, persisted as one JSON line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedStats {
    /// Circuit name.
    pub name: String,
    /// Structured identifier.
    pub id: CircuitId,
    /// `bare` or `encoded`.
    pub kind: String,
    /// Histogram as measured.
    pub raw_counts: Counts,
    /// Logical outcome counts.
    pub counts: DecodedCounts,
    /// Operations in the executed program.
    pub qasm_count: usize,
    /// Ideal distribution over `00 01 10 11`.
    pub expected: [f64; 4],
    /// Measured distribution over the valid shots.
    pub experimental: [f64; 4],
    /// Distance between `experimental` and `expected`.
    pub stat_dist: f64,
    /// Fraction of shots kept by decoding.
    pub post_selection_ratio: f64,
    /// Binomial standard deviation of each entry of `experimental`.
    pub stand_dev: [f64; 4],
    /// Standard deviation of `stat_dist`.
    pub stat_dist_stand_dev: f64,
    /// Device calibration when the run executed.
    pub calibration: Calibration,
    /// Completion time.
    pub date: DateTime<Utc>,
}

/// Everything a [`DecodedStats`] is computed from, apart from the counts.
#[derive(Debug, Clone)]
pub struct RunContext<'a> {
    /// Circuit identifier.
    pub id: &'a CircuitId,
    /// Raw histogram.
    pub raw_counts: &'a Counts,
    /// Operation count.
    pub qasm_count: usize,
    /// Ideal distribution.
    pub expected: [f64; 4],
    /// Calibration snapshot.
    pub calibration: &'a Calibration,
    /// Completion time.
    pub date: DateTime<Utc>,
}

impl DecodedStats {
    /// Compute the statistics of a decoded run.
    ///
    /// Fails with [`AnalysisError::NoValidShots`] when no shot decoded.
    pub fn compute(context: RunContext<'_>, counts: DecodedCounts) -> AnalysisResult<Self> {
        let name = context.id.name();
        if counts.total_valid == 0 {
            return Err(AnalysisError::NoValidShots(name));
        }
        let n = counts.total_valid as f64;
        let experimental = counts.buckets.map(|c| c as f64 / n);
        let stand_dev = experimental.map(|p| (p * (1.0 - p) / n).sqrt());

        let diagonal: f64 = experimental.iter().map(|p| p * (1.0 - p)).sum();
        let mut off_diagonal = 0.0;
        for (i, pi) in experimental.iter().enumerate() {
            for (j, pj) in experimental.iter().enumerate() {
                if i != j {
                    off_diagonal += pi * pj;
                }
            }
        }
        let stat_dist_stand_dev = ((diagonal + off_diagonal) / (4.0 * n)).sqrt();

        Ok(Self {
            kind: context.id.variant.kind().to_string(),
            name,
            id: context.id.clone(),
            raw_counts: context.raw_counts.clone(),
            counts,
            qasm_count: context.qasm_count,
            expected: context.expected,
            stat_dist: statistical_distance(&experimental, &context.expected),
            experimental,
            post_selection_ratio: n / counts.total() as f64,
            stand_dev,
            stat_dist_stand_dev,
            calibration: context.calibration.clone(),
            date: context.date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftdemo_catalog::{QubitPair, SpecId};
    use proptest::prelude::*;

    fn context<'a>(id: &'a CircuitId, raw: &'a Counts, calibration: &'a Calibration) -> RunContext<'a> {
        RunContext {
            id,
            raw_counts: raw,
            qasm_count: 7,
            expected: [0.0, 1.0, 0.0, 0.0],
            calibration,
            date: Utc::now(),
        }
    }

    #[test]
    fn test_perfect_run() {
        let id = CircuitId::bare(SpecId(15), "MX1|00>", QubitPair::new(1, 0).unwrap());
        let raw: Counts = [("01000", 100)].into_iter().collect();
        let calibration = Calibration::default();
        let counts = DecodedCounts {
            buckets: [0, 100, 0, 0],
            err: 0,
            total_valid: 100,
        };
        let stats = DecodedStats::compute(context(&id, &raw, &calibration), counts).unwrap();
        assert_eq!(stats.kind, "bare");
        assert_eq!(stats.experimental, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(stats.stat_dist, 0.0);
        assert_eq!(stats.post_selection_ratio, 1.0);
        assert_eq!(stats.stand_dev, [0.0; 4]);
        assert_eq!(stats.stat_dist_stand_dev, 0.0);
    }

    #[test]
    fn test_post_selection_and_deviation() {
        let id = CircuitId::encoded(SpecId(15), "MX1|00>", None);
        let raw = Counts::new();
        let calibration = Calibration::default();
        let counts = DecodedCounts {
            buckets: [25, 25, 25, 25],
            err: 100,
            total_valid: 100,
        };
        let stats = DecodedStats::compute(context(&id, &raw, &calibration), counts).unwrap();
        assert!((stats.post_selection_ratio - 0.5).abs() < 1e-12);
        assert!((stats.stat_dist - 0.75).abs() < 1e-12);
        assert!((stats.stand_dev[0] - (0.25f64 * 0.75 / 100.0).sqrt()).abs() < 1e-12);
        // diagonal 4 * 3/16 plus off-diagonal 12 / 16, over 400
        assert!((stats.stat_dist_stand_dev - (1.5f64 / 400.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_no_valid_shots() {
        let id = CircuitId::encoded(SpecId(15), "MX1|00>", None);
        let raw = Counts::new();
        let calibration = Calibration::default();
        let counts = DecodedCounts {
            buckets: [0; 4],
            err: 12,
            total_valid: 0,
        };
        let err = DecodedStats::compute(context(&id, &raw, &calibration), counts).unwrap_err();
        assert!(matches!(err, AnalysisError::NoValidShots(_)));
    }

    #[test]
    fn test_sample_std_dev() {
        assert_eq!(sample_std_dev(&[1.0]), None);
        let s = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((s - 2.138_089_935).abs() < 1e-6);
        assert_eq!(mean(&[]), None);
    }

    fn distribution() -> impl Strategy<Value = [f64; 4]> {
        prop::array::uniform4(0u32..100).prop_filter_map("non-zero total", |w| {
            let total: u32 = w.iter().sum();
            (total > 0).then(|| w.map(|x| f64::from(x) / f64::from(total)))
        })
    }

    proptest! {
        #[test]
        fn prop_distance_is_a_bounded_metric(p in distribution(), q in distribution()) {
            let d = statistical_distance(&p, &q);
            prop_assert!((0.0..=1.0 + 1e-12).contains(&d));
            prop_assert!((d - statistical_distance(&q, &p)).abs() < 1e-12);
            prop_assert_eq!(statistical_distance(&p, &p), 0.0);
            if p != q {
                prop_assert!(d > 0.0);
            }
        }

        #[test]
        fn prop_experimental_sums_to_one(buckets in prop::array::uniform4(0u64..10_000), err in 0u64..1000) {
            let total_valid: u64 = buckets.iter().sum();
            prop_assume!(total_valid > 0);
            let id = CircuitId::encoded(SpecId(0), "M|00>", None);
            let raw = Counts::new();
            let calibration = Calibration::default();
            let counts = DecodedCounts { buckets, err, total_valid };
            let stats = DecodedStats::compute(context(&id, &raw, &calibration), counts).unwrap();
            prop_assert!((stats.experimental.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            prop_assert!(stats.post_selection_ratio > 0.0 && stats.post_selection_ratio <= 1.0);
        }
    }
}
