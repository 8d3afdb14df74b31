//! Averaged device calibration across logged runs.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{AnalysisError, AnalysisResult};
use crate::stats::{DecodedStats, mean, sample_std_dev};

/// Mean and sample standard deviation of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    /// Mean.
    pub mean: f64,
    /// Sample standard deviation, zero for a single value.
    pub sigma: f64,
}

impl Estimate {
    fn from_values(values: &[f64]) -> Option<Self> {
        Some(Self {
            mean: mean(values)?,
            sigma: sample_std_dev(values).unwrap_or(0.0),
        })
    }
}

/// Averaged parameters of one qubit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QubitSummary {
    /// Qubit name.
    pub name: String,
    /// Relaxation time.
    pub t1: Estimate,
    /// Dephasing time.
    pub t2: Estimate,
    /// Single-qubit gate error.
    pub gate_error: Estimate,
    /// Readout error.
    pub readout_error: Estimate,
}

/// Averaged error of one coupling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouplingSummary {
    /// Control and target.
    pub qubits: [u32; 2],
    /// CNOT error.
    pub gate_error: Estimate,
}

/// Calibration parameters averaged over every logged run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationSummary {
    /// Runs that contributed.
    pub runs: usize,
    /// Per qubit, by index.
    pub qubits: Vec<QubitSummary>,
    /// Per coupling, sorted.
    pub couplings: Vec<CouplingSummary>,
    /// Fridge temperature, when reported.
    pub temperature: Option<Estimate>,
}

#[derive(Default)]
struct QubitSamples {
    name: String,
    t1: Vec<f64>,
    t2: Vec<f64>,
    gate_error: Vec<f64>,
    readout_error: Vec<f64>,
}

/// Average the calibration snapshots of `records`.
pub fn summarize_calibration(records: &[DecodedStats]) -> AnalysisResult<CalibrationSummary> {
    if records.is_empty() {
        return Err(AnalysisError::InsufficientData("no logged runs with calibration data".into()));
    }
    let mut qubits: BTreeMap<usize, QubitSamples> = BTreeMap::new();
    let mut couplings: BTreeMap<[u32; 2], Vec<f64>> = BTreeMap::new();
    let mut temperatures = Vec::new();

    for record in records {
        let calibration = &record.calibration;
        for (i, q) in calibration.qubits.iter().enumerate() {
            let samples = qubits.entry(i).or_default();
            samples.name.clone_from(&q.name);
            samples.t1.push(q.t1);
            samples.t2.push(q.t2);
            samples.gate_error.push(q.gate_error);
            samples.readout_error.push(q.readout_error);
        }
        for c in &calibration.couplings {
            couplings.entry(c.qubits).or_default().push(c.gate_error);
        }
        temperatures.extend(calibration.fridge_temperature);
    }

    let estimate = |values: &[f64]| Estimate::from_values(values).unwrap_or(Estimate { mean: 0.0, sigma: 0.0 });
    Ok(CalibrationSummary {
        runs: records.len(),
        qubits: qubits
            .into_values()
            .map(|s| QubitSummary {
                t1: estimate(&s.t1),
                t2: estimate(&s.t2),
                gate_error: estimate(&s.gate_error),
                readout_error: estimate(&s.readout_error),
                name: s.name,
            })
            .collect(),
        couplings: couplings
            .into_iter()
            .map(|(qubits, errors)| CouplingSummary {
                qubits,
                gate_error: estimate(&errors),
            })
            .collect(),
        temperature: Estimate::from_values(&temperatures),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_records_rejected() {
        assert!(matches!(
            summarize_calibration(&[]),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_single_value_has_zero_sigma() {
        let estimate = Estimate::from_values(&[0.02]).unwrap();
        assert_eq!(estimate.mean, 0.02);
        assert_eq!(estimate.sigma, 0.0);
        assert!(Estimate::from_values(&[]).is_none());
    }
}
