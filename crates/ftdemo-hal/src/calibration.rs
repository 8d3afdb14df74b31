//! Device calibration snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Calibration of one physical qubit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QubitCalibration {
    /// Qubit name, e.g. `Q0`.
    pub name: String,
    /// Relaxation time in microseconds.
    pub t1: f64,
    /// Dephasing time in microseconds.
    pub t2: f64,
    /// Single-qubit gate error.
    pub gate_error: f64,
    /// Readout error.
    pub readout_error: f64,
}

/// Calibration of one directed coupling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingCalibration {
    /// Control and target qubit.
    pub qubits: [u32; 2],
    /// CNOT gate error.
    pub gate_error: f64,
}

/// Device calibration at the time a job ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Backend that reported the data.
    #[serde(default)]
    pub backend: String,
    /// When the calibration was taken.
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    /// Fridge temperature in kelvin.
    #[serde(default)]
    pub fridge_temperature: Option<f64>,
    /// Per-qubit parameters.
    #[serde(default)]
    pub qubits: Vec<QubitCalibration>,
    /// Per-coupling parameters.
    #[serde(default)]
    pub couplings: Vec<CouplingCalibration>,
}

impl Calibration {
    /// Calibration of the qubit at `index`.
    pub fn qubit(&self, index: usize) -> Option<&QubitCalibration> {
        self.qubits.get(index)
    }

    /// Calibration of the directed coupling `control -> target`.
    pub fn coupling(&self, control: u32, target: u32) -> Option<&CouplingCalibration> {
        self.couplings.iter().find(|c| c.qubits == [control, target])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default() {
        let calibration: Calibration = serde_json::from_str(r#"{"backend": "ibmqx2"}"#).unwrap();
        assert!(calibration.qubits.is_empty());
        assert!(calibration.fridge_temperature.is_none());
    }

    #[test]
    fn test_coupling_lookup() {
        let calibration = Calibration {
            couplings: vec![CouplingCalibration {
                qubits: [1, 0],
                gate_error: 0.03,
            }],
            ..Calibration::default()
        };
        assert!(calibration.coupling(1, 0).is_some());
        assert!(calibration.coupling(0, 1).is_none());
    }
}
