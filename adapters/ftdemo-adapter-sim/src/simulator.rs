//! Simulator backend implementation.

use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use ftdemo_hal::{
    Backend, Calibration, CircuitResult, CouplingCalibration, Counts, HalError, HalResult, JobId,
    JobResult, JobStatus, QubitCalibration,
};
use ftdemo_ir::{Circuit, InstructionKind};

use crate::statevector::{Statevector, sample_index};

/// Directed couplings of the 5-qubit device.
pub const DEVICE_COUPLINGS: [[u32; 2]; 6] = [[1, 0], [2, 0], [2, 1], [2, 4], [3, 2], [3, 4]];

/// Simulator settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Seed for reproducible sampling; entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Probability of a bit flip on each operand after every gate.
    pub gate_error: f64,
    /// Probability of flipping each measured bit.
    pub readout_error: f64,
}

impl SimulatorConfig {
    /// A noiseless, seeded configuration.
    pub fn ideal(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    fn is_noiseless(&self) -> bool {
        self.gate_error <= 0.0
    }
}

/// Job data for the simulator.
struct SimJob {
    /// Status queries left before the job reports `Completed`.
    pending_polls: u32,
    result: JobResult,
}

/// Local simulator backend.
///
/// Jobs are executed at submission; the result is held until fetched.
pub struct SimulatorBackend {
    name: String,
    config: SimulatorConfig,
    rng: Mutex<StdRng>,
    jobs: Mutex<FxHashMap<String, SimJob>>,
    queue_polls: u32,
}

impl SimulatorBackend {
    /// Create a simulator with the given settings.
    ///
    /// Error rates are clamped to `[0, 1]`.
    pub fn new(mut config: SimulatorConfig) -> Self {
        config.gate_error = config.gate_error.clamp(0.0, 1.0);
        config.readout_error = config.readout_error.clamp(0.0, 1.0);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            name: "local_simulator".to_string(),
            config,
            rng: Mutex::new(rng),
            jobs: Mutex::new(FxHashMap::default()),
            queue_polls: 0,
        }
    }

    /// Report every job as queued for `polls` status queries.
    #[must_use]
    pub fn with_queue_polls(mut self, polls: u32) -> Self {
        self.queue_polls = polls;
        self
    }

    /// The simulator settings.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Run one circuit.
    #[instrument(skip(self, circuit, rng), fields(circuit = circuit.name()))]
    fn run_circuit(&self, circuit: &Circuit, shots: u32, rng: &mut StdRng) -> Counts {
        let start = Instant::now();
        let mut counts = Counts::new();

        if self.config.is_noiseless() {
            // One evolution serves every shot.
            let mut sv = Statevector::new(circuit.num_qubits());
            for inst in circuit.instructions() {
                sv.apply(inst);
            }
            let probabilities = sv.probabilities();
            for _ in 0..shots {
                let outcome = sample_index(&probabilities, rng);
                counts.insert(self.read_out(circuit, outcome, rng), 1);
            }
        } else {
            for _ in 0..shots {
                let mut sv = Statevector::new(circuit.num_qubits());
                for inst in circuit.instructions() {
                    sv.apply(inst);
                    if inst.is_gate() {
                        for q in &inst.qubits {
                            if rng.gen_bool(self.config.gate_error) {
                                sv.apply_x(q.index());
                            }
                        }
                    }
                }
                let outcome = sv.sample(rng);
                counts.insert(self.read_out(circuit, outcome, rng), 1);
            }
        }

        debug!(shots, elapsed = ?start.elapsed(), "circuit simulated");
        counts
    }

    /// Copy measured qubits into classical bits and render them, clbit 0
    /// first.
    fn read_out(&self, circuit: &Circuit, outcome: usize, rng: &mut StdRng) -> String {
        let mut clbits = vec![false; circuit.num_clbits()];
        for inst in circuit.instructions() {
            if inst.kind == InstructionKind::Measure {
                let bit = (outcome >> inst.qubits[0].index()) & 1 == 1;
                let flip = self.config.readout_error > 0.0 && rng.gen_bool(self.config.readout_error);
                clbits[inst.clbits[0].0 as usize] = bit ^ flip;
            }
        }
        clbits.iter().map(|&b| if b { '1' } else { '0' }).collect()
    }

    /// Synthetic calibration around the configured error rates.
    fn calibration(&self, num_qubits: usize, rng: &mut StdRng) -> Calibration {
        let jitter = |rng: &mut StdRng, scale: f64| scale * rng.gen_range(0.9..1.1);
        let qubits = (0..num_qubits)
            .map(|q| QubitCalibration {
                name: format!("Q{q}"),
                t1: jitter(rng, 50.0),
                t2: jitter(rng, 40.0),
                gate_error: jitter(rng, self.config.gate_error),
                readout_error: jitter(rng, self.config.readout_error),
            })
            .collect();
        let couplings = DEVICE_COUPLINGS
            .iter()
            .filter(|[a, b]| (*a as usize) < num_qubits && (*b as usize) < num_qubits)
            .map(|&qubits| CouplingCalibration {
                qubits,
                gate_error: jitter(rng, 2.0 * self.config.gate_error),
            })
            .collect();
        Calibration {
            backend: self.name.clone(),
            last_update: Some(Utc::now()),
            fridge_temperature: Some(jitter(rng, 0.015)),
            qubits,
            couplings,
        }
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, circuits), fields(circuits = circuits.len()))]
    async fn submit(&self, circuits: &[Circuit], shots: u32) -> HalResult<JobId> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be positive".into()));
        }
        if let Some(bad) = circuits.iter().find(|c| c.num_qubits() > 16) {
            return Err(HalError::InvalidCircuit(format!(
                "{} has {} qubits, the simulator supports 16",
                bad.name(),
                bad.num_qubits()
            )));
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let result = {
            let mut rng = self.rng.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            let results = circuits
                .iter()
                .map(|circuit| CircuitResult {
                    name: circuit.name().to_string(),
                    qasm: circuit.to_qasm(),
                    counts: self.run_circuit(circuit, shots, &mut rng),
                    date: Utc::now(),
                })
                .collect();
            let num_qubits = circuits.iter().map(Circuit::num_qubits).max().unwrap_or(0);
            JobResult {
                job_id: job_id.clone(),
                status: JobStatus::Completed,
                shots,
                circuits: results,
                calibration: self.calibration(num_qubits, &mut rng),
            }
        };

        self.jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(
                job_id.0.clone(),
                SimJob {
                    pending_polls: self.queue_polls,
                    result,
                },
            );

        debug!(job = %job_id, "submitted job");
        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let mut jobs = self.jobs.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let job = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        if job.pending_polls > 0 {
            job.pending_polls -= 1;
            return Ok(JobStatus::Queued);
        }
        Ok(job.result.status.clone())
    }

    async fn result(&self, job_id: &JobId) -> HalResult<JobResult> {
        let jobs = self.jobs.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let job = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        if job.pending_polls > 0 {
            return Err(HalError::Backend(format!("job {job_id} has not completed")));
        }
        Ok(job.result.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftdemo_hal::WaitPolicy;
    use ftdemo_ir::QubitId;
    use std::time::Duration;

    fn flip_circuit() -> Circuit {
        let mut circuit = Circuit::with_size("flip", 5, 5);
        circuit.x(QubitId(1)).unwrap();
        circuit.measure_all().unwrap();
        circuit
    }

    #[tokio::test]
    async fn test_deterministic_circuit() {
        let backend = SimulatorBackend::new(SimulatorConfig::ideal(1));
        let job = backend.submit(&[flip_circuit()], 100).await.unwrap();
        let result = backend.result(&job).await.unwrap();

        assert_eq!(result.circuits.len(), 1);
        assert_eq!(result.circuits[0].counts.get("01000"), 100);
        assert_eq!(result.calibration.qubits.len(), 5);
        assert_eq!(result.calibration.couplings.len(), 6);
    }

    #[tokio::test]
    async fn test_bell_pair_statistics() {
        let mut circuit = Circuit::with_size("bell", 5, 5);
        circuit.h(QubitId(1)).unwrap().cx(QubitId(1), QubitId(0)).unwrap();
        circuit.measure_all().unwrap();

        let backend = SimulatorBackend::new(SimulatorConfig::ideal(3));
        let job = backend.submit(&[circuit], 2000).await.unwrap();
        let counts = backend.result(&job).await.unwrap().circuits[0].counts.clone();

        assert_eq!(counts.get("00000") + counts.get("11000"), 2000);
        assert!(counts.get("00000") > 800 && counts.get("11000") > 800);
    }

    #[tokio::test]
    async fn test_seed_reproducible() {
        let config = SimulatorConfig {
            seed: Some(42),
            gate_error: 0.05,
            readout_error: 0.02,
        };
        let a = SimulatorBackend::new(config.clone());
        let b = SimulatorBackend::new(config);
        let ja = a.submit(&[flip_circuit()], 500).await.unwrap();
        let jb = b.submit(&[flip_circuit()], 500).await.unwrap();
        let ca = a.result(&ja).await.unwrap().circuits[0].counts.clone();
        let cb = b.result(&jb).await.unwrap().circuits[0].counts.clone();

        assert_eq!(ca, cb);
        assert!(ca.get("01000") < 500, "noise should perturb some shots");
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_job_times_out() {
        let backend = SimulatorBackend::new(SimulatorConfig::ideal(0)).with_queue_polls(100);
        let job = backend.submit(&[flip_circuit()], 10).await.unwrap();
        let policy = WaitPolicy {
            poll_interval: Duration::from_millis(100),
            timeout: Duration::from_secs(1),
        };

        assert!(backend.wait(&job, policy).await.unwrap_err().is_timeout());
        assert!(backend.result(&job).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_zero_shots() {
        let backend = SimulatorBackend::new(SimulatorConfig::ideal(0));
        assert!(matches!(
            backend.submit(&[flip_circuit()], 0).await,
            Err(HalError::InvalidShots(_))
        ));
    }
}
