//! Simulator backend implementation.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use qtally_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Counts,
    ExecutionResult, HalError, HalResult, Job, JobId, JobStatus, ValidationResult,
};
use qtally_ir::{Circuit, Instruction, InstructionKind};

use crate::statevector::Statevector;

const DEFAULT_MAX_QUBITS: u32 = 20;

type JobTable = Arc<Mutex<FxHashMap<JobId, SimJob>>>;

/// Job data for the simulator.
struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Local statevector simulator backend.
///
/// Jobs run on the blocking thread pool; `submit` returns immediately with a
/// queued job. With a seed, every job samples from the same deterministic
/// random stream. A job stays in the table until its result is read.
pub struct SimulatorBackend {
    config: BackendConfig,
    capabilities: Capabilities,
    jobs: JobTable,
    seed: Option<u64>,
    poll_interval: Duration,
}

impl SimulatorBackend {
    /// Create a new simulator backend with default settings.
    pub fn new() -> Self {
        Self::with_max_qubits(DEFAULT_MAX_QUBITS)
    }

    /// Create a simulator with custom max qubits.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self {
            config: BackendConfig::new("simulator"),
            capabilities: Capabilities::simulator(max_qubits),
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            seed: None,
            poll_interval: Duration::from_millis(5),
        }
    }

    /// Use a fixed seed for measurement sampling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, FxHashMap<JobId, SimJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, circuit: &Circuit) -> Vec<String> {
        let caps = &self.capabilities;
        let mut reasons = Vec::new();

        if circuit.num_qubits() > caps.num_qubits as usize {
            reasons.push(format!(
                "circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                caps.num_qubits
            ));
        }
        match circuit.instructions() {
            Ok(instructions) => {
                let mut measured = rustc_hash::FxHashSet::default();
                for inst in instructions {
                    if !caps.accepts(inst) {
                        reasons.push(format!("unsupported instruction '{}'", inst.name()));
                    }
                    if inst.is_measure() {
                        measured.extend(inst.qubits.iter().copied());
                    } else if !inst.is_directive()
                        && inst.qubits.iter().any(|q| measured.contains(q))
                    {
                        reasons.push(format!(
                            "'{}' acts on a qubit after it was measured",
                            inst.name()
                        ));
                    }
                }
            }
            Err(e) => reasons.push(e.to_string()),
        }

        reasons
    }

    /// Run the simulation synchronously.
    #[allow(clippy::cast_possible_truncation)]
    #[instrument(skip(circuit, rng), fields(qubits = circuit.num_qubits()))]
    fn run_simulation(circuit: &Circuit, shots: u32, rng: &mut StdRng) -> HalResult<ExecutionResult> {
        let start = Instant::now();

        let instructions = circuit
            .instructions()
            .map_err(|e| HalError::InvalidCircuit(e.to_string()))?;
        debug!(instructions = instructions.len(), "Starting simulation");

        let mut sv = Statevector::new(circuit.num_qubits());
        for inst in &instructions {
            sv.apply(inst)?;
        }

        let readout = Readout::new(circuit, &instructions);
        let mut counts = Counts::new();
        for outcome in sv.sample(shots, rng) {
            counts.insert(readout.bitstring(outcome), 1);
        }

        let elapsed = start.elapsed();
        debug!(?elapsed, outcomes = counts.len(), "Simulation completed");

        Ok(ExecutionResult::new(counts, shots).with_execution_time(elapsed.as_millis() as u64))
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a sampled basis state onto classical bits.
///
/// Bitstrings list the highest classical bit first. A circuit without
/// measurements reads out every qubit, highest qubit first.
struct Readout {
    /// `(qubit index, clbit index)` pairs.
    pairs: Vec<(usize, usize)>,
    width: usize,
}

impl Readout {
    fn new(circuit: &Circuit, instructions: &[&Instruction]) -> Self {
        let pairs: Vec<_> = instructions
            .iter()
            .filter(|inst| matches!(inst.kind, InstructionKind::Measure))
            .flat_map(|inst| {
                inst.qubits
                    .iter()
                    .zip(&inst.clbits)
                    .map(|(q, c)| (q.index(), c.0 as usize))
            })
            .collect();

        if pairs.is_empty() {
            let n = circuit.num_qubits();
            return Self {
                pairs: (0..n).map(|q| (q, q)).collect(),
                width: n,
            };
        }
        Self {
            pairs,
            width: circuit.num_clbits(),
        }
    }

    fn bitstring(&self, outcome: usize) -> String {
        let mut bits = vec![b'0'; self.width];
        for &(qubit, clbit) in &self.pairs {
            if (outcome >> qubit) & 1 == 1 {
                bits[self.width - 1 - clbit] = b'1';
            }
        }
        bits.into_iter().map(char::from).collect()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::Ready)
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let reasons = self.check(circuit);
        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            return Err(HalError::CircuitTooLarge {
                required: circuit.num_qubits(),
                available: self.capabilities.num_qubits,
            });
        }
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots {
                got: shots,
                max: self.capabilities.max_shots,
            });
        }
        let reasons = self.check(circuit);
        if !reasons.is_empty() {
            return Err(HalError::InvalidCircuit(reasons.join("; ")));
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let job = Job::queued(job_id.clone(), self.name(), shots);
        self.lock_jobs()
            .insert(job_id.clone(), SimJob { job, result: None });
        debug!(%job_id, shots, "Submitted job");

        let jobs = Arc::clone(&self.jobs);
        let circuit = circuit.clone();
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let id = job_id.clone();

        tokio::task::spawn_blocking(move || {
            {
                let mut table = jobs.lock().unwrap_or_else(PoisonError::into_inner);
                let started = table
                    .get_mut(&id)
                    .is_some_and(|sim_job| sim_job.job.advance(JobStatus::Running));
                if !started {
                    return;
                }
            }

            let outcome = SimulatorBackend::run_simulation(&circuit, shots, &mut rng);

            let mut table = jobs.lock().unwrap_or_else(PoisonError::into_inner);
            let Some(sim_job) = table.get_mut(&id) else {
                return;
            };
            match outcome {
                Ok(result) => {
                    if sim_job.job.advance(JobStatus::Completed) {
                        sim_job.result = Some(result);
                    }
                }
                Err(e) => {
                    warn!(job_id = %id, error = %e, "Simulation failed");
                    sim_job.job.advance(JobStatus::Failed(e.to_string()));
                }
            }
            if let Some(run_time) = sim_job.job.run_time() {
                debug!(job_id = %id, status = %sim_job.job.status, ?run_time, "Job finished");
            }
        });

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.lock_jobs()
            .get(job_id)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.to_string()))
    }

    /// Hands out the outcome of a finished job and drops it from the job
    /// table, so a second call reports `JobNotFound`.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let mut jobs = self.lock_jobs();
        let status = jobs
            .get(job_id)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.to_string()))?;
        if !status.is_terminal() {
            return Err(HalError::ResultNotReady {
                job_id: job_id.to_string(),
                status: status.to_string(),
            });
        }
        let sim_job = jobs
            .remove(job_id)
            .ok_or_else(|| HalError::JobNotFound(job_id.to_string()))?;
        match (sim_job.job.status, sim_job.result) {
            (JobStatus::Completed, Some(result)) => Ok(result),
            (JobStatus::Failed(msg), _) => Err(HalError::JobFailed(msg)),
            (JobStatus::Cancelled, _) => Err(HalError::JobCancelled),
            (status, _) => Err(HalError::JobFailed(format!(
                "job ended as {status} without a result"
            ))),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self.lock_jobs();
        let sim_job = jobs
            .get_mut(job_id)
            .ok_or_else(|| HalError::JobNotFound(job_id.to_string()))?;
        if sim_job.job.advance(JobStatus::Cancelled) {
            debug!(%job_id, "Job cancelled");
        } else {
            debug!(%job_id, status = %sim_job.job.status, "Cancel ignored for finished job");
        }
        Ok(())
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl BackendFactory for SimulatorBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_qubits = match config.extra_u64("max_qubits")? {
            Some(v) => u32::try_from(v).map_err(|_| {
                HalError::Configuration(format!("max_qubits {v} does not fit in u32"))
            })?,
            None => DEFAULT_MAX_QUBITS,
        };
        let seed = config.extra_u64("seed")?;

        let mut capabilities = Capabilities::simulator(max_qubits);
        capabilities.name.clone_from(&config.name);

        Ok(Self {
            config,
            capabilities,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            seed,
            poll_interval: Duration::from_millis(5),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtally_ir::{ClbitId, QubitId};

    fn bell() -> Circuit {
        let mut c = Circuit::with_size("bell", 2, 2);
        c.h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .measure(QubitId(1), ClbitId(1))
            .unwrap();
        c
    }

    #[tokio::test]
    async fn test_simulator_capabilities() {
        let backend = SimulatorBackend::new();
        let caps = backend.capabilities();

        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 20);
    }

    #[tokio::test]
    async fn test_simulator_bell_state() {
        let backend = SimulatorBackend::new().with_seed(11);

        let job_id = backend.submit(&bell(), 1000).await.unwrap();
        let result = backend.wait(&job_id).await.unwrap();
        assert_eq!(result.shots, 1000);

        let counts = &result.counts;
        assert_eq!(counts.get("00") + counts.get("11"), 1000);
        assert_eq!(counts.get("01") + counts.get("10"), 0);
    }

    #[tokio::test]
    async fn test_bitstring_is_highest_clbit_first() {
        let backend = SimulatorBackend::new();

        let mut c = Circuit::with_size("x0", 3, 3);
        c.x(QubitId(0)).unwrap();
        // qubit 0 lands in clbit 2, the leftmost character.
        c.measure(QubitId(0), ClbitId(2)).unwrap();
        c.measure(QubitId(1), ClbitId(0)).unwrap();

        let job_id = backend.submit(&c, 10).await.unwrap();
        let result = backend.wait(&job_id).await.unwrap();
        assert_eq!(result.counts.get("100"), 10);
    }

    #[tokio::test]
    async fn test_no_measurements_reads_all_qubits() {
        let backend = SimulatorBackend::new();
        let mut c = Circuit::with_size("x1", 2, 0);
        c.x(QubitId(1)).unwrap();
        let job_id = backend.submit(&c, 5).await.unwrap();
        let result = backend.wait(&job_id).await.unwrap();
        assert_eq!(result.counts.get("10"), 5);
    }

    #[tokio::test]
    async fn test_reading_result_releases_job() {
        let backend = SimulatorBackend::new();
        let job_id = backend.submit(&bell(), 10).await.unwrap();
        backend.wait(&job_id).await.unwrap();

        assert!(backend.lock_jobs().is_empty());
        assert!(matches!(
            backend.result(&job_id).await,
            Err(HalError::JobNotFound(_))
        ));
        assert!(matches!(
            backend.status(&job_id).await,
            Err(HalError::JobNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_seeded_runs_are_reproducible() {
        let backend = SimulatorBackend::new().with_seed(42);
        let a = backend.submit(&bell(), 500).await.unwrap();
        let b = backend.submit(&bell(), 500).await.unwrap();
        let a = backend.wait(&a).await.unwrap();
        let b = backend.wait(&b).await.unwrap();
        assert_eq!(a.counts, b.counts);
    }

    #[tokio::test]
    async fn test_simulator_too_many_qubits() {
        let backend = SimulatorBackend::with_max_qubits(5);
        let circuit = Circuit::with_size("test", 10, 0);
        let result = backend.submit(&circuit, 100).await;
        assert!(matches!(result, Err(HalError::CircuitTooLarge { required: 10, available: 5 })));
    }

    #[tokio::test]
    async fn test_invalid_shots() {
        let backend = SimulatorBackend::new();
        let result = backend.submit(&bell(), 0).await;
        assert!(matches!(result, Err(HalError::InvalidShots { got: 0, .. })));
    }

    #[tokio::test]
    async fn test_validate_rejects_gate_after_measure() {
        let backend = SimulatorBackend::new();
        let mut c = Circuit::with_size("mid", 1, 1);
        c.measure(QubitId(0), ClbitId(0)).unwrap();
        c.x(QubitId(0)).unwrap();

        let validation = backend.validate(&c).await.unwrap();
        assert!(!validation.is_valid());
        assert!(matches!(
            backend.submit(&c, 10).await,
            Err(HalError::InvalidCircuit(_))
        ));
        assert!(backend.validate(&bell()).await.unwrap().is_valid());
    }

    #[tokio::test]
    async fn test_validate_rejects_reset() {
        let backend = SimulatorBackend::new();
        let mut c = Circuit::with_size("r", 1, 0);
        c.reset(QubitId(0)).unwrap();

        match backend.validate(&c).await.unwrap() {
            ValidationResult::Invalid { reasons } => {
                assert_eq!(reasons, vec!["unsupported instruction 'reset'"]);
            }
            ValidationResult::Valid => panic!("reset should be rejected"),
        }
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let backend = SimulatorBackend::new();
        let missing = JobId::new("nope");
        assert!(matches!(
            backend.status(&missing).await,
            Err(HalError::JobNotFound(_))
        ));
        assert!(matches!(
            backend.cancel(&missing).await,
            Err(HalError::JobNotFound(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = BackendConfig::new("seeded-sim")
            .with_extra("max_qubits", serde_json::json!(8))
            .with_extra("seed", serde_json::json!(3));
        let backend = SimulatorBackend::from_config(config).unwrap();
        assert_eq!(backend.name(), "seeded-sim");
        assert_eq!(backend.capabilities().num_qubits, 8);
        assert_eq!(backend.seed, Some(3));

        let bad = BackendConfig::new("sim").with_extra("max_qubits", serde_json::json!(-1));
        assert!(SimulatorBackend::from_config(bad).is_err());
    }
}
