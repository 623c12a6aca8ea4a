//! Qtally Local Statevector Simulator
//!
//! Exact statevector evolution followed by measurement sampling. Memory
//! grows as 2^n complex amplitudes, so the default limit is 20 qubits.
//!
//! | Qubits | Memory |
//! |--------|--------|
//! | 10 | ~16 KB |
//! | 15 | ~512 KB |
//! | 20 | ~16 MB |
//! | 25 | ~512 MB |
//!
//! # Example
//!
//! ```ignore
//! use qtally_adapter_sim::SimulatorBackend;
//! use qtally_hal::Backend;
//!
//! let backend = SimulatorBackend::new().with_seed(7);
//! let job_id = backend.submit(&circuit, 4096).await?;
//! let result = backend.wait(&job_id).await?;
//! println!("Results: {:?}", result.counts);
//! ```

mod simulator;
mod statevector;

pub use simulator::SimulatorBackend;
pub use statevector::Statevector;
