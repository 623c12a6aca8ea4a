//! End-to-end counting pipeline.
//!
//! ```text
//!   tree ──→ extract ──→ synthesize ──┐
//!                                     ├──→ GroverIterate ──→ counting circuit ──→ run ──→ estimate
//!   dataset ──→ encode ───────────────┘
//! ```
//!
//! Dataset column `j` holds the feature named `feature_names[j]`. The
//! encoded features are ordered like the oracle's qubits (by numeric name
//! suffix), so input qubit `i` of the oracle and bit `i` of the encoded
//! state refer to the same feature.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{info, instrument, warn};

use qtally_hal::{Backend, Counts};
use qtally_synth::encode::encode;
use qtally_synth::extract::extract;
use qtally_synth::oracle::synthesize_with_report;
use qtally_synth::{
    AmplitudeVector, ConditionSet, CountingCircuit, CountingCircuitBuilder, DecisionTree,
    FeatureIndexMap, GroverIterate, OracleReport,
};

use crate::config::PipelineConfig;
use crate::error::{CountError, CountResult};
use crate::estimate::{CountEstimate, estimate_count_with_offset};
use crate::run::run;

/// Everything built before execution.
#[derive(Debug, Clone)]
pub struct PreparedCounting {
    /// Positive-class DNF terms.
    pub terms: BTreeSet<ConditionSet>,
    /// Mapping from encoded feature names to qubits.
    pub feature_map: FeatureIndexMap,
    /// Oracle synthesis statistics.
    pub oracle_report: OracleReport,
    /// Encoded dataset state.
    pub amplitudes: AmplitudeVector,
    /// The circuit to execute.
    pub counting: CountingCircuit,
}

/// Result of a full pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct CountingOutcome {
    /// Measurement histogram of the precision register.
    pub counts: Counts,
    /// Decoded estimate.
    pub estimate: CountEstimate,
    /// Oracle synthesis statistics.
    pub oracle_report: OracleReport,
    /// Number of DNF terms extracted from the tree.
    pub num_terms: usize,
}

/// Runs all stages from a [`PipelineConfig`].
#[derive(Debug, Clone)]
pub struct CountingPipeline {
    config: PipelineConfig,
}

impl CountingPipeline {
    /// Create a pipeline, validating the configuration.
    pub fn new(config: PipelineConfig) -> CountResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the synchronous stages and build the counting circuit.
    ///
    /// `qubit_capacity` bounds the total circuit width when given.
    pub fn prepare(
        &self,
        tree: &DecisionTree,
        feature_names: &[String],
        dataset: &[Vec<f64>],
        qubit_capacity: Option<u32>,
    ) -> CountResult<PreparedCounting> {
        let terms = extract(tree, feature_names, self.config.positive_class_index)?;
        info!(terms = terms.len(), "extracted condition sets");

        let feature_map = self.feature_map(feature_names)?;

        // encode in qubit order so bit i of the state is qubit i of the oracle
        let columns: Vec<usize> = feature_map
            .names()
            .iter()
            .filter_map(|name| feature_names.iter().position(|n| n == name))
            .collect();

        let (oracle, oracle_report) = synthesize_with_report(&terms, &feature_map)?;
        if oracle_report.emitted == 0 {
            warn!(
                terms = terms.len(),
                "no term survived synthesis; the oracle marks nothing"
            );
        }
        info!(
            num_vars = feature_map.len(),
            emitted = oracle_report.emitted,
            "synthesised oracle"
        );

        let (amplitudes, state_prep) = encode(dataset, Some(columns.as_slice()))?;
        info!(
            samples = dataset.len(),
            support = amplitudes.support_size(),
            "encoded dataset"
        );

        let iterate = GroverIterate::compose(&oracle, &state_prep)?;
        let mut builder = CountingCircuitBuilder::new(&iterate, self.config.precision_width);
        if let Some(capacity) = qubit_capacity {
            builder = builder.with_qubit_capacity(capacity);
        }
        let counting = builder.build(&state_prep)?;
        info!(
            qubits = counting.circuit().num_qubits(),
            precision_width = counting.precision_width(),
            "built counting circuit"
        );

        Ok(PreparedCounting {
            terms,
            feature_map,
            oracle_report,
            amplitudes,
            counting,
        })
    }

    /// Run every stage on `backend` and decode the result.
    #[instrument(skip_all, fields(backend = backend.name(), shots = self.config.shots))]
    pub async fn run<B>(
        &self,
        backend: &B,
        tree: &DecisionTree,
        feature_names: &[String],
        dataset: &[Vec<f64>],
    ) -> CountResult<CountingOutcome>
    where
        B: Backend + ?Sized,
    {
        let prepared = self.prepare(
            tree,
            feature_names,
            dataset,
            Some(backend.capabilities().num_qubits),
        )?;
        self.execute(backend, &prepared).await
    }

    /// Execute a prepared circuit and decode the histogram.
    pub async fn execute<B>(
        &self,
        backend: &B,
        prepared: &PreparedCounting,
    ) -> CountResult<CountingOutcome>
    where
        B: Backend + ?Sized,
    {
        let counting = &prepared.counting;
        let counts = run(
            backend,
            counting.circuit(),
            self.config.shots,
            self.config.timeout(),
        )
        .await?;

        let estimate = estimate_count_with_offset(
            &counts,
            counting.precision_width(),
            counting.num_state_qubits(),
            counting.phase_offset(),
        )?;
        info!(
            outcome = estimate.outcome,
            estimated_count = estimate.estimated_count,
            "counting finished"
        );

        Ok(CountingOutcome {
            counts,
            estimate,
            oracle_report: prepared.oracle_report,
            num_terms: prepared.terms.len(),
        })
    }

    /// Qubit mapping for the features picked by `feature_indices`, or for
    /// every feature when none are configured.
    pub fn feature_map(&self, feature_names: &[String]) -> CountResult<FeatureIndexMap> {
        let selected = match &self.config.feature_indices {
            None => feature_names.to_vec(),
            Some(indices) => indices
                .iter()
                .map(|&i| {
                    feature_names.get(i).cloned().ok_or_else(|| {
                        CountError::InvalidConfig(format!(
                            "feature index {i} out of range for {} features",
                            feature_names.len()
                        ))
                    })
                })
                .collect::<CountResult<Vec<_>>>()?,
        };
        Ok(FeatureIndexMap::from_names(selected)?)
    }
}
