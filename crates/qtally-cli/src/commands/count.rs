//! Count command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use qtally_adapter_sim::SimulatorBackend;
use qtally_count::{CountingPipeline, PipelineConfig};
use qtally_hal::{Backend, BackendAvailability, BackendConfig, BackendFactory};

use super::common::{Overrides, load_config, load_dataset, load_tree, print_counts};

/// Execute the count command.
pub async fn execute(
    tree_path: &Path,
    data_path: &Path,
    config_path: Option<&Path>,
    overrides: &Overrides,
    max_qubits: Option<u32>,
    json_output: bool,
) -> Result<()> {
    let (tree, feature_names) = load_tree(tree_path)?;
    let dataset = load_dataset(data_path)?;
    let config = load_config(config_path, overrides)?;
    let backend = simulator(&config, max_qubits)?;

    if !json_output {
        println!(
            "{} Counting {} samples against {} ({} features, {} shots, precision {})",
            style("→").cyan().bold(),
            dataset.len(),
            style(tree_path.display()).green(),
            feature_names.len(),
            config.shots,
            config.precision_width
        );
    }

    if let BackendAvailability::Offline { reason } = backend.availability().await? {
        anyhow::bail!("Backend '{}' is not available: {reason}", backend.name());
    }

    let pipeline = CountingPipeline::new(config)?;
    let prepared = pipeline.prepare(
        &tree,
        &feature_names,
        &dataset,
        Some(backend.capabilities().num_qubits),
    )?;

    if !json_output {
        println!(
            "  Terms: {}, oracle blocks: {} ({} skipped)",
            prepared.terms.len(),
            prepared.oracle_report.emitted,
            prepared.oracle_report.skipped_empty + prepared.oracle_report.skipped_unsatisfiable
        );
        println!(
            "  Circuit: {} qubits, depth {}",
            prepared.counting.circuit().num_qubits(),
            prepared.counting.circuit().depth()?
        );
    }

    let spinner = if json_output {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(format!("Running on {}...", backend.name()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let outcome = pipeline.execute(&backend, &prepared).await;
    spinner.finish_and_clear();
    let outcome = outcome?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    print_counts(&outcome.counts);

    let estimate = &outcome.estimate;
    println!(
        "\n  Dominant outcome: {} (raw {}, {:.1}% of shots)",
        style(estimate.outcome).yellow(),
        estimate.raw_outcome,
        estimate.dominant_percent()
    );
    println!("  Phase angle: {:.4} rad", estimate.theta);
    println!(
        "  {} Estimated count: {} of {}",
        style("✓").green().bold(),
        style(format!("{:.3}", estimate.estimated_count)).green().bold(),
        estimate.search_space
    );

    Ok(())
}

/// Build the simulator through its factory so seed and size share one path.
fn simulator(config: &PipelineConfig, max_qubits: Option<u32>) -> Result<SimulatorBackend> {
    let mut backend_config = BackendConfig::new("simulator");
    if let Some(seed) = config.seed {
        backend_config = backend_config.with_extra("seed", json!(seed));
    }
    if let Some(max_qubits) = max_qubits {
        backend_config = backend_config.with_extra("max_qubits", json!(max_qubits));
    }
    Ok(SimulatorBackend::from_config(backend_config)?)
}
