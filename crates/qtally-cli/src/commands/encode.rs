//! Encode command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use qtally_synth::encode::encode;

use super::common::{Overrides, load_config, load_dataset};

/// Execute the encode command.
pub fn execute(data_path: &Path, config_path: Option<&Path>, overrides: &Overrides) -> Result<()> {
    let dataset = load_dataset(data_path)?;
    let config = load_config(config_path, overrides)?;

    let (amplitudes, circuit) = encode(&dataset, config.feature_indices.as_deref())?;
    let width = amplitudes.num_qubits() as usize;

    println!(
        "{} Encoded {} samples on {} qubits ({} basis states in support)",
        style("→").cyan().bold(),
        dataset.len(),
        width,
        amplitudes.support_size()
    );

    println!("\n  {:<w$}  {:>10}  {:>10}", "state", "amplitude", "prob", w = width.max(5));
    for (index, amplitude) in amplitudes.nonzero() {
        println!(
            "  {:<w$}  {:>10.6}  {:>10.6}",
            style(format!("{index:0width$b}")).cyan(),
            amplitude,
            amplitude * amplitude,
            w = width.max(5)
        );
    }

    let ops = circuit.count_ops();
    let total: usize = ops.values().sum();
    println!(
        "\n  State preparation: {} gates, depth {}",
        total,
        circuit.depth()?
    );

    Ok(())
}
