//! Oracle command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use qtally_count::CountingPipeline;
use qtally_synth::extract::extract;
use qtally_synth::oracle::synthesize_with_report;

use super::common::{Overrides, load_config, load_tree};

/// Execute the oracle command.
pub fn execute(tree_path: &Path, config_path: Option<&Path>, overrides: &Overrides) -> Result<()> {
    let (tree, feature_names) = load_tree(tree_path)?;
    let config = load_config(config_path, overrides)?;

    let terms = extract(&tree, &feature_names, config.positive_class_index)?;
    let map = CountingPipeline::new(config.clone())?.feature_map(&feature_names)?;
    let (circuit, report) = synthesize_with_report(&terms, &map)?;

    println!(
        "{} Oracle for class {} of {}",
        style("→").cyan().bold(),
        config.positive_class_index,
        style(tree_path.display()).green()
    );

    println!("\n  Qubits:");
    for (name, qubit) in map.iter() {
        println!("    q{qubit:<3} {}", style(name).cyan());
    }
    println!("    q{:<3} {}", map.len(), style("flag").yellow());

    println!("\n  Terms ({}):", terms.len());
    for term in &terms {
        println!("    {term}");
    }

    println!(
        "\n  Blocks: {} emitted, {} outside the encoded features, {} contradictory",
        report.emitted, report.skipped_empty, report.skipped_unsatisfiable
    );

    println!("\n  Gates:");
    for (name, count) in circuit.count_ops() {
        println!("    {name:<8} {count:>6}");
    }
    println!("  Depth: {}", style(circuit.depth()?).yellow());

    Ok(())
}
