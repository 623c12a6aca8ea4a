//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use qtally_count::PipelineConfig;
use qtally_hal::Counts;
use qtally_synth::{DecisionTree, FlatTree};

/// Flags that override values from the configuration file.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Number of shots
    #[arg(long)]
    pub shots: Option<u32>,

    /// Phase-estimation precision width
    #[arg(long)]
    pub precision: Option<u32>,

    /// Simulator sampling seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Index of the positive class
    #[arg(long)]
    pub positive_class: Option<usize>,

    /// Execution timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Dataset columns to encode (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub features: Option<Vec<usize>>,
}

impl Overrides {
    /// Apply every set flag on top of `config`.
    pub fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(shots) = self.shots {
            config.shots = shots;
        }
        if let Some(precision) = self.precision {
            config.precision_width = precision;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(class) = self.positive_class {
            config.positive_class_index = class;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(features) = &self.features {
            config.feature_indices = Some(features.clone());
        }
        config
    }
}

/// Tree input: feature names plus the tree in arena or flat form.
#[derive(Debug, Deserialize)]
pub struct TreeFile {
    pub feature_names: Vec<String>,
    pub tree: TreeLayout,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TreeLayout {
    Arena(DecisionTree),
    Flat(FlatTree),
}

impl TreeFile {
    /// Build the arena tree, converting the flat form if needed.
    pub fn into_parts(self) -> Result<(DecisionTree, Vec<String>)> {
        let tree = match self.tree {
            TreeLayout::Arena(tree) => tree,
            TreeLayout::Flat(flat) => {
                DecisionTree::from_flat(&flat).context("Invalid flat tree")?
            }
        };
        Ok((tree, self.feature_names))
    }
}

/// Read a YAML or JSON document, chosen by file extension.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml_ng::from_str(&source)
            .with_context(|| format!("Invalid YAML in {}", path.display())),
        "json" => serde_json::from_str(&source)
            .with_context(|| format!("Invalid JSON in {}", path.display())),
        other => anyhow::bail!(
            "Unsupported file extension '{other}' for {}; use .json, .yaml or .yml",
            path.display()
        ),
    }
}

/// Load the tree file.
pub fn load_tree(path: &Path) -> Result<(DecisionTree, Vec<String>)> {
    read_document::<TreeFile>(path)?.into_parts()
}

/// Load a dataset: one row of feature values per sample.
pub fn load_dataset(path: &Path) -> Result<Vec<Vec<f64>>> {
    read_document(path)
}

/// Load the configuration file if given, then apply flag overrides.
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<PipelineConfig> {
    let base = match path {
        Some(path) => read_document(path)?,
        None => PipelineConfig::default(),
    };
    let config = overrides.apply(base);
    config.validate()?;
    debug!(?config, "loaded configuration");
    Ok(config)
}

/// Print a histogram, most frequent outcome first.
pub fn print_counts(counts: &Counts) {
    let mut sorted: Vec<(&str, u64)> = counts.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    let total = counts.total().max(1) as f64;

    println!(
        "\n{} Histogram ({} shots):",
        style("✓").green().bold(),
        counts.total()
    );

    for (bitstring, count) in sorted.iter().take(16) {
        let prob = *count as f64 / total * 100.0;
        let bar_len = (prob / 2.0).round() as usize;
        let bar: String = "█".repeat(bar_len);

        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(bitstring).cyan(),
            count,
            prob,
            style(bar).green()
        );
    }

    if sorted.len() > 16 {
        println!("  ... and {} more outcomes", sorted.len() - 16);
    }
}
