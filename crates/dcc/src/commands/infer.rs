use crate::cli::OutputFormat;
use crate::graph_file::GraphFile;
use anyhow::{Context, Result};
use colored::Colorize;
use dcc_core::{AnalysisConfig, EntityInference, QualifierHierarchy};
use indexmap::IndexMap;
use std::path::Path;
use tracing::info;

pub fn run(config: &AnalysisConfig, path: &Path, format: OutputFormat) -> Result<()> {
    let source = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let hierarchy = QualifierHierarchy::new(config.catalog()?);
    let graph = GraphFile::from_json(&source)?.into_graph(hierarchy.catalog())?;
    info!(declarations = graph.len(), "loaded declaration graph");

    let mut inference = EntityInference::new(&hierarchy, config)?;
    let inferred = inference.infer_all(&graph)?;
    let stats = inference.stats();
    info!(
        hits = stats.hits,
        reentrant_hits = stats.reentrant_hits,
        misses = stats.misses,
        evictions = stats.evictions,
        "inference complete"
    );

    let catalog = hierarchy.catalog();
    match format {
        OutputFormat::Text => {
            for (name, qualifier) in &inferred {
                println!("{}: {}", name.bold(), catalog.describe(qualifier));
            }
        }
        OutputFormat::Json => {
            let rendered: IndexMap<&str, String> = inferred
                .iter()
                .map(|(name, qualifier)| (name.as_str(), catalog.describe(qualifier)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rendered)?);
        }
    }
    Ok(())
}
