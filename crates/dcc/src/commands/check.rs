use anyhow::Result;
use colored::Colorize;
use dcc_core::{AnalysisConfig, QualifierHierarchy};

pub fn run(config: &AnalysisConfig, sub: &str, sup: &str) -> Result<()> {
    let hierarchy = QualifierHierarchy::new(config.catalog()?);
    let catalog = hierarchy.catalog();
    let sub = catalog.parse_qualifier(sub)?;
    let sup = catalog.parse_qualifier(sup)?;

    let verdict = if hierarchy.is_subtype(&sub, &sup) {
        "true".green()
    } else {
        "false".red()
    };
    println!("{} <: {}: {}", catalog.describe(&sub), catalog.describe(&sup), verdict);
    println!("lub: {}", catalog.describe(&hierarchy.least_upper_bound(&sub, &sup)?));
    println!("glb: {}", catalog.describe(&hierarchy.greatest_lower_bound(&sub, &sup)?));
    Ok(())
}
