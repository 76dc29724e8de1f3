use anyhow::Result;
use colored::Colorize;
use dcc_core::catalog::Placeholder;
use dcc_core::AnalysisConfig;

pub fn run(config: &AnalysisConfig) -> Result<()> {
    let catalog = config.catalog()?;

    println!(
        "{:<6} {:<22} {:<8} {:<12} {}",
        "RANK".bold(),
        "KIND".bold(),
        "TAGS".bold(),
        "ROLE".bold(),
        "POLYMORPHIC".bold()
    );
    for (_, spec) in catalog.kinds() {
        let name = if spec.tag_bearing {
            format!("{}[..]", spec.name)
        } else {
            spec.name.clone()
        };
        let role = match spec.placeholder {
            Placeholder::None => "-",
            Placeholder::Poly => "poly",
            Placeholder::PolyUse => "poly-use",
        };
        let counterpart = spec.polymorphic.map(|kind| catalog.name(kind)).unwrap_or("-");
        println!(
            "{:<6} {:<22} {:<8} {:<12} {}",
            spec.rank,
            name,
            if spec.tag_bearing { "yes" } else { "no" },
            role,
            counterpart
        );
    }
    Ok(())
}
