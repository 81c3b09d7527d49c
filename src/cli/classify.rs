//! `roster classify`

use anyhow::{Context, Result};
use roster_core::ComplexityClassifier;

/// Print the complexity verdict for a request
pub fn run(request: &str, json: bool) -> Result<()> {
    let verdict = ComplexityClassifier::new().classify(request);

    if json {
        let rendered =
            serde_json::to_string_pretty(&verdict).context("Failed to serialize verdict")?;
        println!("{rendered}");
        return Ok(());
    }

    println!(
        "complex: {}  (score {}, team estimate {})",
        if verdict.is_complex { "yes" } else { "no" },
        verdict.score,
        verdict.estimated_team_size
    );
    if !verdict.required_expertise.is_empty() {
        println!("domains: {}", verdict.required_expertise.join(", "));
    }
    println!("reasoning: {}", verdict.reasoning);
    Ok(())
}
