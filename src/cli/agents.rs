//! `roster agents`

use crate::app::App;
use anyhow::{Context, Result};
use roster_core::{Agent, ModelBinding};

/// List the loaded agent directory
pub async fn run(json: bool) -> Result<()> {
    let app = App::bootstrap().await?;
    let agents = app.directory.agents().context("Agent directory not loaded")?;

    if json {
        let rendered = serde_json::to_string_pretty(agents).context("Failed to serialize agents")?;
        println!("{rendered}");
        return Ok(());
    }

    println!(
        "{} agents from {} (default provider: {})\n",
        agents.len(),
        app.config.agents.dir,
        app.router.default_provider_name()
    );
    for agent in agents {
        println!("{}", describe(agent));
    }
    Ok(())
}

fn describe(agent: &Agent) -> String {
    let tools: Vec<&str> = agent.tools.iter().map(|tool| tool.as_str()).collect();
    let model = match &agent.model {
        ModelBinding::Inherit => "inherit".to_string(),
        ModelBinding::Specific { provider, model } => match model {
            Some(model) => format!("{provider}/{model}"),
            None => provider.clone(),
        },
    };
    format!(
        "{:<22} {}\n{:<22} expertise: {}  tools: {}  model: {}",
        agent.id,
        agent.description,
        "",
        agent.expertise.join(", "),
        if tools.is_empty() { "-".to_string() } else { tools.join(", ") },
        model
    )
}
