//! Prompt templates for the collaboration phases

use crate::agents::Agent;

/// Final answer when no agent could be shortlisted
pub const EMPTY_TEAM_ANSWER: &str =
    "No agents were available to work on this request. Please try again later.";

pub(crate) fn contribution_system_prompt(agent: &Agent, team: &[&str]) -> String {
    format!(
        "{persona}\n\nYou are part of a team working on the user's request together with: {team}. \
         Contribute only from your own specialty. Be concise and concrete; another agent will \
         merge the team's contributions.",
        persona = agent.persona_prompt(),
        team = team.join(", "),
    )
}

pub(crate) fn discussion_prompt(request: &str, other_name: &str, other_content: &str) -> String {
    format!(
        "The team is working on this request:\n{request}\n\n\
         {other_name} contributed:\n{other_content}\n\n\
         React briefly from your specialty: point out one gap, risk or improvement, \
         or ask one clarifying question."
    )
}

pub(crate) const SYNTHESIS_SYSTEM_PROMPT: &str = "You are the supervisor of a team of specialist \
agents. Merge their contributions into one coherent answer for the user. Remove repetition, \
resolve contradictions, keep every useful detail, and briefly acknowledge that several \
specialists collaborated on the answer.";

pub(crate) fn synthesis_prompt(request: &str, contributions: &[(String, String)]) -> String {
    let sections = contributions
        .iter()
        .map(|(name, content)| format!("### {name}\n{content}"))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("User request:\n{request}\n\nTeam contributions:\n\n{sections}")
}

pub(crate) fn fallback_contribution(agent: &Agent) -> String {
    let focus = if agent.expertise.is_empty() {
        "my specialty".to_string()
    } else {
        agent.expertise.join(" and ")
    };
    format!(
        "{} could not complete a detailed analysis right now, but recommends reviewing this \
         request from a {} perspective.",
        agent.name, focus
    )
}

/// Deterministic concatenation of contributions
pub(crate) fn fallback_synthesis(contributions: &[(String, String)]) -> String {
    contributions
        .iter()
        .map(|(name, content)| format!("## {name}\n{content}"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_synthesis_format() {
        let contributions = vec![
            ("A".to_string(), "one".to_string()),
            ("B".to_string(), "two".to_string()),
        ];
        assert_eq!(fallback_synthesis(&contributions), "## A\none\n\n## B\ntwo");
    }

    #[test]
    fn test_fallback_contribution_mentions_expertise() {
        let agent = Agent::new("a", "Alpha", "desc").with_expertise(["design"]);
        let text = fallback_contribution(&agent);
        assert!(text.starts_with("Alpha"));
        assert!(text.contains("design perspective"));
    }
}
