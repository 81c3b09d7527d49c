//! Pattern-based recurring task detection

use super::delegates::WorkflowDetector;
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pattern → workflow mapping from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowPattern {
    /// Regex matched case-insensitively against the request
    pub pattern: String,
    /// Workflow started on match
    pub workflow_id: String,
}

/// Detector matching requests against configured patterns in order
#[derive(Debug, Clone, Default)]
pub struct PatternWorkflowDetector {
    patterns: Vec<(Regex, String)>,
}

impl PatternWorkflowDetector {
    /// Compile configured patterns
    ///
    /// # Errors
    /// `Error::Configuration` for an invalid regex.
    pub fn new(patterns: &[WorkflowPattern]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(&format!("(?i){}", p.pattern))
                    .map(|regex| (regex, p.workflow_id.clone()))
                    .map_err(|e| {
                        Error::Configuration(format!(
                            "invalid workflow pattern '{}': {}",
                            p.pattern, e
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Number of patterns
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether no patterns are configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl WorkflowDetector for PatternWorkflowDetector {
    fn detect(&self, request: &str) -> Option<String> {
        let found = self
            .patterns
            .iter()
            .find(|(regex, _)| regex.is_match(request))
            .map(|(_, workflow_id)| workflow_id.clone());
        if let Some(workflow_id) = &found {
            debug!(workflow_id = %workflow_id, "Recurring task pattern matched");
        }
        found
    }
}
