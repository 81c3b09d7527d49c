//! Cost estimation for model calls
//!
//! Prices are USD per 1M tokens. Unknown models are priced at a default rate
//! so that estimates are never zero for real usage.

use crate::completion::TokenUsage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Default cost per 1M input tokens (USD) for unknown models
const DEFAULT_INPUT_COST_PER_MILLION: f64 = 5.0;

/// Default cost per 1M output tokens (USD) for unknown models
const DEFAULT_OUTPUT_COST_PER_MILLION: f64 = 15.0;

/// Pricing information for a model (per 1M tokens)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Model name
    pub model: String,
    /// Cost per 1M input tokens (USD)
    pub input_cost_per_million: f64,
    /// Cost per 1M output tokens (USD)
    pub output_cost_per_million: f64,
}

impl ModelPricing {
    fn new(model: &str, input: f64, output: f64) -> Self {
        Self {
            model: model.to_string(),
            input_cost_per_million: input,
            output_cost_per_million: output,
        }
    }

    /// Calculate cost for given token counts
    #[must_use]
    pub fn calculate_cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        let input_cost = (input_tokens as f64 / 1_000_000.0) * self.input_cost_per_million;
        let output_cost = (output_tokens as f64 / 1_000_000.0) * self.output_cost_per_million;
        input_cost + output_cost
    }
}

static PRICING: LazyLock<HashMap<String, ModelPricing>> = LazyLock::new(default_pricing);

/// Default pricing for common models
#[must_use]
pub fn default_pricing() -> HashMap<String, ModelPricing> {
    [
        ModelPricing::new("gpt-4o", 2.50, 10.00),
        ModelPricing::new("gpt-4o-mini", 0.15, 0.60),
        ModelPricing::new("gpt-4.1", 2.00, 8.00),
        ModelPricing::new("gpt-4.1-mini", 0.40, 1.60),
        ModelPricing::new("claude-sonnet-4-20250514", 3.00, 15.00),
        ModelPricing::new("claude-3-5-haiku-latest", 0.80, 4.00),
        ModelPricing::new("gemini-2.0-flash", 0.10, 0.40),
        ModelPricing::new("llama-3.3-70b-versatile", 0.59, 0.79),
        ModelPricing::new("mock-model", 0.0, 0.0),
    ]
    .into_iter()
    .map(|p| (p.model.clone(), p))
    .collect()
}

/// Look up pricing for a model
#[must_use]
pub fn pricing_for(model: &str) -> Option<&'static ModelPricing> {
    PRICING.get(model)
}

/// Estimate the USD cost of a call
#[must_use]
pub fn estimate_cost(model: &str, usage: &TokenUsage) -> f64 {
    match pricing_for(model) {
        Some(pricing) => pricing.calculate_cost(usage.prompt_tokens, usage.completion_tokens),
        None => {
            let input = (usage.prompt_tokens as f64 / 1_000_000.0) * DEFAULT_INPUT_COST_PER_MILLION;
            let output =
                (usage.completion_tokens as f64 / 1_000_000.0) * DEFAULT_OUTPUT_COST_PER_MILLION;
            input + output
        }
    }
}
