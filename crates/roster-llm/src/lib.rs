//! Roster LLM - Model backend abstraction
//!
//! This crate provides the model backend client used by the roster core:
//! - Provider: the `LlmProvider` trait every backend implements
//! - Router: named provider registry with a default ("inherit") provider
//! - OpenAI-compatible: HTTP provider for `/chat/completions` backends
//! - Mock: scriptable provider for tests and offline runs
//! - Cost: per-model pricing and cost estimation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod cost;
pub mod error;
pub mod message;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod router;

pub use completion::{CompletionRequest, CompletionResponse, TokenUsage};
pub use cost::{estimate_cost, ModelPricing};
pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use mock::MockProvider;
pub use openai::{OpenAiCompatibleConfig, OpenAiCompatibleProvider};
pub use provider::LlmProvider;
pub use router::LlmRouter;
