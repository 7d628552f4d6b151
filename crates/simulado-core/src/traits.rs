//! Core trait definitions for LLM providers.
//!
//! The async `LlmProvider` trait is implemented by the `simulado-providers`
//! crate; the question generation client only ever talks to this seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

// ---------------------------------------------------------------------------
// LLM Provider trait
// ---------------------------------------------------------------------------

/// Trait for LLM backends that turn a prompt into structured JSON.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send one generation request.
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ProviderError>;

    /// List available models for this provider.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Request to generate content from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "gemini-2.5-flash").
    pub model: String,
    /// The main prompt.
    pub prompt: String,
    /// Optional system instruction.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// JSON Schema the response must follow, if the backend supports it.
    #[serde(default)]
    pub response_schema: Option<serde_json::Value>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature; `None` keeps the provider default.
    #[serde(default)]
    pub temperature: Option<f64>,
}

/// Response from an LLM generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The raw response text.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub estimated_cost_usd: f64,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
    /// Cost per 1K input tokens in USD.
    pub cost_per_1k_input: f64,
    /// Cost per 1K output tokens in USD.
    pub cost_per_1k_output: f64,
}

// ---------------------------------------------------------------------------
// Markdown JSON extraction
// ---------------------------------------------------------------------------

/// Extract the JSON payload from an LLM response.
///
/// Backends without native structured output sometimes wrap the JSON in
/// Markdown. Handles:
/// - ```json``` blocks (first one wins)
/// - Generic ``` blocks (if no json-specific block is found)
/// - Raw JSON with no markdown (returned trimmed)
pub fn extract_json_payload(response: &str) -> &str {
    let mut generic: Option<&str> = None;
    let mut rest = response;

    while let Some(open) = rest.find("```") {
        let after_fence = &rest[open + 3..];
        let Some(line_end) = after_fence.find('\n') else {
            break;
        };
        let lang = after_fence[..line_end].trim().to_lowercase();
        let body = &after_fence[line_end + 1..];
        let (block, remainder) = match body.find("```") {
            Some(close) => (&body[..close], &body[close + 3..]),
            // Truncated (unclosed) block: take what we have
            None => (body, ""),
        };

        if lang == "json" {
            return block.trim();
        }
        if lang.is_empty() && generic.is_none() {
            generic = Some(block.trim());
        }
        rest = remainder;
    }

    generic.unwrap_or_else(|| response.trim())
}
