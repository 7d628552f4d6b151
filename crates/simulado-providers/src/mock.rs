//! Mock provider for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use simulado_core::traits::{
    GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage,
};

use crate::error::ProviderError;

/// A mock LLM provider for exercising sessions without real API calls.
///
/// Returns configurable responses based on prompt content matching.
pub struct MockProvider {
    /// Map of prompt substring → response body.
    responses: HashMap<String, String>,
    /// Default response if no prompt matches.
    default_response: String,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with the given prompt→response mappings.
    ///
    /// Unmatched prompts get [`sample_questions`] with five questions.
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            responses,
            default_response: sample_questions(5),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            responses: HashMap::new(),
            default_response: response.to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

/// A JSON array of `n` well-formed questions; question `i` has answer `i % 5`.
pub fn sample_questions(n: usize) -> String {
    let items: Vec<_> = (0..n)
        .map(|i| {
            json!({
                "topic": "Questão de exemplo",
                "statement": format!("Enunciado de exemplo número {}.", i + 1),
                "options": ["Alternativa A", "Alternativa B", "Alternativa C", "Alternativa D", "Alternativa E"],
                "correctIndex": i % 5,
                "explanation": "Explicação de exemplo."
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(request.clone());

        // Find a matching response based on prompt content
        let content = self
            .responses
            .iter()
            .find(|(key, _)| request.prompt.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_response.clone());

        let token_count = (content.len() / 4) as u32; // Rough estimate

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens: (request.prompt.len() / 4) as u32,
                completion_tokens: token_count,
                total_tokens: (request.prompt.len() / 4) as u32 + token_count,
                estimated_cost_usd: 0.0,
            },
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
            cost_per_1k_input: 0.0,
            cost_per_1k_output: 0.0,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use simulado_core::generator::QuestionGenerator;
    use simulado_core::model::{Proficiency, SimulationMode, Subject};

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: "mock".into(),
            prompt: prompt.into(),
            system_prompt: None,
            response_schema: None,
            max_tokens: 100,
            temperature: None,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response("[]");
        let response = provider.generate(&request("anything")).await.unwrap();
        assert_eq!(response.content, "[]");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn prompt_matching() {
        let mut responses = HashMap::new();
        responses.insert("Matemática".to_string(), sample_questions(3));
        responses.insert("Linguagens".to_string(), sample_questions(10));
        let provider = MockProvider::new(responses);

        let generator = QuestionGenerator::new(Arc::new(provider), "mock-model");
        let math = generator
            .generate(Subject::Math, 3, Proficiency::Low, SimulationMode::Standard)
            .await
            .unwrap();
        assert_eq!(math.len(), 3);

        let languages = generator
            .generate(Subject::Languages, 10, Proficiency::High, SimulationMode::Practice)
            .await
            .unwrap();
        assert_eq!(languages.len(), 10);
        assert_eq!(languages[7].correct_index, 2);

        // Unmatched prompts fall back to five questions
        let nature = generator
            .generate(Subject::Nature, 5, Proficiency::Medium, SimulationMode::Standard)
            .await
            .unwrap();
        assert_eq!(nature.len(), 5);
    }

    #[tokio::test]
    async fn records_last_request() {
        let provider = MockProvider::default();
        provider.generate(&request("primeira")).await.unwrap();
        provider.generate(&request("segunda")).await.unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.last_request().unwrap().prompt, "segunda");
    }
}
