//! Question generation client.
//!
//! Builds the prompt and output schema, makes exactly one provider call and
//! validates the result. No retries, no caching.

use std::sync::Arc;

use tracing::instrument;

use crate::error::GenerationError;
use crate::model::{Proficiency, Question, SimulationMode, Subject};
use crate::parser::parse_questions;
use crate::prompt::{build_prompt, question_schema, SYSTEM_PROMPT};
use crate::traits::{GenerateRequest, LlmProvider};

const DEFAULT_MAX_TOKENS: u32 = 16_384;

/// Generates question batches through an [`LlmProvider`].
#[derive(Clone)]
pub struct QuestionGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
    temperature: Option<f64>,
}

impl QuestionGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The request that [`generate`](Self::generate) would send.
    pub fn build_request(
        &self,
        subject: Subject,
        count: u32,
        proficiency: Proficiency,
        mode: SimulationMode,
    ) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt: build_prompt(subject, count, proficiency, mode),
            system_prompt: Some(SYSTEM_PROMPT.to_string()),
            response_schema: Some(question_schema()),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// Generate `count` questions for `subject`, calibrated to `proficiency`.
    #[instrument(skip(self), fields(provider = %self.provider.name(), model = %self.model))]
    pub async fn generate(
        &self,
        subject: Subject,
        count: u32,
        proficiency: Proficiency,
        mode: SimulationMode,
    ) -> Result<Vec<Question>, GenerationError> {
        if count == 0 {
            return Err(GenerationError::InvalidCount(count));
        }

        let request = self.build_request(subject, count, proficiency, mode);
        let response = self.provider.generate(&request).await?;
        let questions = parse_questions(&response.content, subject)?;

        if questions.len() != count as usize {
            tracing::debug!(
                requested = count,
                received = questions.len(),
                "provider returned a different number of questions"
            );
        }
        tracing::info!(
            questions = questions.len(),
            latency_ms = response.latency_ms,
            tokens = response.token_usage.total_tokens,
            "questions generated"
        );

        Ok(questions)
    }
}
