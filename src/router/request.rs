//! Provider call descriptor.

use crate::types::{Message, ResponseFormat};

/// One in-flight completion request.
///
/// Constructed per call attempt and never mutated: a fallback substitution
/// supersedes it via [`with_model`](Self::with_model) rather than editing it
/// in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Logical model name; maps to exactly one backend via the routing table.
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub response_format: ResponseFormat,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            response_format: ResponseFormat::Text,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    /// A copy of this request aimed at a substitute model.
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }

    /// Rough token estimate used for rate-limit admission and balance holds:
    /// ~4 characters per input token, plus the full output allowance.
    pub fn estimated_tokens(&self) -> u64 {
        let input: u64 = self
            .messages
            .iter()
            .map(|m| m.content.len() as u64 / 4 + 4)
            .sum();
        input + u64::from(self.max_tokens.unwrap_or(1_024))
    }
}
