//! Shared request/response types.

use serde::{Deserialize, Serialize};

/// Who authored a message in a completion conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn in the message list sent to a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Desired shape of the completion output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    #[default]
    Text,
    JsonObject,
}

/// Normalized token usage for one completed provider call.
///
/// Raw counters come from the backend; billing counters carry the provider's
/// billing multiplier so that every account debit downstream uses the same
/// unit regardless of which backend executed the call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub billing_input_tokens: u64,
    pub billing_output_tokens: u64,
    pub total_billing_tokens: u64,
}

impl TokenUsage {
    /// Normalize raw backend counters, applying the provider's billing
    /// multiplier (expressed in hundredths, so 100 = 1x and 200 = 2x, keeping
    /// the arithmetic integral).
    pub fn from_raw(input_tokens: u64, output_tokens: u64, billing_multiplier_pct: u64) -> Self {
        let billing_input = input_tokens * billing_multiplier_pct / 100;
        let billing_output = output_tokens * billing_multiplier_pct / 100;
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            billing_input_tokens: billing_input,
            billing_output_tokens: billing_output,
            total_billing_tokens: billing_input + billing_output,
        }
    }
}

/// Provider-independent completion result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text (or a URL/base64 payload for image backends).
    pub content: String,
    /// Model that actually served the call (may differ from the requested
    /// model after fallback).
    pub model: String,
    pub usage: TokenUsage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_normalization_identity() {
        let usage = TokenUsage::from_raw(1_000, 500, 100);
        assert_eq!(usage.total_tokens, 1_500);
        assert_eq!(usage.billing_input_tokens, 1_000);
        assert_eq!(usage.total_billing_tokens, 1_500);
    }

    #[test]
    fn test_usage_normalization_double_billing() {
        let usage = TokenUsage::from_raw(1_000, 500, 200);
        assert_eq!(usage.total_tokens, 1_500);
        assert_eq!(usage.billing_input_tokens, 2_000);
        assert_eq!(usage.billing_output_tokens, 1_000);
        assert_eq!(usage.total_billing_tokens, 3_000);
    }

    #[test]
    fn test_message_constructors() {
        let msg = Message::user("hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "hello");
    }
}
