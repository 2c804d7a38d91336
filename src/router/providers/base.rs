//! Shared wire types for OpenAI-compatible chat completion backends.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::router::request::CompletionRequest;
use crate::types::{CompletionResponse, ResponseFormat, Role, TokenUsage};
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: Option<String>,
    choices: Vec<Choice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: WireErrorBody,
}

#[derive(Debug, Deserialize)]
struct WireErrorBody {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

pub(super) fn chat_payload(request: &CompletionRequest, model: &str) -> serde_json::Value {
    let messages: Vec<_> = request
        .messages
        .iter()
        .map(|m| json!({ "role": role_str(m.role), "content": m.content }))
        .collect();

    let mut payload = json!({
        "model": model,
        "messages": messages,
    });
    if let Some(t) = request.temperature {
        payload["temperature"] = json!(t);
    }
    if let Some(mt) = request.max_tokens {
        payload["max_tokens"] = json!(mt);
    }
    if request.response_format == ResponseFormat::JsonObject {
        payload["response_format"] = json!({ "type": "json_object" });
    }
    payload
}

fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// POST an OpenAI-compatible chat payload and normalize the result.
pub(super) async fn send_chat(
    http: &reqwest::Client,
    url: &str,
    api_key: &str,
    request: &CompletionRequest,
    model: &str,
    billing_multiplier_pct: u64,
) -> Result<CompletionResponse> {
    let response = http
        .post(url)
        .bearer_auth(api_key)
        .header("content-type", "application/json")
        .json(&chat_payload(request, model))
        .send()
        .await?;

    let status = response.status();
    if status.as_u16() == 429 {
        return Err(Error::RateLimit {
            retry_after: retry_after(&response),
        });
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let (message, error_type) = match serde_json::from_str::<WireError>(&body) {
            Ok(e) => (e.error.message, e.error.kind),
            Err(_) => (body, None),
        };
        return Err(Error::Api {
            message,
            status: Some(status.as_u16()),
            error_type,
        });
    }

    let parsed: ChatResponse = response.json().await?;
    let content = parsed
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .ok_or_else(|| Error::Api {
            message: "response contained no choices".to_string(),
            status: None,
            error_type: None,
        })?;
    let usage = parsed.usage.unwrap_or(WireUsage {
        prompt_tokens: 0,
        completion_tokens: 0,
    });

    Ok(CompletionResponse {
        content,
        model: parsed.model.unwrap_or_else(|| model.to_string()),
        usage: TokenUsage::from_raw(
            usage.prompt_tokens,
            usage.completion_tokens,
            billing_multiplier_pct,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[test]
    fn test_payload_shape() {
        let request = CompletionRequest::new("m", vec![Message::user("hi")])
            .with_temperature(0.2)
            .with_max_tokens(256)
            .with_response_format(ResponseFormat::JsonObject);
        let payload = chat_payload(&request, "actual-model");

        assert_eq!(payload["model"], "actual-model");
        assert_eq!(payload["messages"][0]["role"], "user");
        assert_eq!(payload["temperature"], 0.2);
        assert_eq!(payload["max_tokens"], 256);
        assert_eq!(payload["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_payload_omits_unset_fields() {
        let request = CompletionRequest::new("m", vec![Message::user("hi")]);
        let payload = chat_payload(&request, "m");
        assert!(payload.get("temperature").is_none());
        assert!(payload.get("response_format").is_none());
    }
}
