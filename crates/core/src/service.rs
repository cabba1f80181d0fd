use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::{
    error::{NotesError, Result},
    provider::{ApiStyle, Provider},
    types::GenerationRequest,
};

/// Seam between the generator and the external generation service.
///
/// Returns `Ok(None)` when the call succeeded but carried no text.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate_text(&self, request: &GenerationRequest) -> Result<Option<String>>;
}

/// HTTP client for the provider's generation endpoint.
pub struct HttpGenerationService {
    client: Client,
    provider: Provider,
    api_key: String,
    base_url: String,
}

impl HttpGenerationService {
    pub fn new(client: Client, provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            client,
            provider,
            api_key: api_key.into(),
            base_url: provider.config().api_url.to_string(),
        }
    }

    /// Point the client at a different host (proxies, test servers).
    ///
    /// For Gemini this is the host root; for chat-completions providers it is
    /// the full endpoint URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    async fn send(&self, request: &GenerationRequest) -> Result<Value> {
        let builder = match self.provider.config().style {
            ApiStyle::GeminiGenerateContent => {
                let url = format!(
                    "{}/v1beta/models/{}:generateContent",
                    self.base_url.trim_end_matches('/'),
                    request.model
                );
                self.client
                    .post(url)
                    .header("x-goog-api-key", &self.api_key)
                    .json(&gemini_body(request))
            }
            ApiStyle::ChatCompletions => self
                .client
                .post(&self.base_url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&chat_completions_body(request)),
        };

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response.text().await);
            return Err(NotesError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn generate_text(&self, request: &GenerationRequest) -> Result<Option<String>> {
        let started = Instant::now();
        tracing::debug!(
            provider = self.provider.name(),
            model = %request.model,
            "sending generation request"
        );

        let result = self.send(request).await;
        match &result {
            Ok(_) => tracing::info!(
                provider = self.provider.name(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "generation request completed"
            ),
            Err(e) => tracing::warn!(
                provider = self.provider.name(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %e,
                "generation request failed"
            ),
        }

        let response = result?;
        Ok(match self.provider.config().style {
            ApiStyle::GeminiGenerateContent => gemini_text(&response),
            ApiStyle::ChatCompletions => chat_completions_text(&response),
        })
    }
}

fn gemini_body(request: &GenerationRequest) -> Value {
    json!({
        "contents": [
            {
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }
        ],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": to_gemini_schema(&request.schema),
        },
    })
}

fn chat_completions_body(request: &GenerationRequest) -> Value {
    json!({
        "model": request.model,
        "messages": [
            {
                "role": "user",
                "content": request.prompt,
            },
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": "study_notes",
                "strict": true,
                "schema": request.schema,
            },
        },
    })
}

/// Gemini's schema dialect: upper-case type names, no `additionalProperties`.
fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| key.as_str() != "additionalProperties")
                .map(|(key, value)| {
                    let value = match (key.as_str(), value) {
                        ("type", Value::String(t)) => Value::String(t.to_ascii_uppercase()),
                        _ => to_gemini_schema(value),
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

/// Body of a failed response, or a placeholder if it could not be read.
fn error_body<E: std::fmt::Display>(body: std::result::Result<String, E>) -> String {
    body.unwrap_or_else(|e| {
        tracing::debug!(error = %e, "failed to read error response body");
        format!("<unreadable body: {e}>")
    })
}

/// Concatenated text parts of the first candidate, if any. Thought parts
/// are skipped.
fn gemini_text(response: &Value) -> Option<String> {
    let text: String = response["candidates"][0]["content"]["parts"]
        .as_array()?
        .iter()
        .filter(|part| !part["thought"].as_bool().unwrap_or(false))
        .filter_map(|part| part["text"].as_str())
        .collect();
    (!text.is_empty()).then_some(text)
}

fn chat_completions_text(response: &Value) -> Option<String> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::study_notes_schema;

    #[test]
    fn gemini_schema_is_upper_cased_and_closed_keys_removed() {
        let schema = to_gemini_schema(&study_notes_schema());
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["summary"]["type"], "STRING");
        assert_eq!(schema["properties"]["keyPoints"]["items"]["type"], "STRING");
        assert!(schema.get("additionalProperties").is_none());
        assert_eq!(schema["required"][1], "keyPoints");
    }

    #[test]
    fn gemini_text_joins_parts_of_first_candidate() {
        let response = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "{\"summary\":" }, { "text": "\"x\"}" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        });
        assert_eq!(gemini_text(&response).as_deref(), Some("{\"summary\":\"x\"}"));
    }

    #[test]
    fn gemini_text_skips_thought_parts() {
        let response = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "thinking...", "thought": true },
                        { "text": "{}" }
                    ]
                }
            }]
        });
        assert_eq!(gemini_text(&response).as_deref(), Some("{}"));

        let only_thoughts = json!({
            "candidates": [{ "content": { "parts": [{ "text": "hmm", "thought": true }] } }]
        });
        assert_eq!(gemini_text(&only_thoughts), None);
    }

    #[test]
    fn unreadable_error_body_keeps_a_placeholder() {
        assert_eq!(error_body::<String>(Ok("quota exceeded".to_string())), "quota exceeded");

        let body = error_body(Err("connection reset"));
        assert_eq!(body, "<unreadable body: connection reset>");
    }

    #[test]
    fn gemini_text_is_none_without_candidates_or_text() {
        assert_eq!(gemini_text(&json!({})), None);
        assert_eq!(gemini_text(&json!({ "candidates": [] })), None);
        assert_eq!(
            gemini_text(&json!({ "candidates": [{ "content": { "parts": [{ "text": "" }] } }] })),
            None
        );
    }

    #[test]
    fn chat_completions_text_handles_null_content() {
        let response = json!({ "choices": [{ "message": { "content": null } }] });
        assert_eq!(chat_completions_text(&response), None);

        let response = json!({ "choices": [{ "message": { "content": "{}" } }] });
        assert_eq!(chat_completions_text(&response).as_deref(), Some("{}"));
    }

    #[test]
    fn chat_completions_body_requests_strict_json_schema() {
        let request = GenerationRequest {
            model: "gpt-5.1".to_string(),
            prompt: "notes".to_string(),
            schema: study_notes_schema(),
        };
        let body = chat_completions_body(&request);
        assert_eq!(body["model"], "gpt-5.1");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
    }
}
