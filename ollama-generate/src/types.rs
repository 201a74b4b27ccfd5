//! Ollama `/api/generate` request and response types.
//!
//! Key differences from the `/api/chat` endpoint:
//! - A single `prompt` string instead of a message list
//! - Generated text lives in a top-level `response` field
//! - `temperature` is carried at the top level of the request body
//! - The same response shape serves both modes: one complete object in
//!   non-streaming mode, one NDJSON record per line in streaming mode

use serde::{Deserialize, Serialize};

/// Ollama `/api/generate` request body.
#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "phi3").
    pub model: String,
    /// The prompt to generate a completion for.
    pub prompt: String,
    /// Sampling temperature. Omitted to use the server default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Whether to stream the response as NDJSON records.
    pub stream: bool,
    /// How long to keep the model loaded in memory (e.g. "5m", "0").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
}

/// Ollama `/api/generate` response body.
///
/// In non-streaming mode this is the whole response. In streaming mode each
/// NDJSON line deserializes to one of these; intermediate records carry a
/// fragment in `response` with `done: false`, and the final record carries
/// `done: true` plus the timing and token-count fields.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    /// Model that generated the response.
    #[serde(default)]
    pub model: String,
    /// Generated text: the full completion (non-streaming) or one incremental
    /// fragment (streaming).
    #[serde(default)]
    pub response: String,
    /// Whether generation is complete.
    #[serde(default)]
    pub done: bool,
    /// Why generation stopped (e.g. "stop", "length").
    #[serde(default)]
    pub done_reason: Option<String>,
    /// Total time spent on the request in nanoseconds.
    #[serde(default)]
    pub total_duration: Option<u64>,
    /// Time spent loading the model in nanoseconds.
    #[serde(default)]
    pub load_duration: Option<u64>,
    /// Number of tokens in the prompt.
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    /// Time spent evaluating the prompt in nanoseconds.
    #[serde(default)]
    pub prompt_eval_duration: Option<u64>,
    /// Number of tokens generated.
    #[serde(default)]
    pub eval_count: Option<u64>,
    /// Time spent generating the response in nanoseconds.
    #[serde(default)]
    pub eval_duration: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_temperature_at_top_level() {
        let request = GenerateRequest {
            model: "phi3".into(),
            prompt: "Explica embeddings".into(),
            temperature: Some(0.8),
            stream: false,
            keep_alive: None,
        };
        let json = serde_json::to_value(&request).expect("serializes");
        assert_eq!(json["model"], "phi3");
        assert_eq!(json["prompt"], "Explica embeddings");
        assert_eq!(json["temperature"], 0.8);
        assert_eq!(json["stream"], false);
        assert!(json.get("keep_alive").is_none());
    }

    #[test]
    fn request_omits_unset_temperature() {
        let request = GenerateRequest {
            model: "phi3".into(),
            prompt: "Hi".into(),
            temperature: None,
            stream: true,
            keep_alive: Some("5m".into()),
        };
        let json = serde_json::to_value(&request).expect("serializes");
        assert!(json.get("temperature").is_none());
        assert_eq!(json["keep_alive"], "5m");
    }

    #[test]
    fn response_parses_minimal_body() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"response":"Hola"}"#).expect("parses");
        assert_eq!(response.response, "Hola");
        assert!(!response.done);
        assert!(response.eval_count.is_none());
    }

    #[test]
    fn response_parses_final_record_fields() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"model":"phi3","response":"","done":true,"done_reason":"stop","total_duration":5000000000,"prompt_eval_count":20,"eval_count":10}"#,
        )
        .expect("parses");
        assert!(response.done);
        assert_eq!(response.done_reason.as_deref(), Some("stop"));
        assert_eq!(response.prompt_eval_count, Some(20));
        assert_eq!(response.eval_count, Some(10));
        assert_eq!(response.total_duration, Some(5_000_000_000));
    }
}
