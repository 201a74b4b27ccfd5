//! Ollama API client struct and builder.

use crate::error::{OllamaError, map_http_status, map_reqwest_error};
use crate::streaming::{GenerateStream, stream_generate};
use crate::types::{GenerateRequest, GenerateResponse};

/// Default model used when none is configured.
const DEFAULT_MODEL: &str = "phi3";

/// Default Ollama API base URL.
const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Client for the Ollama `/api/generate` API.
///
/// Holds the request configuration: model, base URL, sampling temperature.
/// One instance serves any number of sequential requests; the underlying
/// HTTP client is shared.
///
/// # Example
///
/// ```no_run
/// use ollama_generate::Ollama;
///
/// let client = Ollama::new()
///     .model("phi3")
///     .temperature(0.8)
///     .base_url("http://localhost:11434");
/// ```
pub struct Ollama {
    /// Model identifier sent with each request.
    pub(crate) model: String,
    /// API base URL (override for testing or remote Ollama instances).
    pub(crate) base_url: String,
    /// Sampling temperature; `None` uses the server default.
    pub(crate) temperature: Option<f64>,
    /// Optional keep_alive duration string (e.g. "5m", "0" to unload).
    pub(crate) keep_alive: Option<String>,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl Ollama {
    /// Create a new client with sensible defaults.
    ///
    /// Default model: `phi3`. Default base URL: `http://localhost:11434`.
    /// No authentication required (Ollama is local).
    #[must_use]
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            temperature: None,
            keep_alive: None,
            client: reqwest::Client::new(),
        }
    }

    /// Override the default model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL.
    ///
    /// Useful for testing with a local mock server or a remote Ollama
    /// instance.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the sampling temperature.
    ///
    /// When not set, Ollama uses its server default.
    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the keep_alive duration for model memory residency.
    ///
    /// Examples: `"5m"` (keep for 5 minutes), `"0"` (unload immediately after
    /// the request). When not set, Ollama uses its server default.
    #[must_use]
    pub fn keep_alive(mut self, duration: impl Into<String>) -> Self {
        self.keep_alive = Some(duration.into());
        self
    }

    /// Build the generate endpoint URL.
    pub(crate) fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    fn build_request(&self, prompt: impl Into<String>, stream: bool) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.into(),
            temperature: self.temperature,
            stream,
            keep_alive: self.keep_alive.clone(),
        }
    }

    /// Send a blocking generate request and return the complete response.
    ///
    /// Sends the request with `stream: false` and reads the whole body as a
    /// single JSON object; the generated text is in
    /// [`GenerateResponse::response`].
    pub async fn generate(
        &self,
        prompt: impl Into<String>,
    ) -> Result<GenerateResponse, OllamaError> {
        let url = self.generate_url();
        let body = self.build_request(prompt, false);

        tracing::debug!(url = %url, model = %body.model, "sending generate request to Ollama");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let response_text = response.text().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            return Err(map_http_status(status, &response_text));
        }

        serde_json::from_str(&response_text)
            .map_err(|e| OllamaError::InvalidResponse(format!("invalid JSON response: {e}")))
    }

    /// Send a streaming generate request.
    ///
    /// Sends the request with `stream: true` and returns a [`GenerateStream`]
    /// that decodes the NDJSON body incrementally as it is polled. An HTTP
    /// error status is detected and mapped before any streaming begins.
    pub async fn generate_stream(
        &self,
        prompt: impl Into<String>,
    ) -> Result<GenerateStream, OllamaError> {
        let url = self.generate_url();
        let body = self.build_request(prompt, true);

        tracing::debug!(url = %url, model = %body.model, "sending streaming generate request to Ollama");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.map_err(map_reqwest_error)?;
            return Err(map_http_status(status, &body_text));
        }

        Ok(stream_generate(response))
    }
}

impl Default for Ollama {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_is_set() {
        let client = Ollama::new();
        assert_eq!(client.model, DEFAULT_MODEL);
    }

    #[test]
    fn default_base_url_is_set() {
        let client = Ollama::new();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn builder_overrides_model() {
        let client = Ollama::new().model("mistral");
        assert_eq!(client.model, "mistral");
    }

    #[test]
    fn builder_overrides_base_url() {
        let client = Ollama::new().base_url("http://remote:11434");
        assert_eq!(client.base_url, "http://remote:11434");
    }

    #[test]
    fn builder_sets_temperature() {
        let client = Ollama::new().temperature(0.8);
        assert_eq!(client.temperature, Some(0.8));
    }

    #[test]
    fn temperature_defaults_to_none() {
        let client = Ollama::new();
        assert!(client.temperature.is_none());
    }

    #[test]
    fn builder_sets_keep_alive() {
        let client = Ollama::new().keep_alive("5m");
        assert_eq!(client.keep_alive, Some("5m".to_string()));
    }

    #[test]
    fn generate_url_includes_path() {
        let client = Ollama::new().base_url("http://localhost:9999");
        assert_eq!(client.generate_url(), "http://localhost:9999/api/generate");
    }

    #[test]
    fn build_request_carries_configuration() {
        let client = Ollama::new().model("phi3").temperature(0.8);
        let request = client.build_request("Explica embeddings", true);
        assert_eq!(request.model, "phi3");
        assert_eq!(request.prompt, "Explica embeddings");
        assert_eq!(request.temperature, Some(0.8));
        assert!(request.stream);
        assert!(request.keep_alive.is_none());
    }

    #[test]
    fn default_impl_matches_new() {
        let client = Ollama::default();
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }
}
