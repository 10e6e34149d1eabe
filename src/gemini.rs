//! Gemini `generateContent` client.
//!
//! One POST per summary, no retries. Every way the call can go wrong comes back
//! as a [`SummarizeError`]; the raw reply is kept on the variants where a human
//! needs it to see what the model actually said.

use crate::config::{Config, ConfigError};
use crate::pipeline::Summarizer;
use crate::prompt::SummaryRequest;
use crate::summary::SummaryResult;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API returned HTTP {status}")]
    Api { status: u16, body: String },
    #[error("could not get a valid response from the summarization model")]
    EmptyResponse { envelope: String },
    #[error("error decoding JSON response from model: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        raw: String,
    },
}

/// `generateContent` request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

impl<'a> From<&'a SummaryRequest> for GenerateContentRequest<'a> {
    fn from(request: &'a SummaryRequest) -> Self {
        Self {
            contents: [Content {
                role: "user",
                parts: [Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: request.schema,
            },
        }
    }
}

pub struct GeminiClient {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Build a client from configuration. Fails if no API key is available.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let api_key = config.api_key()?;

        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Self::new(
            builder.build()?,
            &config.agent.base_url,
            &config.agent.model,
            api_key,
        )
    }

    pub fn new(
        http: Client,
        base_url: &str,
        model: &str,
        api_key: &str,
    ) -> Result<Self, ConfigError> {
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            model
        );
        let endpoint = Url::parse(&endpoint).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            http,
            endpoint,
            api_key: api_key.to_string(),
        })
    }

    fn request_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("key", &self.api_key);
        url
    }

    /// Send one summary request and decode the reply
    pub async fn generate(&self, request: &SummaryRequest) -> Result<SummaryResult, SummarizeError> {
        let body = GenerateContentRequest::from(request);
        tracing::info!(
            endpoint = %self.endpoint,
            prompt_chars = request.prompt.len(),
            "sending generateContent request"
        );

        // Errors carry the request URL, which includes the key.
        let response = self
            .http
            .post(self.request_url())
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)?;
        tracing::debug!(%status, bytes = text.len(), "response received");

        if !status.is_success() {
            tracing::warn!(%status, "summarization API returned an error");
            return Err(SummarizeError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_envelope(&text)
    }
}

#[async_trait]
impl Summarizer for GeminiClient {
    async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResult, SummarizeError> {
        self.generate(request).await
    }
}

/// Decode a successful `generateContent` response body into a summary
pub fn parse_envelope(body: &str) -> Result<SummaryResult, SummarizeError> {
    let envelope: Value = serde_json::from_str(body).map_err(|source| SummarizeError::Decode {
        source,
        raw: body.to_string(),
    })?;

    let Some(text) = candidate_text(&envelope) else {
        if let Some(reason) = envelope.pointer("/promptFeedback/blockReason") {
            tracing::warn!(%reason, "prompt was blocked by the model");
        }
        return Err(SummarizeError::EmptyResponse {
            envelope: serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| body.to_string()),
        });
    };

    SummaryResult::from_json(strip_fence(text)).map_err(|source| {
        tracing::warn!(error = %source, "model output is not a valid summary");
        SummarizeError::Decode {
            source,
            raw: text.to_string(),
        }
    })
}

/// `candidates[0].content.parts[0].text`
fn candidate_text(envelope: &Value) -> Option<&str> {
    envelope
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
}

/// Peel a "```json ... ```" wrapper: exactly the first 7 and last 3 characters.
///
/// Only this one fence shape is recognized. A bare "```" fence or one tagged with
/// another language is passed through and will fail to decode.
pub fn strip_fence(text: &str) -> &str {
    match text
        .strip_prefix(FENCE_OPEN)
        .and_then(|rest| rest.strip_suffix(FENCE_CLOSE))
    {
        Some(inner) => inner.trim(),
        None => text,
    }
}
