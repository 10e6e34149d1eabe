//! Document-to-summary pipeline: extract, build the prompt, summarize.

use crate::extract::{self, DocumentText, ExtractError, Upload};
use crate::gemini::SummarizeError;
use crate::prompt::{self, SummaryRequest};
use crate::summary::SummaryResult;
use async_trait::async_trait;
use thiserror::Error;

/// Anything that can turn a summary request into a result.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResult, SummarizeError>;
}

#[async_trait]
impl<S: Summarizer + ?Sized> Summarizer for &S {
    async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResult, SummarizeError> {
        (**self).summarize(request).await
    }
}

/// Why a run produced no summary. All variants are recoverable: the user can
/// fix the upload or simply run again.
#[derive(Error, Debug)]
pub enum Failure {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("could not extract any content from {0}")]
    EmptyDocument(String),
    #[error(transparent)]
    Summarize(#[from] SummarizeError),
}

impl Failure {
    /// Raw text kept for diagnosis: the API error body, the response envelope,
    /// or the undecodable model output.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Failure::Summarize(SummarizeError::Api { body, .. }) => Some(body.as_str()),
            Failure::Summarize(SummarizeError::EmptyResponse { envelope }) => Some(envelope.as_str()),
            Failure::Summarize(SummarizeError::Decode { raw, .. }) => Some(raw.as_str()),
            _ => None,
        }
    }

    /// Whether the failure happened before any network call
    pub fn is_local(&self) -> bool {
        matches!(self, Failure::Extract(_) | Failure::EmptyDocument(_))
    }
}

/// Extract the text of an upload, refusing documents with nothing in them
pub fn prepare(upload: &Upload) -> Result<DocumentText, Failure> {
    let text = extract::extract(upload)?;
    if text.is_blank() {
        tracing::warn!(name = %upload.name, "no content extracted");
        return Err(Failure::EmptyDocument(upload.name.clone()));
    }
    Ok(text)
}

pub struct Pipeline<S> {
    summarizer: S,
}

impl<S: Summarizer> Pipeline<S> {
    pub fn new(summarizer: S) -> Self {
        Self { summarizer }
    }

    /// Run the whole pipeline once. No retries.
    pub async fn run(&self, upload: &Upload) -> Result<SummaryResult, Failure> {
        let text = prepare(upload)?;
        let request = prompt::build(&text);
        let result = self.summarizer.summarize(&request).await?;
        tracing::info!(
            coverages = result.coverages.len(),
            exclusions = result.exclusions.len(),
            "summary ready"
        );
        Ok(result)
    }
}
