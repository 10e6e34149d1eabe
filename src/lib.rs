//! # policy-summa
//!
//! Summarise insurance documents with Gemini.
//!
//! ## Features
//!
//! - **Two input formats**: plain text and PDF, extracted page by page
//! - **Structured output**: a typed `SummaryResult` with coverages, exclusions and policy details
//! - **Schema-constrained requests**: the model is asked to answer in a fixed, versioned JSON schema
//! - **No partial results**: every failure is a typed `Failure` carrying its raw diagnostic

pub mod config;
pub mod extract;
pub mod gemini;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod schema;
pub mod session;
pub mod summary;

pub use config::Config;
pub use extract::{DocumentText, Upload};
pub use gemini::GeminiClient;
pub use pipeline::{Failure, Pipeline, Summarizer};
pub use session::Session;
pub use summary::SummaryResult;
