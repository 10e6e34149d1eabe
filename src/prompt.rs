//! Prompt construction for insurance document summaries.

use crate::extract::DocumentText;
use crate::schema::RESPONSE_SCHEMA;
use serde_json::Value;

/// Instruction block placed before the document text.
///
/// The "N/A" / empty list convention stated here is what
/// [`crate::summary::SummaryResult::from_json`] fills in when the model leaves
/// a member out anyway.
const INSTRUCTIONS: &str = r#"You are an AI assistant specialized in summarizing insurance documents.
Please read the following insurance document and extract the following information in a structured JSON format:
1.  A concise overall 'summary' of the document.
2.  A list of 'coverages' provided by the policy.
3.  A list of 'exclusions' (what is not covered) by the policy.
4.  'policyDetails' as an object containing:
    -   'policyNumber' (if found)
    -   'policyHolder' (if found)
    -   'effectiveDate' (if found, e.g., "YYYY-MM-DD")
    -   'expirationDate' (if found, e.g., "YYYY-MM-DD")
    -   'premium' (if found, e.g., "USD 1200" or "1200 per year")
    -   'otherDetails' (a list of any other significant policy details not covered above).

If a piece of information is not explicitly found, use "N/A" for strings or an empty list for arrays.
Ensure the output is valid JSON."#;

/// Prompt text plus the schema the model should answer in.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub prompt: String,
    pub schema: &'static Value,
}

/// Build the request for a document. Pure: the same text gives the same request.
pub fn build(document: &DocumentText) -> SummaryRequest {
    SummaryRequest {
        prompt: format!(
            "{INSTRUCTIONS}\n\nDocument:\n---\n{}\n---\n",
            document.as_str()
        ),
        schema: &RESPONSE_SCHEMA,
    }
}
