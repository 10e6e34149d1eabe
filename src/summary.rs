//! SummaryResult - the structured output of the summarisation model.
//!
//! The model is asked to follow [`crate::schema`], but its reply is never trusted
//! to match it. [`SummaryResult::from_json`] reads the loose JSON once, and every
//! missing or `null` member becomes a sentinel: [`NOT_AVAILABLE`] for text and an
//! empty list for lists. Nothing downstream has to check for absent fields.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel for a text field the document (or the model) did not provide
pub const NOT_AVAILABLE: &str = "N/A";

/// Structured summary of an insurance document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    /// Concise overall summary of the document
    pub summary: String,
    /// What the policy covers, in document order
    pub coverages: Vec<String>,
    /// What the policy does not cover, in document order
    pub exclusions: Vec<String>,
    pub policy_details: PolicyDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDetails {
    pub policy_number: String,
    pub policy_holder: String,
    /// Usually "YYYY-MM-DD"
    pub effective_date: String,
    /// Usually "YYYY-MM-DD"
    pub expiration_date: String,
    /// e.g. "USD 1200" or "1200 per year"
    pub premium: String,
    /// Significant details not covered by the fields above
    pub other_details: Vec<String>,
}

/// The decoded reply was valid JSON but not an object
#[derive(Debug, thiserror::Error)]
#[error("expected a JSON object, found {0}")]
pub struct NotAnObject(&'static str);

impl SummaryResult {
    /// Decode model output text, filling every missing member with its sentinel.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }

    pub fn from_value(value: &Value) -> Result<Self, NotAnObject> {
        if !value.is_object() {
            return Err(NotAnObject(json_kind(value)));
        }
        Ok(Self {
            summary: scalar(value.get("summary")),
            coverages: list(value.get("coverages")),
            exclusions: list(value.get("exclusions")),
            policy_details: PolicyDetails::from_value(value.get("policyDetails")),
        })
    }

    /// True when the model found nothing at all
    pub fn is_empty(&self) -> bool {
        self.summary == NOT_AVAILABLE
            && self.coverages.is_empty()
            && self.exclusions.is_empty()
            && self.policy_details.is_empty()
    }
}

impl PolicyDetails {
    fn from_value(value: Option<&Value>) -> Self {
        let field = |name: &str| value.and_then(|v| v.get(name));
        Self {
            policy_number: scalar(field("policyNumber")),
            policy_holder: scalar(field("policyHolder")),
            effective_date: scalar(field("effectiveDate")),
            expiration_date: scalar(field("expirationDate")),
            premium: scalar(field("premium")),
            other_details: list(field("otherDetails")),
        }
    }

    /// Label/value pairs for the scalar fields, in schema order
    pub fn rows(&self) -> [(&'static str, &str); 5] {
        [
            ("Policy Number", self.policy_number.as_str()),
            ("Policy Holder", self.policy_holder.as_str()),
            ("Effective Date", self.effective_date.as_str()),
            ("Expiration Date", self.expiration_date.as_str()),
            ("Premium", self.premium.as_str()),
        ]
    }

    /// True when every field holds its sentinel
    pub fn is_empty(&self) -> bool {
        self.rows().iter().all(|(_, v)| *v == NOT_AVAILABLE) && self.other_details.is_empty()
    }
}

impl Default for PolicyDetails {
    fn default() -> Self {
        Self::from_value(None)
    }
}

/// Read a text member. Numbers and booleans keep their JSON spelling.
fn scalar(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Read a list member. A lone string is treated as a one-item list.
fn list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| scalar(Some(item)))
            .collect(),
        Some(single) => vec![scalar(Some(single))],
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
