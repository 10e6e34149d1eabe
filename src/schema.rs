//! The response schema sent to Gemini.
//!
//! This is the one place the shape of a summary is defined. The field order here
//! is the property order the model is asked to produce, and any change to the
//! fields must bump [`SCHEMA_VERSION`].

use lazy_static::lazy_static;
use serde_json::{json, Map, Value};

/// Version of the summary shape below
pub const SCHEMA_VERSION: u32 = 1;

/// Type of a single schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextList,
    Object(&'static [Field]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn text(name: &'static str) -> Field {
    Field {
        name,
        kind: FieldKind::Text,
    }
}

const fn list(name: &'static str) -> Field {
    Field {
        name,
        kind: FieldKind::TextList,
    }
}

pub const POLICY_DETAIL_FIELDS: &[Field] = &[
    text("policyNumber"),
    text("policyHolder"),
    text("effectiveDate"),
    text("expirationDate"),
    text("premium"),
    list("otherDetails"),
];

pub const SUMMARY_FIELDS: &[Field] = &[
    text("summary"),
    list("coverages"),
    list("exclusions"),
    Field {
        name: "policyDetails",
        kind: FieldKind::Object(POLICY_DETAIL_FIELDS),
    },
];

lazy_static! {
    /// `responseSchema` value for the `generateContent` request
    pub static ref RESPONSE_SCHEMA: Value = object_schema(SUMMARY_FIELDS);
}

fn object_schema(fields: &[Field]) -> Value {
    let mut properties = Map::new();
    for field in fields {
        properties.insert(field.name.to_string(), field_schema(field.kind));
    }
    let ordering: Vec<&str> = fields.iter().map(|f| f.name).collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "propertyOrdering": ordering,
    })
}

fn field_schema(kind: FieldKind) -> Value {
    match kind {
        FieldKind::Text => json!({ "type": "STRING" }),
        FieldKind::TextList => json!({
            "type": "ARRAY",
            "items": { "type": "STRING" },
        }),
        FieldKind::Object(fields) => object_schema(fields),
    }
}
