//! Raw transaction records as delivered by the data source
//!
//! Every field is an untyped JSON value: the backend is not trusted to send
//! well-formed numbers, dates or kinds. The aliases accept the field names
//! used by the original HTTP API (`type`, `date`, `userEmail`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ReportResult;

/// An untyped transaction record, prior to normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    #[serde(default, alias = "description", skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,

    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,

    #[serde(default, alias = "date", skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<Value>,

    #[serde(default, alias = "userEmail", skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<Value>,
}

impl RawTransaction {
    /// Parse a batch of raw records from a JSON array
    pub fn parse_batch(json: &str) -> ReportResult<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Render a scalar JSON value as text; `null` and absent values yield `None`
pub(crate) fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
