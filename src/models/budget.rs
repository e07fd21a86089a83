//! Budget reference data
//!
//! Budget limits are supplied by an external collaborator and consumed by
//! the classifier in budget-relative mode.

use serde::{Deserialize, Deserializer, Serialize};

use super::transaction::UNCATEGORIZED;

/// A spending limit for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLimit {
    /// Category name, trimmed the way the normalizer trims record categories
    #[serde(deserialize_with = "deserialize_category")]
    pub category: String,

    /// Limit for the category; zero or negative means "no usable reference"
    #[serde(alias = "amount")]
    pub limit_amount: f64,
}

impl BudgetLimit {
    pub fn new(category: impl Into<String>, limit_amount: f64) -> Self {
        Self {
            category: clean_category(&category.into()),
            limit_amount,
        }
    }

    /// Whether the limit can serve as a classification reference
    pub fn has_reference(&self) -> bool {
        self.limit_amount.is_finite() && self.limit_amount > 0.0
    }
}

fn clean_category(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNCATEGORIZED.to_string()
    } else {
        trimmed.to_string()
    }
}

fn deserialize_category<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(clean_category(&raw))
}
