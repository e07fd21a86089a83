//! Record normalization
//!
//! Turns untyped records from the data source into canonical
//! [`Transaction`]s. Per-field failures never abort the batch: the field is
//! defaulted and the problem is recorded on the transaction.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::debug;

use crate::models::raw::scalar_text;
use crate::models::{RawTransaction, RecordIssue, Transaction, TransactionKind, UNCATEGORIZED};

/// Currency symbols tolerated in front of an amount
const CURRENCY_PREFIXES: [char; 4] = ['$', '₹', '€', '£'];

/// Naive timestamp layouts tried after RFC 3339
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Normalize a batch of raw records, preserving order
pub fn normalize(raw: &[RawTransaction]) -> Vec<Transaction> {
    let transactions: Vec<Transaction> = raw
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_record(index, record))
        .collect();

    let flagged = transactions.iter().filter(|t| !t.is_valid()).count();
    if flagged > 0 {
        debug!(total = transactions.len(), flagged, "normalized batch with flagged records");
    }

    transactions
}

/// Normalize a single raw record
///
/// `index` is only used for diagnostics.
pub fn normalize_record(index: usize, raw: &RawTransaction) -> Transaction {
    let mut issues = Vec::new();

    let amount = match parse_amount(raw.amount.as_ref()) {
        Ok(amount) => amount,
        Err(issue) => {
            issues.push(issue);
            0.0
        }
    };

    let kind = match parse_kind(raw.kind.as_ref()) {
        Ok(kind) => Some(kind),
        Err(issue) => {
            issues.push(issue);
            None
        }
    };

    let occurred_at = match parse_timestamp(raw.occurred_at.as_ref()) {
        Ok(at) => Some(at),
        Err(issue) => {
            issues.push(issue);
            None
        }
    };

    for issue in &issues {
        debug!(index, %issue, "flagged record");
    }

    let category = scalar_text(raw.category.as_ref())
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| UNCATEGORIZED.to_string());

    Transaction {
        id: scalar_text(raw.id.as_ref()).unwrap_or_default(),
        title: scalar_text(raw.title.as_ref()).unwrap_or_default(),
        amount,
        category,
        kind,
        occurred_at,
        owner_email: scalar_text(raw.owner_email.as_ref())
            .map(|e| e.trim().to_string())
            .unwrap_or_default(),
        issues,
    }
}

/// Parse an amount written as text
///
/// Accepts an optional leading currency symbol. Negative and non-finite
/// values are rejected. Export read-back uses the same rule, so a rendered
/// cell counts toward totals exactly when its record did.
pub fn parse_amount_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let unprefixed = trimmed
        .strip_prefix(&CURRENCY_PREFIXES[..])
        .unwrap_or(trimmed)
        .trim_start();
    let amount: f64 = unprefixed.parse().ok()?;
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

fn parse_amount(value: Option<&Value>) -> Result<f64, RecordIssue> {
    let text = scalar_text(value).ok_or(RecordIssue::MissingAmount)?;
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64().filter(|a| a.is_finite() && *a >= 0.0),
        Some(Value::String(s)) => parse_amount_text(s),
        _ => None,
    };
    parsed.ok_or(RecordIssue::InvalidAmount(text))
}

fn parse_kind(value: Option<&Value>) -> Result<TransactionKind, RecordIssue> {
    let text = scalar_text(value).ok_or(RecordIssue::MissingKind)?;
    let parsed = match value {
        Some(Value::String(s)) => TransactionKind::parse(s),
        _ => None,
    };
    parsed.ok_or(RecordIssue::InvalidKind(text))
}

fn parse_timestamp(value: Option<&Value>) -> Result<NaiveDateTime, RecordIssue> {
    let text = scalar_text(value).ok_or(RecordIssue::MissingTimestamp)?;
    let parsed = match value {
        // Epoch milliseconds, as produced by JavaScript clients
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|at| at.naive_utc()),
        Some(Value::String(s)) => parse_timestamp_text(s),
        _ => None,
    };
    parsed.ok_or(RecordIssue::InvalidTimestamp(text))
}

/// Parse a textual timestamp; offsets are normalized to UTC
pub fn parse_timestamp_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.naive_utc());
    }

    for format in TIMESTAMP_FORMATS {
        if let Ok(at) = NaiveDateTime::parse_from_str(text, format) {
            return Some(at);
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawTransaction {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_clean_record() {
        let txn = normalize_record(
            0,
            &raw(json!({
                "id": 1,
                "title": "Salary",
                "amount": "100",
                "kind": "Income",
                "category": "Salary",
                "occurredAt": "2024-01-05",
                "ownerEmail": "a@example.com"
            })),
        );

        assert!(txn.is_valid());
        assert_eq!(txn.id, "1");
        assert_eq!(txn.amount, 100.0);
        assert_eq!(txn.kind, Some(TransactionKind::Income));
        assert_eq!(
            txn.occurred_at,
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(txn.owner_email, "a@example.com");
    }

    #[test]
    fn test_bad_amount_degrades_to_zero() {
        let txn = normalize_record(0, &raw(json!({ "amount": "bad", "kind": "expense" })));
        assert_eq!(txn.amount, 0.0);
        assert!(txn.issues.contains(&RecordIssue::InvalidAmount("bad".into())));
        assert!(!txn.counts_toward_totals());
    }

    #[test]
    fn test_negative_and_non_finite_amounts_rejected() {
        for value in [json!(-5), json!("-5"), json!("inf"), json!("NaN"), json!(true)] {
            let txn = normalize_record(0, &raw(json!({ "amount": value, "kind": "expense" })));
            assert!(
                matches!(txn.issues[0], RecordIssue::InvalidAmount(_)),
                "accepted {:?}",
                value
            );
        }
    }

    #[test]
    fn test_currency_prefix_accepted() {
        assert_eq!(parse_amount_text("₹ 250.75"), Some(250.75));
        assert_eq!(parse_amount_text("$10"), Some(10.0));
        assert_eq!(parse_amount_text("10abc"), None);
        assert_eq!(parse_amount_text(""), None);
    }

    #[test]
    fn test_missing_fields() {
        let txn = normalize_record(0, &RawTransaction::default());
        assert_eq!(
            txn.issues,
            vec![
                RecordIssue::MissingAmount,
                RecordIssue::MissingKind,
                RecordIssue::MissingTimestamp
            ]
        );
        assert_eq!(txn.category, UNCATEGORIZED);
        assert_eq!(txn.id, "");
        assert_eq!(txn.title, "");
    }

    #[test]
    fn test_unknown_kind_is_flagged() {
        let txn = normalize_record(0, &raw(json!({ "amount": 5, "kind": "transfer" })));
        assert_eq!(txn.kind, None);
        assert!(txn.issues.contains(&RecordIssue::InvalidKind("transfer".into())));
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();

        assert_eq!(parse_timestamp_text("2024-03-01T10:30:00"), Some(expected));
        assert_eq!(parse_timestamp_text("2024-03-01 10:30:00"), Some(expected));
        assert_eq!(parse_timestamp_text("2024-03-01T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp_text("2024-03-01T10:30:00.000Z"), Some(expected));
        assert_eq!(parse_timestamp_text("03/01/2024"), None);
    }

    #[test]
    fn test_epoch_millis_timestamp() {
        let txn = normalize_record(
            0,
            &raw(json!({ "amount": 1, "kind": "income", "occurredAt": 1_704_067_200_000_i64 })),
        );
        assert_eq!(
            txn.occurred_at,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0)
        );
    }

    #[test]
    fn test_invalid_date_keeps_raw_text() {
        let txn = normalize_record(
            0,
            &raw(json!({ "amount": 1, "kind": "income", "date": "next tuesday" })),
        );
        assert!(txn.counts_toward_totals());
        assert_eq!(
            txn.issues,
            vec![RecordIssue::InvalidTimestamp("next tuesday".into())]
        );
    }

    #[test]
    fn test_batch_never_interrupted() {
        let batch = vec![
            raw(json!({ "amount": {"nested": 1}, "kind": 3, "date": [] })),
            raw(json!({ "amount": 2, "kind": "expense", "date": "2024-01-01" })),
        ];
        let result = normalize(&batch);
        assert_eq!(result.len(), 2);
        assert!(!result[0].is_valid());
        assert!(result[1].is_valid());
    }

    #[test]
    fn test_normalize_is_a_fixed_point() {
        let batch = vec![
            raw(json!({ "id": 1, "amount": "100.10", "kind": "INCOME", "category": "Salary", "date": "2024-01-05T08:15:30.250" })),
            raw(json!({ "id": "b", "amount": "bad", "kind": "expense", "category": "", "date": "2024-02-01" })),
            raw(json!({ "amount": -3, "kind": "gift", "date": "someday" })),
            raw(json!({ "title": 42, "amount": "$7", "kind": "expense" })),
            raw(json!({ "amount": 9, "kind": "income", "date": 1_704_067_200_123_i64 })),
        ];

        let once = normalize(&batch);
        let reraw: Vec<RawTransaction> = once.iter().map(Transaction::to_raw).collect();
        let twice = normalize(&reraw);

        assert_eq!(once, twice);
    }
}
