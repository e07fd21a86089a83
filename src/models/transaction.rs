//! Transaction model
//!
//! The canonical, post-normalization form of a transaction record. Fields
//! that failed to parse are recorded as [`RecordIssue`]s carrying the raw
//! text, so the record can still be displayed and audited.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

use super::raw::RawTransaction;
use crate::error::ReportError;

/// Category assigned to records without one
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Wire format used when a parsed timestamp is written back out
pub const CANONICAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// Case-insensitive parse; anything but "income" or "expense" is rejected
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field-level problem found while normalizing a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", content = "raw", rename_all = "snake_case")]
pub enum RecordIssue {
    /// Amount present but not a non-negative finite number
    InvalidAmount(String),
    MissingAmount,
    /// Kind present but neither income nor expense
    InvalidKind(String),
    MissingKind,
    /// Timestamp present but in no recognised format
    InvalidTimestamp(String),
    MissingTimestamp,
}

impl RecordIssue {
    /// Whether this issue removes the record from every total
    pub fn excludes_from_totals(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_) | Self::MissingAmount | Self::InvalidKind(_) | Self::MissingKind
        )
    }

    /// Whether this issue only concerns the record's position in time
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::InvalidTimestamp(_) | Self::MissingTimestamp)
    }

    /// The original raw text, if the field was present
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::InvalidAmount(raw) | Self::InvalidKind(raw) | Self::InvalidTimestamp(raw) => {
                Some(raw)
            }
            _ => None,
        }
    }
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAmount(raw) => write!(f, "amount '{}' is not a valid number", raw),
            Self::MissingAmount => write!(f, "amount is missing"),
            Self::InvalidKind(raw) => write!(f, "kind '{}' is not income or expense", raw),
            Self::MissingKind => write!(f, "kind is missing"),
            Self::InvalidTimestamp(raw) => write!(f, "date '{}' could not be parsed", raw),
            Self::MissingTimestamp => write!(f, "date is missing"),
        }
    }
}

/// A normalized transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Opaque identifier from the data source (may be empty)
    pub id: String,

    /// Display title (may be empty)
    pub title: String,

    /// Non-negative amount; 0 when the raw amount was unusable
    pub amount: f64,

    /// Category name, never empty
    pub category: String,

    /// None when the raw kind was missing or unrecognised
    pub kind: Option<TransactionKind>,

    /// None when the raw timestamp was missing or unparseable
    pub occurred_at: Option<NaiveDateTime>,

    /// Owning user's identity key (may be empty)
    pub owner_email: String,

    /// Problems found during normalization, in field order
    #[serde(default)]
    pub issues: Vec<RecordIssue>,
}

impl Transaction {
    /// Build a clean transaction (used by tests and callers holding typed data)
    pub fn new(
        id: impl Into<String>,
        kind: TransactionKind,
        amount: f64,
        category: impl Into<String>,
        occurred_at: NaiveDateTime,
    ) -> Self {
        let category = category.into();
        Self {
            id: id.into(),
            title: String::new(),
            amount,
            category: if category.trim().is_empty() {
                UNCATEGORIZED.to_string()
            } else {
                category
            },
            kind: Some(kind),
            occurred_at: Some(occurred_at),
            owner_email: String::new(),
            issues: Vec::new(),
        }
    }

    /// No issues of any kind
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Amount and kind are usable, so the record contributes to totals
    pub fn counts_toward_totals(&self) -> bool {
        self.kind.is_some() && !self.issues.iter().any(RecordIssue::excludes_from_totals)
    }

    /// Has a usable timestamp
    pub fn is_dated(&self) -> bool {
        self.occurred_at.is_some()
    }

    pub fn is_income(&self) -> bool {
        self.counts_toward_totals() && self.kind == Some(TransactionKind::Income)
    }

    pub fn is_expense(&self) -> bool {
        self.counts_toward_totals() && self.kind == Some(TransactionKind::Expense)
    }

    /// The first issue matching a predicate
    pub fn issue_where(&self, pred: impl Fn(&RecordIssue) -> bool) -> Option<&RecordIssue> {
        self.issues.iter().find(|issue| pred(issue))
    }

    /// Malformed-record diagnostic for a flagged record at `index`
    pub fn diagnostic(&self, index: usize) -> Option<ReportError> {
        if self.issues.is_empty() {
            return None;
        }
        let reason = self
            .issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Some(ReportError::MalformedRecord { index, reason })
    }

    /// Re-emit this record in raw form
    ///
    /// Flagged fields carry their original raw text, so normalizing the
    /// result reproduces this transaction exactly.
    pub fn to_raw(&self) -> RawTransaction {
        let amount = match self.issue_where(|i| {
            matches!(i, RecordIssue::InvalidAmount(_) | RecordIssue::MissingAmount)
        }) {
            Some(RecordIssue::InvalidAmount(raw)) => Some(Value::String(raw.clone())),
            Some(_) => None,
            None => Number::from_f64(self.amount).map(Value::Number),
        };

        let kind = match (self.kind, self.issue_where(|i| {
            matches!(i, RecordIssue::InvalidKind(_) | RecordIssue::MissingKind)
        })) {
            (_, Some(RecordIssue::InvalidKind(raw))) => Some(Value::String(raw.clone())),
            (Some(kind), _) => Some(Value::String(kind.as_str().to_string())),
            _ => None,
        };

        let occurred_at = match (self.occurred_at, self.issue_where(RecordIssue::is_temporal)) {
            (Some(at), _) => Some(Value::String(
                at.format(CANONICAL_TIMESTAMP_FORMAT).to_string(),
            )),
            (None, Some(RecordIssue::InvalidTimestamp(raw))) => Some(Value::String(raw.clone())),
            _ => None,
        };

        RawTransaction {
            id: Some(Value::String(self.id.clone())),
            title: Some(Value::String(self.title.clone())),
            amount,
            category: Some(Value::String(self.category.clone())),
            kind,
            occurred_at,
            owner_email: Some(Value::String(self.owner_email.clone())),
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self
            .occurred_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "????-??-??".to_string());
        let kind = self.kind.map(|k| k.as_str()).unwrap_or("?");
        write!(f, "{} {} {} {:.2}", date, self.category, kind, self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_kind_parse_is_case_insensitive() {
        assert_eq!(TransactionKind::parse("Income"), Some(TransactionKind::Income));
        assert_eq!(TransactionKind::parse(" EXPENSE "), Some(TransactionKind::Expense));
        assert_eq!(TransactionKind::parse("transfer"), None);
    }

    #[test]
    fn test_new_defaults_empty_category() {
        let txn = Transaction::new("1", TransactionKind::Expense, 10.0, "  ", at(2024, 1, 1));
        assert_eq!(txn.category, UNCATEGORIZED);
        assert!(txn.is_valid());
        assert!(txn.is_expense());
    }

    #[test]
    fn test_undated_record_still_counts() {
        let mut txn = Transaction::new("1", TransactionKind::Income, 5.0, "Salary", at(2024, 1, 1));
        txn.occurred_at = None;
        txn.issues.push(RecordIssue::InvalidTimestamp("soon".into()));

        assert!(!txn.is_valid());
        assert!(txn.counts_toward_totals());
        assert!(!txn.is_dated());
    }

    #[test]
    fn test_bad_amount_excludes_from_totals() {
        let mut txn = Transaction::new("1", TransactionKind::Expense, 0.0, "Food", at(2024, 2, 1));
        txn.issues.push(RecordIssue::InvalidAmount("bad".into()));

        assert!(!txn.counts_toward_totals());
        assert!(!txn.is_expense());
    }

    #[test]
    fn test_to_raw_preserves_flagged_text() {
        let mut txn = Transaction::new("9", TransactionKind::Expense, 0.0, "Food", at(2024, 2, 1));
        txn.kind = None;
        txn.occurred_at = None;
        txn.issues = vec![
            RecordIssue::InvalidAmount("bad".into()),
            RecordIssue::InvalidKind("transfer".into()),
            RecordIssue::InvalidTimestamp("yesterday".into()),
        ];

        let raw = txn.to_raw();
        assert_eq!(raw.amount, Some(Value::String("bad".into())));
        assert_eq!(raw.kind, Some(Value::String("transfer".into())));
        assert_eq!(raw.occurred_at, Some(Value::String("yesterday".into())));
    }

    #[test]
    fn test_diagnostic_lists_every_issue() {
        let mut txn = Transaction::new("3", TransactionKind::Expense, 0.0, "Food", at(2024, 2, 1));
        assert!(txn.diagnostic(0).is_none());

        txn.occurred_at = None;
        txn.issues = vec![
            RecordIssue::InvalidAmount("bad".into()),
            RecordIssue::MissingTimestamp,
        ];
        let err = txn.diagnostic(2).unwrap();
        assert!(matches!(err, ReportError::MalformedRecord { index: 2, .. }));
        assert_eq!(
            err.to_string(),
            "Malformed record at index 2: amount 'bad' is not a valid number; date is missing"
        );
    }

    #[test]
    fn test_issue_display() {
        assert_eq!(
            RecordIssue::InvalidAmount("bad".into()).to_string(),
            "amount 'bad' is not a valid number"
        );
        assert_eq!(RecordIssue::MissingTimestamp.to_string(), "date is missing");
    }

    #[test]
    fn test_display() {
        let txn = Transaction::new("1", TransactionKind::Expense, 12.5, "Food", at(2024, 1, 20));
        assert_eq!(txn.to_string(), "2024-01-20 Food expense 12.50");
    }
}
