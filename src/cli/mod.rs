//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the report engine.

pub mod export;
pub mod report;
pub mod watch;

use std::path::Path;

use crate::error::{ReportError, ReportResult};
use crate::models::{BudgetLimit, RawTransaction};

pub use export::{handle_export_command, ExportArgs, FormatArg};
pub use report::{handle_report_command, ReportCommands};
pub use watch::{handle_watch_command, WatchArgs};

/// Read a raw transaction batch from a JSON file
pub fn load_raw_transactions(path: Option<&Path>) -> ReportResult<Vec<RawTransaction>> {
    let path = path.ok_or_else(|| {
        ReportError::Validation("No input file given. Pass --input <file>".into())
    })?;
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ReportError::Io(format!("Failed to read {}: {}", path.display(), e))
    })?;
    RawTransaction::parse_batch(&contents)
}

/// Read budget limits from a JSON file; no file means no budgets
pub fn load_budgets(path: Option<&Path>) -> ReportResult<Vec<BudgetLimit>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ReportError::Io(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let budgets: Vec<BudgetLimit> = serde_json::from_str(&contents)?;
    Ok(budgets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_input_is_validation_error() {
        let err = load_raw_transactions(None).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
    }

    #[test]
    fn test_load_budgets() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("budgets.json");
        std::fs::write(&path, r#"[{"category": "Food", "limitAmount": 500}, {"category": "Bills", "amount": 50}]"#)
            .unwrap();

        let budgets = load_budgets(Some(&path)).unwrap();
        assert_eq!(budgets.len(), 2);
        assert_eq!(budgets[1].limit_amount, 50.0);
        assert!(load_budgets(None).unwrap().is_empty());
    }
}
