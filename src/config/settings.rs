//! Engine settings
//!
//! Manages classification thresholds, the undated-record policy, refresh
//! cadence and export presentation options.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::paths::ReportPaths;
use crate::error::ReportError;
use crate::models::ZoneThresholds;
use crate::services::UndatedPolicy;

/// Settings for the reporting engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Thresholds for per-category budget classification
    #[serde(default = "ZoneThresholds::budget")]
    pub budget_thresholds: ZoneThresholds,

    /// Thresholds for whole-account health (expense against income)
    #[serde(default = "ZoneThresholds::health")]
    pub health_thresholds: ZoneThresholds,

    /// Whether records with a bad or missing date count in category totals
    #[serde(default = "default_include_undated")]
    pub include_undated_in_category_totals: bool,

    /// Seconds between background refreshes
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Currency symbol used in summary blocks
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Timestamp format for exported rows (strftime)
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// Title of exported documents
    #[serde(default = "default_report_title")]
    pub report_title: String,

    /// Name of the spreadsheet's only sheet
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Table rows per page in the paginated document
    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: usize,
}

fn default_schema_version() -> u32 {
    1
}

fn default_include_undated() -> bool {
    true
}

fn default_poll_interval_secs() -> u64 {
    600
}

fn default_currency() -> String {
    "₹".to_string()
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

fn default_report_title() -> String {
    "Transactions Summary".to_string()
}

fn default_sheet_name() -> String {
    "Transactions".to_string()
}

fn default_rows_per_page() -> usize {
    40
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            budget_thresholds: ZoneThresholds::budget(),
            health_thresholds: ZoneThresholds::health(),
            include_undated_in_category_totals: default_include_undated(),
            poll_interval_secs: default_poll_interval_secs(),
            currency_symbol: default_currency(),
            timestamp_format: default_timestamp_format(),
            report_title: default_report_title(),
            sheet_name: default_sheet_name(),
            rows_per_page: default_rows_per_page(),
        }
    }
}

impl Settings {
    /// Undated-record policy derived from the boolean flag
    pub fn undated_policy(&self) -> UndatedPolicy {
        UndatedPolicy::from_flag(self.include_undated_in_category_totals)
    }

    /// Check the settings are internally consistent
    pub fn validate(&self) -> Result<(), ReportError> {
        self.budget_thresholds
            .check()
            .map_err(|e| ReportError::Config(format!("budget_thresholds: {}", e)))?;
        self.health_thresholds
            .check()
            .map_err(|e| ReportError::Config(format!("health_thresholds: {}", e)))?;

        if self.poll_interval_secs == 0 {
            return Err(ReportError::Config(
                "poll_interval_secs must be greater than zero".into(),
            ));
        }
        if self.rows_per_page == 0 {
            return Err(ReportError::Config(
                "rows_per_page must be greater than zero".into(),
            ));
        }
        if StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(ReportError::Config(format!(
                "timestamp_format '{}' is not a valid strftime format",
                self.timestamp_format
            )));
        }

        Ok(())
    }

    /// Load settings from the default location, or use defaults if absent
    pub fn load_or_create(paths: &ReportPaths) -> Result<Self, ReportError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            Self::load_from(&settings_path)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Load and validate settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ReportError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ReportError::Io(format!(
                "Failed to read settings file {}: {}",
                path.display(),
                e
            ))
        })?;

        let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
            ReportError::Config(format!("Failed to parse settings file: {}", e))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ReportPaths) -> Result<(), ReportError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            ReportError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            ReportError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}
