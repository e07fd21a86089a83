//! Budget zones
//!
//! Coarse risk labels derived from a spend-to-reference ratio. The cut-off
//! points are configuration: the same classifier serves per-category budget
//! tracking and whole-account health.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk label for a spend-to-reference ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetZone {
    Safe,
    Warning,
    Danger,
}

impl BudgetZone {
    /// Label shown on budget cards
    pub fn label(&self) -> &'static str {
        match self {
            Self::Safe => "Safe Zone",
            Self::Warning => "Warning Zone",
            Self::Danger => "Red Zone",
        }
    }

    /// Short advice line for the user
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Safe => "You're doing great!",
            Self::Warning => "Spending approaching limit.",
            Self::Danger => "Over budget! Spend less this month.",
        }
    }
}

impl fmt::Display for BudgetZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "Safe"),
            Self::Warning => write!(f, "Warning"),
            Self::Danger => write!(f, "Danger"),
        }
    }
}

/// Ratio cut-offs, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneThresholds {
    /// Ratio at or above which the zone is Warning
    pub warning: f64,
    /// Ratio at or above which the zone is Danger
    pub danger: f64,
}

impl ZoneThresholds {
    pub const fn new(warning: f64, danger: f64) -> Self {
        Self { warning, danger }
    }

    /// Budget-relative defaults: 70% warns, 100% is over budget
    pub const fn budget() -> Self {
        Self::new(70.0, 100.0)
    }

    /// Whole-account health defaults, measured against income
    pub const fn health() -> Self {
        Self::new(50.0, 80.0)
    }

    /// Check the thresholds are usable; returns a description of the problem
    pub fn check(&self) -> Result<(), String> {
        if !self.warning.is_finite() || !self.danger.is_finite() {
            return Err("thresholds must be finite".into());
        }
        if self.warning < 0.0 || self.danger < 0.0 {
            return Err("thresholds must not be negative".into());
        }
        if self.warning > self.danger {
            return Err(format!(
                "warning threshold ({}) exceeds danger threshold ({})",
                self.warning, self.danger
            ));
        }
        Ok(())
    }
}

impl Default for ZoneThresholds {
    fn default() -> Self {
        Self::budget()
    }
}

/// Result of classifying a spend against a reference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub zone: BudgetZone,
    /// Spend as a percentage of the reference, capped at 100
    pub ratio_percent: f64,
    /// The reference was zero or absent, so the zone defaulted to Safe
    pub missing_reference: bool,
}

impl Classification {
    /// Classification used when there is nothing to compare against
    pub const fn unreferenced() -> Self {
        Self {
            zone: BudgetZone::Safe,
            ratio_percent: 0.0,
            missing_reference: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(ZoneThresholds::default(), ZoneThresholds::new(70.0, 100.0));
        assert_eq!(ZoneThresholds::health(), ZoneThresholds::new(50.0, 80.0));
    }

    #[test]
    fn test_check_rejects_inverted_thresholds() {
        assert!(ZoneThresholds::new(90.0, 80.0).check().is_err());
        assert!(ZoneThresholds::new(-1.0, 80.0).check().is_err());
        assert!(ZoneThresholds::new(f64::NAN, 80.0).check().is_err());
        assert!(ZoneThresholds::budget().check().is_ok());
    }

    #[test]
    fn test_zone_labels() {
        assert_eq!(BudgetZone::Danger.label(), "Red Zone");
        assert_eq!(BudgetZone::Warning.to_string(), "Warning");
        assert_eq!(BudgetZone::Safe.advice(), "You're doing great!");
    }
}
