//! Configuration module
//!
//! This module provides configuration management including:
//! - Config path resolution
//! - Engine settings persistence and validation

pub mod paths;
pub mod settings;

pub use paths::ReportPaths;
pub use settings::Settings;
