//! Configuration module for findmeasure.
//!
//! Handles the settings file, environment variables and per-report options.

mod settings;

pub use settings::{
    expand_env_vars, AnalysisSettings, ModelSettings, ReportSettings, Settings, SettingsError,
};
