//! TOML-based configuration for findmeasure.
//!
//! Supports a config file (findmeasure.toml) with environment variable
//! expansion in connection strings and paths.
//!
//! Example configuration:
//! ```toml
//! [analysis]
//! include_hidden_pages = true
//! include_hidden_visuals = false
//!
//! [models.sales]
//! mode = "connected"
//! connection_string = "${SALES_CONN}"
//! snapshot = "./sales-metadata.json"
//!
//! [models.scratch]
//! mode = "disconnected"
//!
//! [[reports]]
//! path = "./Store Sales.pbix"
//! model = "sales"
//!
//! [[reports]]
//! path = "$REPORTS/Ad hoc.pbix"   # no model: analysed against its own disconnected model
//! include_hidden_pages = false
//! ```

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::report::LoadOptions;
use crate::semantic::RunMode;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Defaults applied to every report.
    pub analysis: AnalysisSettings,

    /// Named semantic models.
    pub models: BTreeMap<String, ModelSettings>,

    /// Reports to analyse, in order.
    pub reports: Vec<ReportSettings>,
}

/// Analysis defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub include_hidden_pages: bool,
    pub include_hidden_visuals: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            include_hidden_pages: true,
            include_hidden_visuals: true,
        }
    }
}

impl AnalysisSettings {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            include_hidden_pages: self.include_hidden_pages,
            include_hidden_visuals: self.include_hidden_visuals,
        }
    }
}

/// Semantic model configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelSettings {
    #[serde(default)]
    pub mode: RunMode,

    /// Connection string (supports ${ENV_VAR} expansion).
    #[serde(default)]
    pub connection_string: Option<String>,

    /// Metadata snapshot to load a connected model from.
    #[serde(default)]
    pub snapshot: Option<String>,
}

impl ModelSettings {
    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection_string(&self) -> Result<String, SettingsError> {
        match &self.connection_string {
            Some(s) => expand_env_vars(s),
            None => Ok(String::new()),
        }
    }

    pub fn resolved_snapshot(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.snapshot
            .as_deref()
            .map(|s| expand_env_vars(s).map(PathBuf::from))
            .transpose()
    }
}

/// One report to analyse.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportSettings {
    pub path: String,

    /// Name of a model under `[models]`. Omitted means a disconnected model
    /// named after the report.
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub include_hidden_pages: Option<bool>,

    #[serde(default)]
    pub include_hidden_visuals: Option<bool>,
}

impl ReportSettings {
    pub fn resolved_path(&self) -> Result<PathBuf, SettingsError> {
        expand_env_vars(&self.path).map(PathBuf::from)
    }

    /// Report overrides on top of the analysis defaults.
    pub fn load_options(&self, defaults: &AnalysisSettings) -> LoadOptions {
        let base = defaults.load_options();
        LoadOptions {
            include_hidden_pages: self.include_hidden_pages.unwrap_or(base.include_hidden_pages),
            include_hidden_visuals: self
                .include_hidden_visuals
                .unwrap_or(base.include_hidden_visuals),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `FINDMEASURE_CONFIG`
    /// 2. `./findmeasure.toml`
    /// 3. `~/.config/findmeasure/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("FINDMEASURE_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("findmeasure.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("findmeasure").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Get a model by name.
    pub fn get_model(&self, name: &str) -> Result<&ModelSettings, SettingsError> {
        self.models
            .get(name)
            .ok_or_else(|| SettingsError::ModelNotFound(name.to_string()))
    }

    /// Check cross references between sections.
    pub fn validate(&self) -> Result<(), SettingsError> {
        for report in &self.reports {
            if let Some(model) = &report.model {
                self.get_model(model)?;
            }
        }
        for (name, model) in &self.models {
            if model.mode == RunMode::Connected && model.snapshot.is_none() {
                return Err(SettingsError::InvalidConfig(format!(
                    "connected model '{name}' needs a metadata snapshot"
                )));
            }
        }
        Ok(())
    }
}

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(?:\{([^}]*)\}|([A-Za-z0-9_]+))").unwrap());

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A `$` not followed by a name is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut missing = None;
    let expanded = ENV_VAR.replace_all(s, |caps: &Captures| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        match env::var(name) {
            Ok(value) => value,
            Err(_) => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(SettingsError::MissingEnvVar(name)),
        None => Ok(expanded.into_owned()),
    }
}
