//! Analysis driver: one model, the reports linked against it, and the
//! warnings they raised.
//!
//! ```text
//! Analysis::connected / disconnected
//!        │
//!        ├── load_report(path) ── PowerBIReport (adds edges, publishes warnings)
//!        │
//!        └── summary() ── Vec<UsageSummary> ── render_table / serde_json
//! ```

use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::config::{ModelSettings, SettingsError};
use crate::metadata::{MetadataError, MetadataSnapshot, MetadataSource};
use crate::model::DataInput;
use crate::report::{LoadOptions, PowerBIReport, ReportError, ReportPackage};
use crate::semantic::{
    ModelError, NodeDescription, RunMode, SemanticModel, UsageClassifier, UsageState,
};
use crate::warnings::WarningBus;

/// Error type for a whole analysis run.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Usage of one column or measure, ready for display or serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageSummary {
    pub model: String,
    /// "Column", "CalculatedColumn" or "Measure".
    pub kind: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub state: UsageState,
    pub dependent_count: usize,
    pub dependents: Vec<NodeDescription>,
}

/// A semantic model together with the reports analysed against it.
pub struct Analysis {
    model: SemanticModel,
    reports: Vec<PowerBIReport>,
    warnings: WarningBus,
}

impl Analysis {
    pub fn new(model: SemanticModel) -> Self {
        Self {
            model,
            reports: Vec::new(),
            warnings: WarningBus::new(),
        }
    }

    /// Permissive analysis: every reference creates what it names.
    pub fn disconnected(name: impl Into<String>) -> Self {
        Self::new(SemanticModel::disconnected(name))
    }

    /// Strict analysis against a model loaded from `source`.
    pub fn connected(
        name: impl Into<String>,
        connection: impl Into<String>,
        source: &mut dyn MetadataSource,
    ) -> AnalysisResult<Self> {
        let mut model = SemanticModel::connected(name, connection);
        model.load_full_model(source)?;
        Ok(Self::new(model))
    }

    /// Build the analysis for a configured model.
    pub fn from_settings(name: &str, settings: &ModelSettings) -> AnalysisResult<Self> {
        match settings.mode {
            RunMode::Disconnected => Ok(Self::disconnected(name)),
            RunMode::Connected => {
                let connection = settings.resolved_connection_string()?;
                let path = settings.resolved_snapshot()?.ok_or_else(|| {
                    SettingsError::InvalidConfig(format!(
                        "connected model '{name}' needs a metadata snapshot"
                    ))
                })?;
                let mut snapshot = MetadataSnapshot::from_path(&path)?;
                Self::connected(name, connection, &mut snapshot)
            }
        }
    }

    pub fn model(&self) -> &SemanticModel {
        &self.model
    }

    pub fn reports(&self) -> &[PowerBIReport] {
        &self.reports
    }

    /// The run's warning bus. Subscribe before loading reports.
    pub fn warnings(&self) -> &WarningBus {
        &self.warnings
    }

    /// Load a `.pbix` file. On error the model is left unchanged.
    pub fn load_report(
        &mut self,
        path: impl AsRef<Path>,
        options: &LoadOptions,
    ) -> AnalysisResult<&PowerBIReport> {
        let report =
            PowerBIReport::load_from_package(path, &mut self.model, options, &self.warnings)?;
        Ok(self.push(report))
    }

    /// Load a report from an already opened package.
    pub fn load_package(
        &mut self,
        package: &mut dyn ReportPackage,
        path: impl AsRef<Path>,
        options: &LoadOptions,
    ) -> AnalysisResult<&PowerBIReport> {
        let report = PowerBIReport::load(
            package,
            path.as_ref(),
            &mut self.model,
            options,
            &self.warnings,
        )?;
        Ok(self.push(report))
    }

    fn push(&mut self, report: PowerBIReport) -> &PowerBIReport {
        self.reports.push(report);
        let index = self.reports.len() - 1;
        &self.reports[index]
    }

    /// Usage of every column and measure, columns first.
    pub fn summary(&self) -> Vec<UsageSummary> {
        let model = &self.model;
        let states = UsageClassifier::new(model).classify_all();
        let summary: Vec<UsageSummary> = states
            .into_iter()
            .map(|(input, state)| self.summarize(input, state))
            .collect();

        info!(
            model = %model.name(),
            inputs = summary.len(),
            unused = summary.iter().filter(|s| s.state == UsageState::Unused).count(),
            "classified usage"
        );
        summary
    }

    fn summarize(&self, input: DataInput, state: UsageState) -> UsageSummary {
        let model = &self.model;
        let dependents: Vec<NodeDescription> = model
            .dependents(input)
            .into_iter()
            .map(|node| model.describe(node))
            .collect();
        UsageSummary {
            model: model.name().to_string(),
            kind: model.input_type(input),
            name: model.input_name(input).to_string(),
            table: model.input_table(input).map(|t| t.name().to_string()),
            state,
            dependent_count: dependents.len(),
            dependents,
        }
    }
}

/// Render a summary as an aligned plain-text table.
pub fn render_table(rows: &[UsageSummary]) -> String {
    let headers = ["STATE", "KIND", "TABLE", "NAME", "DEPENDENTS"];
    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|row| {
            [
                row.state.to_string(),
                row.kind.to_string(),
                row.table.clone().unwrap_or_else(|| "-".to_string()),
                row.name.clone(),
                row.dependent_count.to_string(),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_row = headers.map(str::to_string);
    for row in std::iter::once(&header_row).chain(&cells) {
        let line = row
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, width))| {
                if i + 1 == row.len() {
                    cell.clone()
                } else {
                    format!("{cell:<width$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(&line);
        out.push('\n');
    }
    out
}
