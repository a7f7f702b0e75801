//! # findmeasure
//!
//! Usage analysis for BI semantic models and the reports that consume them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │         Metadata source (system views / snapshot)        │
//! │  (tables, columns, measures, relationships, dependencies)│
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [loader]
//! ┌─────────────────────────────────────────────────────────┐
//! │           SemanticModel + DependencyGraph                │
//! └─────────────────────────────────────────────────────────┘
//!                          ▲
//!                          │ [report linker] edges / warnings
//! ┌─────────────────────────────────────────────────────────┐
//! │      Report package (.pbix) → Layout → pages/visuals     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [classifier]
//! ┌─────────────────────────────────────────────────────────┐
//! │           Unused < UsedByUnused < Used                   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! A model runs in one of two modes. **Connected** models are loaded from
//! a metadata source and resolve report references strictly: a reference
//! to something the model lacks becomes a warning on the [`WarningBus`].
//! **Disconnected** models start empty and create whatever reports name.

pub mod analysis;
pub mod config;
pub mod metadata;
pub mod model;
pub mod report;
pub mod semantic;
pub mod warnings;

pub use analysis::{Analysis, AnalysisError, AnalysisResult, UsageSummary};
pub use model::DataInput;
pub use report::{LoadOptions, PowerBIReport};
pub use semantic::{GraphNode, RunMode, SemanticModel, UsageState};
pub use warnings::{AnalysisWarning, WarningBus};
