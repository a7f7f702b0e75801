//! Error types for report parsing and package access.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for layout parsing.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Result type for report loading.
pub type ReportResult<T> = Result<T, ReportError>;

/// Structural problems in a report layout document.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("layout is not valid JSON: {0}")]
    InvalidDocument(#[source] serde_json::Error),

    #[error("layout has no \"sections\" array")]
    MissingSections,

    #[error("{context} has no \"{field}\" field")]
    MissingField { context: String, field: &'static str },

    #[error("embedded \"{field}\" of {context} is not valid JSON: {source}")]
    EmbeddedDocument {
        context: String,
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("\"{field}\" of {context} should be {expected}")]
    UnexpectedShape {
        context: String,
        field: &'static str,
        expected: &'static str,
    },

    #[error("{context} refers to unknown source alias '{alias}'")]
    UnknownSourceAlias { context: String, alias: String },
}

/// Failures reading a report package.
#[derive(Error, Debug)]
pub enum PackageError {
    #[error("failed to open report package {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("not a valid report package: {0}")]
    Archive(String),

    #[error("failed to read entry '{entry}': {reason}")]
    ReadEntry { entry: String, reason: String },

    #[error("entry '{entry}' is too large: {size} bytes (limit: {limit} bytes)")]
    EntryTooLarge { entry: String, size: u64, limit: u64 },
}

/// Fatal errors while loading a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Package(#[from] PackageError),

    #[error("report '{report}' has no '{entry}' entry")]
    MissingEntry { report: String, entry: &'static str },

    #[error("invalid layout in report '{report}': {source}")]
    Layout {
        report: String,
        #[source]
        source: LayoutError,
    },

    #[error("layout of report '{report}' is not valid text: {reason}")]
    Encoding { report: String, reason: String },

    #[error("invalid connections descriptor in report '{report}': {reason}")]
    Connections { report: String, reason: String },
}
