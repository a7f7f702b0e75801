//! MetadataSource trait definition.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use super::types::*;

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors raised while reading rows from a metadata backend.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Snapshot file could not be read.
    #[error("failed to read metadata snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Snapshot document is not valid.
    #[error("failed to parse metadata snapshot: {0}")]
    Parse(#[source] serde_json::Error),

    /// The backend rejected or failed a query.
    #[error("metadata query for {view} failed: {message}")]
    Query { view: String, message: String },

    /// A row was returned but could not be interpreted.
    #[error("malformed {view} row: {message}")]
    MalformedRow { view: String, message: String },
}

/// A row source for the five metadata views the loader consumes.
///
/// Methods take `&mut self` because live backends keep a cursor or
/// connection open between queries. The loader calls them in the order
/// tables, columns, measures, relationships, dependencies.
pub trait MetadataSource {
    fn tables(&mut self) -> MetadataResult<Vec<TableRow>>;

    fn columns(&mut self) -> MetadataResult<Vec<ColumnRow>>;

    fn measures(&mut self) -> MetadataResult<Vec<MeasureRow>>;

    fn relationships(&mut self) -> MetadataResult<Vec<RelationshipRow>>;

    /// Calculation dependencies. Implementations may return every row of the
    /// view; the loader applies [`DependencyRow::is_model_dependency`].
    fn dependencies(&mut self) -> MetadataResult<Vec<DependencyRow>>;
}
