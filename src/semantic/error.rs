//! Error types for building a semantic model.

use thiserror::Error;

use crate::metadata::MetadataError;

/// Result type for semantic-model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Fatal errors raised while loading or mutating a semantic model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The metadata backend failed.
    #[error("failed to read metadata for model '{model}': {source}")]
    Metadata {
        model: String,
        #[source]
        source: MetadataError,
    },

    /// A column row names a table id that was not loaded.
    #[error("could not find the table {table_id} for the column '{column}'")]
    ColumnTableNotFound { table_id: u64, column: String },

    /// A measure row names a table id that was not loaded.
    #[error("could not find the table {table_id} for the measure '{measure}'")]
    MeasureTableNotFound { table_id: u64, measure: String },

    /// A relationship endpoint column id was not loaded.
    #[error(
        "could not find the column {from_column_id} or column {to_column_id} for relationship '{relationship}'"
    )]
    RelationshipEndpointNotFound {
        relationship: String,
        from_column_id: u64,
        to_column_id: u64,
    },

    /// The referenced side of a calculation dependency is unknown.
    #[error("couldn't find dependency {object_type} : {table}.{name}")]
    DependencyNotFound {
        object_type: String,
        table: String,
        name: String,
    },

    /// The referencing side of a calculation dependency is unknown.
    #[error("couldn't find {object_type} : {table}.{name} during dependency building")]
    DependentNotFound {
        object_type: String,
        table: String,
        name: String,
    },

    /// Placeholders can only be fabricated for disconnected models.
    #[error("cannot create placeholder {kind} '{name}' in connected model '{model}'")]
    PlaceholderInConnectedMode {
        model: String,
        kind: &'static str,
        name: String,
    },
}
