//! The `Connections` entry of a report package.
//!
//! Reports with a live connection name their remote model here; reports
//! with an embedded model have no entry, or one without connections.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static INITIAL_CATALOG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Initial Catalog=([^;]*)").unwrap());

/// Where the report's data comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportConnection {
    /// The model is embedded in the package.
    #[default]
    Local,
    /// A live connection to a model hosted elsewhere.
    Remote {
        connection_string: String,
        /// Value of `Initial Catalog`, when present.
        model_name: Option<String>,
    },
}

#[derive(Deserialize)]
struct ConnectionsDocument {
    #[serde(rename = "Connections", default)]
    connections: Vec<ConnectionEntry>,
}

#[derive(Deserialize)]
struct ConnectionEntry {
    #[serde(rename = "ConnectionString", default)]
    connection_string: Option<String>,
}

impl ReportConnection {
    /// Parse the JSON text of a `Connections` entry. The first entry with a
    /// connection string wins.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let document: ConnectionsDocument = serde_json::from_str(text)?;
        let connection = document
            .connections
            .into_iter()
            .find_map(|c| c.connection_string.filter(|s| !s.trim().is_empty()))
            .map(|connection_string| {
                let model_name = initial_catalog(&connection_string);
                ReportConnection::Remote {
                    connection_string,
                    model_name,
                }
            })
            .unwrap_or_default();
        Ok(connection)
    }

    pub fn model_name(&self) -> Option<&str> {
        match self {
            ReportConnection::Local => None,
            ReportConnection::Remote { model_name, .. } => model_name.as_deref(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ReportConnection::Remote { .. })
    }
}

/// Text after `Initial Catalog=` up to the next `;`.
pub fn initial_catalog(connection_string: &str) -> Option<String> {
    INITIAL_CATALOG
        .captures(connection_string)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
