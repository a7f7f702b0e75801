//! Metadata source module.
//!
//! A semantic model in connected mode is populated from five row sets
//! exposed by the analysis engine. This module defines those rows, the
//! [`MetadataSource`] trait the loader reads them through, and
//! [`MetadataSnapshot`], a source backed by an in-memory or exported copy.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐        ┌──────────────────────────┐
//! │        MetadataSource        │        │   SemanticModel loader   │
//! │  - tables()                  │ rows   │  1. tables               │
//! │  - columns()                 │ ─────► │  2. columns              │
//! │  - measures()                │        │  3. measures             │
//! │  - relationships()           │        │  4. relationships        │
//! │  - dependencies()            │        │  5. dependencies         │
//! └──────────────────────────────┘        └──────────────────────────┘
//!        ▲
//!        │ implemented by
//! ┌──────────────────────────────┐
//! │ MetadataSnapshot (JSON/mem)  │
//! └──────────────────────────────┘
//! ```

mod provider;
mod snapshot;
mod types;

pub use provider::{MetadataError, MetadataResult, MetadataSource};
pub use snapshot::MetadataSnapshot;
pub use types::*;
