//! Arena indices for semantic-model and report entities.
//!
//! Every entity is identified by its position in the arena that owns it.
//! Equality and hashing use the index only, so renaming or re-parenting an
//! entity never changes its identity.

use serde::Serialize;
use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                Self(index as u32)
            }

            /// Position of the entity in its arena.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Index of a [`Table`](super::Table) in its semantic model.
    TableId,
    "table"
);
arena_id!(
    /// Index of a [`Column`](super::Column) in its semantic model.
    ColumnId,
    "column"
);
arena_id!(
    /// Index of a [`Measure`](super::Measure) in its semantic model.
    MeasureId,
    "measure"
);
arena_id!(
    /// Index of a [`Relationship`](super::Relationship) in its semantic model.
    RelationshipId,
    "relationship"
);
arena_id!(
    /// Index of a report-side object (report, page, visual or filter)
    /// registered against a semantic model.
    LeafId,
    "leaf"
);
