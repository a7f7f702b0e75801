// src/model/relationship.rs
use super::{ColumnId, RelationshipId};

/// A relationship between two columns.
///
/// A relationship always counts as a real use of both of its columns.
#[derive(Debug, Clone)]
pub struct Relationship {
    pub(crate) id: RelationshipId,
    name: String,
    /// The "many" side of a many-to-one relationship.
    from_column: ColumnId,
    /// The "one" side of a many-to-one relationship.
    to_column: ColumnId,
    is_active: bool,
}

impl Relationship {
    pub(crate) fn new(
        id: RelationshipId,
        name: impl Into<String>,
        from_column: ColumnId,
        to_column: ColumnId,
        is_active: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            from_column,
            to_column,
            is_active,
        }
    }

    pub fn id(&self) -> RelationshipId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn from_column(&self) -> ColumnId {
        self.from_column
    }

    pub fn to_column(&self) -> ColumnId {
        self.to_column
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn endpoints(&self) -> (ColumnId, ColumnId) {
        (self.from_column, self.to_column)
    }
}

/// Two relationships are the same when they connect the same columns.
impl PartialEq for Relationship {
    fn eq(&self, other: &Self) -> bool {
        self.endpoints() == other.endpoints()
    }
}

impl Eq for Relationship {}
