//! Shape selection arguments.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShapesError};

/// Which shapes an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndexSelector {
    /// Every shape in the collection
    #[default]
    All,
    /// An explicit list of shape indices
    List(Vec<usize>),
    /// A single shape
    One(usize),
}

impl IndexSelector {
    /// Resolve to explicit indices, checking that each is in range.
    ///
    /// Duplicates in a list are kept in their given order.
    pub fn resolve(&self, count: usize) -> Result<Vec<usize>> {
        let indices = match self {
            IndexSelector::All => return Ok((0..count).collect()),
            IndexSelector::List(list) => list.clone(),
            IndexSelector::One(index) => vec![*index],
        };
        match indices.iter().find(|&&i| i >= count) {
            Some(&index) => Err(ShapesError::IndexOutOfRange { index, count }),
            None => Ok(indices),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, IndexSelector::List(list) if list.is_empty())
    }
}

impl From<usize> for IndexSelector {
    fn from(index: usize) -> Self {
        IndexSelector::One(index)
    }
}

impl From<Vec<usize>> for IndexSelector {
    fn from(list: Vec<usize>) -> Self {
        IndexSelector::List(list)
    }
}

impl From<&[usize]> for IndexSelector {
    fn from(list: &[usize]) -> Self {
        IndexSelector::List(list.to_vec())
    }
}

/// Role of a mesh face within its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshRole {
    /// Interior fill
    Face,
    /// Border stroke
    Edge,
}

impl MeshRole {
    /// Numeric tag stored in mesh index buffers.
    pub fn code(&self) -> usize {
        match self {
            MeshRole::Face => 0,
            MeshRole::Edge => 1,
        }
    }
}
