//! Error types for shape storage, interaction and transform operations.

use thiserror::Error;

/// Errors that can occur while editing shapes or configuring a layer.
#[derive(Error, Debug)]
pub enum ShapesError {
    /// A z-order that is not a permutation of `0..count`
    #[error("z_order is not a permutation of 0..{count}: {order:?}")]
    InvalidZOrder {
        /// The rejected order
        order: Vec<usize>,
        /// Number of shapes the order must cover
        count: usize,
    },

    /// Shape index outside of the collection
    #[error("Shape index {index} out of range for {count} shapes")]
    IndexOutOfRange {
        /// The requested index
        index: usize,
        /// Number of shapes in the collection
        count: usize,
    },

    /// Vertex index outside of a shape
    #[error("Vertex {vertex} out of range for shape {shape} with {count} vertices")]
    VertexOutOfRange {
        /// The shape index
        shape: usize,
        /// The requested vertex
        vertex: usize,
        /// Number of vertices in the shape
        count: usize,
    },

    /// Interaction mode string not recognised
    #[error("Mode not recognized: '{0}'")]
    UnknownMode(String),

    /// Color name or hex string not recognised
    #[error("Unknown color: '{0}'")]
    UnknownColor(String),

    /// Operation that is deliberately not supported for a shape kind
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Vertex array that does not fit the shape kind
    #[error("Invalid vertices for {kind}: {message}")]
    InvalidVertices {
        /// Shape kind name
        kind: &'static str,
        /// Description of the problem
        message: String,
    },

    /// Coordinate dimensionality mismatch
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected number of dimensions
        expected: usize,
        /// Found number of dimensions
        found: usize,
    },

    /// Axis outside of the dims range
    #[error("Axis {axis} out of range for {ndim} dimensions")]
    AxisOutOfRange {
        /// The requested axis (may be negative)
        axis: isize,
        /// Number of dimensions
        ndim: usize,
    },

    /// Axis order that is not a permutation
    #[error("Invalid axis order {0:?}")]
    InvalidOrder(Vec<usize>),

    /// Number of displayed dimensions other than 2 or 3
    #[error("Invalid number of displayed dimensions {0}")]
    InvalidNdisplay(usize),

    /// Malformed transform parameters
    #[error("Invalid transform: {0}")]
    InvalidTransform(String),

    /// Matrix could not be inverted
    #[error("Matrix is singular")]
    SingularMatrix,

    /// Cholesky factorisation failed
    #[error("Matrix is not positive definite")]
    NotPositiveDefinite,

    /// Polygon fill tessellation failed
    #[error("Tessellation failed: {0}")]
    Tessellation(String),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShapesError {
    /// Create an invalid vertices error with a message.
    pub fn invalid_vertices(kind: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidVertices {
            kind,
            message: message.into(),
        }
    }

    /// Create an unsupported operation error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation(message.into())
    }

    /// Create an invalid transform error.
    pub fn invalid_transform(message: impl Into<String>) -> Self {
        Self::InvalidTransform(message.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ShapesError>;
