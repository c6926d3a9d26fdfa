//! Shape data model: shape kinds, per-shape meshes and the shape store.

mod data;
mod mesh;
mod selector;
mod shape;

pub use data::{ShapeRecord, ShapeStyle, ShapesData, TransformOp};
pub use mesh::{FlatMesh, ShapeMesh};
pub use selector::{IndexSelector, MeshRole};
pub use shape::{MIN_PATH_VERTICES, MIN_POLYGON_VERTICES, Shape, ShapeGeometry, ShapeKind};
