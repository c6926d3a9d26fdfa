//! Linear algebra for layer transforms and the canvas camera.

mod camera;
mod chain;
mod linear;

pub use camera::Camera;
pub use chain::{Affine, Transform, TransformChain};
pub use linear::{
    LinearParts, Rotation, Shear, compose_linear_matrix, decompose_linear_matrix,
    embed_in_identity_matrix, expand_upper_triangular, linear_scale,
};
