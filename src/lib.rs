//! nd-shapes - interactive shape layer for n-dimensional image annotation
//!
//! Stores lines, paths, polygons, rectangles and ellipses with N-D vertices,
//! triangulates them in the displayed plane and runs the pointer/keyboard
//! state machine used to select, move, resize, rotate and draw them.

pub mod color_utils;
pub mod config;
pub mod constants;
pub mod dims;
pub mod error;
pub mod geometry;
pub mod keybindings;
pub mod layer;
pub mod model;
pub mod transforms;

pub use color_utils::Color;
pub use config::{ConfigError, LayerConfig, LogLevel};
pub use dims::{AxisRange, Dims};
pub use error::{Result, ShapesError};
pub use keybindings::KeyBindings;
pub use layer::{
    InteractionState, Key, KeyEvent, LayerVisuals, Modifiers, Mode, MouseEvent, ShapeBatch,
    ShapesLayer,
};
pub use model::{IndexSelector, MeshRole, Shape, ShapeKind, ShapesData};
pub use transforms::{Affine, Camera, Transform, TransformChain};
