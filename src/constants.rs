//! Global constants for shape editing

/// Default handle size (and handle hit tolerance) in data units
pub const DEFAULT_VERTEX_SIZE: f32 = 10.0;

/// Default border thickness of new shapes
pub const DEFAULT_EDGE_WIDTH: f32 = 1.0;

/// Default highlight overlay thickness
pub const DEFAULT_HIGHLIGHT_THICKNESS: f32 = 0.5;

/// Default highlight color (RGB)
pub const DEFAULT_HIGHLIGHT_COLOR: [f32; 3] = [0.0, 0.6, 1.0];

/// Default distance of the rotation handle above the top edge of the box
pub const DEFAULT_ROTATION_HANDLE_LENGTH: f32 = 20.0;

/// Default number of segments used to approximate an ellipse
pub const DEFAULT_ELLIPSE_SEGMENTS: usize = 100;

/// Width of the box outline and marquee outline
pub const OUTLINE_WIDTH: f32 = 1.0;

/// Longest miter allowed at a border join, in units of half thickness
pub const MITER_LIMIT: f32 = 5.0;

/// Rotation snapping increment (degrees) while Shift is held
pub const ROTATION_SNAP_DEGREES: f32 = 45.0;

/// Layout of the 10-point selection box.
pub mod handle {
    /// Number of corner and edge-midpoint handles
    pub const BOX_HANDLES: usize = 8;
    /// Index of the box center
    pub const CENTER: usize = 8;
    /// Index of the rotation handle in the box array
    pub const ROTATION: usize = 9;
    /// Index reported by hit testing when the rotation handle is hit
    pub const ROTATION_HIT: usize = 8;
    /// Total number of points in the selection box
    pub const BOX_POINTS: usize = 10;
}
