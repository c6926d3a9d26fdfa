//! Pan/zoom camera mapping the displayed world plane to canvas pixels.

use nalgebra::{DMatrix, DVector};

use super::chain::Affine;
use crate::geometry::Point2;

/// Zoom factor and pan offset of the canvas.
///
/// `canvas = zoom * world + pan`, per displayed axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub zoom: f32,
    pub pan: Point2,
}

impl Camera {
    pub fn new(zoom: f32, pan: Point2) -> Self {
        Self { zoom, pan }
    }

    /// Zoom 1, no pan.
    pub fn identity() -> Self {
        Self::new(1.0, [0.0, 0.0])
    }

    /// World point under a canvas position.
    pub fn canvas_to_world(&self, canvas: Point2) -> Point2 {
        [
            (canvas[0] - self.pan[0]) / self.zoom,
            (canvas[1] - self.pan[1]) / self.zoom,
        ]
    }

    pub fn world_to_canvas(&self, world: Point2) -> Point2 {
        [
            world[0] * self.zoom + self.pan[0],
            world[1] * self.zoom + self.pan[1],
        ]
    }

    /// Change zoom while keeping the world point under `cursor` fixed.
    pub fn zoom_to_cursor(&self, new_zoom: f32, cursor: Point2) -> Camera {
        let world = self.canvas_to_world(cursor);
        Camera {
            zoom: new_zoom,
            pan: [
                cursor[0] - world[0] * new_zoom,
                cursor[1] - world[1] * new_zoom,
            ],
        }
    }

    pub fn pan_by(&self, delta: Point2) -> Camera {
        Camera {
            zoom: self.zoom,
            pan: [self.pan[0] + delta[0], self.pan[1] + delta[1]],
        }
    }

    /// Zoom in by a factor (e.g., 1.2 for 20% zoom in).
    pub fn zoom_in(&self, factor: f32, max_zoom: f32) -> Camera {
        Camera {
            zoom: (self.zoom * factor).min(max_zoom),
            pan: self.pan,
        }
    }

    pub fn zoom_out(&self, factor: f32, min_zoom: f32) -> Camera {
        Camera {
            zoom: (self.zoom / factor).max(min_zoom),
            pan: self.pan,
        }
    }

    /// World to canvas as a 2-D affine transform.
    pub fn to_affine(&self) -> Affine {
        Affine {
            a: DMatrix::from_diagonal_element(2, 2, self.zoom as f64),
            b: DVector::from_vec(vec![self.pan[0] as f64, self.pan[1] as f64]),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::Transform;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_identity_camera() {
        let c = Camera::identity();
        assert_eq!(c.canvas_to_world([12.0, 7.0]), [12.0, 7.0]);
    }

    #[test]
    fn test_zoom_to_cursor_preserves_cursor_point() {
        let c = Camera::new(1.0, [50.0, 30.0]);
        let cursor = [150.0, 120.0];
        let before = c.canvas_to_world(cursor);

        let zoomed = c.zoom_to_cursor(2.0, cursor);
        let after = zoomed.canvas_to_world(cursor);

        assert_eq!(zoomed.zoom, 2.0);
        assert!(approx_eq(before[0], after[0]));
        assert!(approx_eq(before[1], after[1]));
    }

    #[test]
    fn test_pan_by_preserves_zoom() {
        let c = Camera::new(2.5, [10.0, 20.0]).pan_by([5.0, -10.0]);
        assert_eq!(c.zoom, 2.5);
        assert_eq!(c.pan, [15.0, 10.0]);
    }

    #[test]
    fn test_zoom_limits() {
        let c = Camera::new(4.0, [0.0, 0.0]);
        assert_eq!(c.zoom_in(1.5, 5.0).zoom, 5.0);
        let c = Camera::new(0.3, [0.0, 0.0]);
        assert!(approx_eq(c.zoom_out(1.5, 0.2).zoom, 0.2));
    }

    #[test]
    fn test_to_affine_matches_world_to_canvas() {
        let c = Camera::new(2.0, [3.0, -4.0]);
        let mapped = Transform::Affine(c.to_affine()).map(&[1.0, 1.0]).unwrap();
        let direct = c.world_to_canvas([1.0, 1.0]);
        assert!(approx_eq(mapped[0] as f32, direct[0]));
        assert!(approx_eq(mapped[1] as f32, direct[1]));
    }
}
