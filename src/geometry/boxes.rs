//! Box expansion and selection-handle helpers.

use ndarray::Array2;

use super::{Point2, add, midpoint, norm, scaled, sub};
use crate::constants::handle;

/// Canonicalize a two-corner box into top-left, top-right, bottom-right,
/// bottom-left. Either corner may be the minimum.
pub fn expand_box(corners: [Point2; 2]) -> [Point2; 4] {
    let [a, b] = corners;
    let (min0, max0) = (a[0].min(b[0]), a[0].max(b[0]));
    let (min1, max1) = (a[1].min(b[1]), a[1].max(b[1]));
    [[min0, min1], [max0, min1], [max0, max1], [min0, max1]]
}

/// Corners plus edge midpoints, clockwise from top-left:
/// tl, top, tr, right, br, bottom, bl, left.
///
/// Opposite handles are always 4 apart, corners have even indices.
pub fn expand_bounding_box(corners: [Point2; 2]) -> [Point2; 8] {
    handle_ring(&expand_box(corners))
}

/// The 10-point selection box of an axis-aligned two-corner box: 8 box
/// handles, the center, and the rotation handle placed `handle_length` above
/// the top edge.
pub fn selection_box(corners: [Point2; 2], handle_length: f32) -> Array2<f32> {
    ring_to_selection_box(expand_bounding_box(corners), handle_length)
}

/// The 10-point selection box of an oriented frame given as tl, tr, br, bl.
///
/// The rotation handle sits on the line from the center through the top
/// midpoint, so it follows the frame when it is rotated.
pub fn selection_box_from_frame(frame: &[Point2; 4], handle_length: f32) -> Array2<f32> {
    ring_to_selection_box(handle_ring(frame), handle_length)
}

fn handle_ring(frame: &[Point2; 4]) -> [Point2; 8] {
    let [c0, c1, c2, c3] = *frame;
    [
        c0,
        midpoint(c0, c1),
        c1,
        midpoint(c1, c2),
        c2,
        midpoint(c2, c3),
        c3,
        midpoint(c3, c0),
    ]
}

fn ring_to_selection_box(ring: [Point2; 8], handle_length: f32) -> Array2<f32> {
    let center = midpoint(ring[0], ring[4]);
    let top = ring[1];
    let up = sub(top, center);
    let len = norm(up);
    let direction = if len > 0.0 {
        scaled(up, 1.0 / len)
    } else {
        [0.0, -1.0]
    };
    let rotation = add(top, scaled(direction, handle_length));

    let mut out = Array2::zeros((handle::BOX_POINTS, 2));
    for (i, p) in ring.iter().chain([center, rotation].iter()).enumerate() {
        out[[i, 0]] = p[0];
        out[[i, 1]] = p[1];
    }
    out
}

/// Axis-aligned bounds `[min, max]` of a point set, `None` when empty.
pub fn bounding_box<I>(points: I) -> Option<[Point2; 2]>
where
    I: IntoIterator<Item = Point2>,
{
    let mut iter = points.into_iter();
    let first = iter.next()?;
    let (mut min, mut max) = (first, first);
    for p in iter {
        min = [min[0].min(p[0]), min[1].min(p[1])];
        max = [max[0].max(p[0]), max[1].max(p[1])];
    }
    Some([min, max])
}

/// Check if a point lies inside (or on) an axis-aligned box.
#[inline]
pub fn point_in_box(point: Point2, min: Point2, max: Point2) -> bool {
    point[0] >= min[0] && point[0] <= max[0] && point[1] >= min[1] && point[1] <= max[1]
}

/// Nudge the second corner by one unit on any axis where the box has no extent.
pub fn nudge_degenerate(corners: [Point2; 2]) -> [Point2; 2] {
    let [a, mut b] = corners;
    for axis in 0..2 {
        if a[axis] == b[axis] {
            b[axis] += 1.0;
        }
    }
    [a, b]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_box_any_corner_order() {
        let expected = [[10.0, 20.0], [50.0, 20.0], [50.0, 80.0], [10.0, 80.0]];
        assert_eq!(expand_box([[10.0, 20.0], [50.0, 80.0]]), expected);
        assert_eq!(expand_box([[50.0, 80.0], [10.0, 20.0]]), expected);
        assert_eq!(expand_box([[10.0, 80.0], [50.0, 20.0]]), expected);
    }

    #[test]
    fn test_expand_bounding_box_opposites() {
        let ring = expand_bounding_box([[0.0, 0.0], [40.0, 20.0]]);
        assert_eq!(ring[1], [20.0, 0.0]);
        assert_eq!(ring[3], [40.0, 10.0]);
        for i in 0..4 {
            assert_eq!(midpoint(ring[i], ring[i + 4]), [20.0, 10.0]);
        }
    }

    #[test]
    fn test_selection_box_layout() {
        let b = selection_box([[10.0, 10.0], [50.0, 50.0]], 20.0);
        assert_eq!(b.nrows(), 10);
        assert_eq!([b[[8, 0]], b[[8, 1]]], [30.0, 30.0]);
        assert_eq!([b[[9, 0]], b[[9, 1]]], [30.0, -10.0]);
    }

    #[test]
    fn test_selection_box_follows_rotated_frame() {
        // Square of side 20 rotated by 90 degrees: the top edge is on the right
        let frame = [[20.0, 0.0], [20.0, 20.0], [0.0, 20.0], [0.0, 0.0]];
        let b = selection_box_from_frame(&frame, 10.0);
        assert_eq!([b[[8, 0]], b[[8, 1]]], [10.0, 10.0]);
        assert_eq!([b[[1, 0]], b[[1, 1]]], [20.0, 10.0]);
        assert_eq!([b[[9, 0]], b[[9, 1]]], [30.0, 10.0]);
    }

    #[test]
    fn test_bounding_box() {
        assert_eq!(bounding_box(Vec::<Point2>::new()), None);
        let b = bounding_box(vec![[3.0, -1.0], [0.0, 4.0], [2.0, 2.0]]).unwrap();
        assert_eq!(b, [[0.0, -1.0], [3.0, 4.0]]);
    }

    #[test]
    fn test_nudge_degenerate() {
        assert_eq!(
            nudge_degenerate([[5.0, 5.0], [5.0, 9.0]]),
            [[5.0, 5.0], [6.0, 9.0]]
        );
        assert_eq!(
            nudge_degenerate([[1.0, 2.0], [3.0, 4.0]]),
            [[1.0, 2.0], [3.0, 4.0]]
        );
    }
}
