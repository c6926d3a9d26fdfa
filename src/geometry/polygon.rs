//! Point containment tests.

use ndarray::{ArrayView2, ArrayView3, Axis};

use super::Point2;

/// Check if a point is inside a polygon (ray casting algorithm).
///
/// `vertices` is an `N x 2` array; the polygon is implicitly closed.
pub fn inside_polygon(point: Point2, vertices: ArrayView2<f32>) -> bool {
    let n = vertices.nrows();
    if n < 3 {
        return false;
    }

    let (x, y) = (point[0], point[1]);
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (vertices[[i, 0]], vertices[[i, 1]]);
        let (xj, yj) = (vertices[[j, 0]], vertices[[j, 1]]);
        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Which of a `T x 3 x 2` batch of triangles contain the origin.
///
/// Triangles are expected to be pre-offset by the query point. Uses a
/// same-side test on the three edges, so winding order does not matter.
pub fn inside_triangles(triangles: ArrayView3<f32>) -> Vec<bool> {
    triangles
        .axis_iter(Axis(0))
        .map(|t| {
            let a = [t[[0, 0]], t[[0, 1]]];
            let b = [t[[1, 0]], t[[1, 1]]];
            let c = [t[[2, 0]], t[[2, 1]]];

            // Sign of the origin relative to each directed edge.
            let side = |p: Point2, q: Point2| (q[0] - p[0]) * (-p[1]) - (q[1] - p[1]) * (-p[0]);
            let s_ab = side(a, b) >= 0.0;
            let s_ac = side(a, c) >= 0.0;
            let s_bc = side(b, c) >= 0.0;
            s_ab != s_ac && s_ab == s_bc
        })
        .collect()
}

/// Check that `order` is a permutation of `0..n`.
pub fn is_permutation(order: &[usize], n: usize) -> bool {
    if order.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &i in order {
        if i >= n || seen[i] {
            return false;
        }
        seen[i] = true;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, array};

    #[test]
    fn test_inside_polygon_square() {
        let square = array![[0.0, 0.0], [100.0, 0.0], [100.0, 100.0], [0.0, 100.0]];
        assert!(inside_polygon([50.0, 50.0], square.view()));
        assert!(!inside_polygon([150.0, 50.0], square.view()));
    }

    #[test]
    fn test_inside_polygon_concave() {
        // U shape, the notch is outside
        let u = array![
            [0.0, 0.0],
            [30.0, 0.0],
            [30.0, 30.0],
            [20.0, 30.0],
            [20.0, 10.0],
            [10.0, 10.0],
            [10.0, 30.0],
            [0.0, 30.0]
        ];
        assert!(inside_polygon([5.0, 20.0], u.view()));
        assert!(!inside_polygon([15.0, 20.0], u.view()));
    }

    #[test]
    fn test_inside_triangles_both_windings() {
        let mut t = Array3::<f32>::zeros((3, 3, 2));
        // Counter-clockwise around origin
        t.slice_mut(ndarray::s![0, .., ..])
            .assign(&array![[-1.0, -1.0], [1.0, -1.0], [0.0, 1.0]]);
        // Clockwise around origin
        t.slice_mut(ndarray::s![1, .., ..])
            .assign(&array![[-1.0, -1.0], [0.0, 1.0], [1.0, -1.0]]);
        // Away from origin
        t.slice_mut(ndarray::s![2, .., ..])
            .assign(&array![[2.0, 2.0], [3.0, 2.0], [2.0, 3.0]]);

        assert_eq!(inside_triangles(t.view()), vec![true, true, false]);
    }

    #[test]
    fn test_is_permutation() {
        assert!(is_permutation(&[2, 0, 1], 3));
        assert!(is_permutation(&[], 0));
        assert!(!is_permutation(&[0, 0, 1], 3));
        assert!(!is_permutation(&[0, 1], 3));
        assert!(!is_permutation(&[0, 1, 3], 3));
    }
}
