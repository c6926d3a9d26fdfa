//! Dimension slider state: which axes are displayed and where the others are
//! sliced.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShapesError};
use crate::geometry::is_permutation;

/// Slider range of one axis, `stop` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub start: f32,
    pub stop: f32,
    pub step: f32,
}

impl Default for AxisRange {
    fn default() -> Self {
        Self {
            start: 0.0,
            stop: 2.0,
            step: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dims {
    /// Per-axis range, `None` when the axis is unbounded.
    range: Vec<Option<AxisRange>>,
    /// Slider position of every axis.
    point: Vec<f32>,
    /// Axis order; the last `ndisplay` entries are displayed.
    order: Vec<usize>,
    ndisplay: usize,
    axis_labels: Vec<String>,
}

impl Dims {
    pub fn new(ndim: usize) -> Self {
        let mut dims = Self {
            range: Vec::new(),
            point: Vec::new(),
            order: Vec::new(),
            ndisplay: 2,
            axis_labels: Vec::new(),
        };
        dims.set_ndim(ndim);
        dims
    }

    pub fn ndim(&self) -> usize {
        self.point.len()
    }

    /// Grow by inserting leading axes, or shrink by dropping leading axes
    /// while keeping the relative order of the rest.
    pub fn set_ndim(&mut self, ndim: usize) {
        let current = self.ndim();
        if ndim > current {
            for _ in current..ndim {
                self.range.insert(0, None);
                self.point.insert(0, 0.0);
                self.axis_labels.insert(0, String::new());
                let shifted = self.order.iter().map(|o| o + 1);
                self.order = std::iter::once(0).chain(shifted).collect();
            }
        } else if ndim < current {
            let drop = current - ndim;
            self.range.drain(..drop);
            self.point.drain(..drop);
            self.axis_labels.drain(..drop);
            let kept: Vec<usize> = self.order[drop..].to_vec();
            self.order = compact_order(&kept);
        }
        log::debug!("dims: ndim {} -> {}", current, ndim);
    }

    pub fn range(&self) -> &[Option<AxisRange>] {
        &self.range
    }

    pub fn point(&self) -> &[f32] {
        &self.point
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn ndisplay(&self) -> usize {
        self.ndisplay
    }

    pub fn axis_labels(&self) -> &[String] {
        &self.axis_labels
    }

    pub fn set_range(&mut self, axis: isize, range: Option<AxisRange>) -> Result<()> {
        let axis = self.axis_index(axis)?;
        self.range[axis] = range;
        Ok(())
    }

    pub fn set_point(&mut self, axis: isize, value: f32) -> Result<()> {
        let axis = self.axis_index(axis)?;
        if self.point[axis] != value {
            log::debug!("dims: axis {} point {} -> {}", axis, self.point[axis], value);
            self.point[axis] = value;
        }
        Ok(())
    }

    pub fn set_axis_label(&mut self, axis: isize, label: impl Into<String>) -> Result<()> {
        let axis = self.axis_index(axis)?;
        self.axis_labels[axis] = label.into();
        Ok(())
    }

    /// Set the axis order, which must be a permutation of all axes.
    pub fn set_order(&mut self, order: Vec<usize>) -> Result<()> {
        if !is_permutation(&order, self.ndim()) {
            return Err(ShapesError::InvalidOrder(order));
        }
        self.order = order;
        Ok(())
    }

    pub fn set_ndisplay(&mut self, ndisplay: usize) -> Result<()> {
        if ndisplay != 2 && ndisplay != 3 {
            return Err(ShapesError::InvalidNdisplay(ndisplay));
        }
        self.ndisplay = ndisplay;
        Ok(())
    }

    /// Axes currently displayed, in display order.
    pub fn displayed(&self) -> &[usize] {
        let n = self.order.len();
        &self.order[n.saturating_sub(self.ndisplay)..]
    }

    pub fn not_displayed(&self) -> &[usize] {
        let n = self.order.len();
        &self.order[..n.saturating_sub(self.ndisplay)]
    }

    /// Rank of each displayed axis among the displayed axes.
    pub fn displayed_order(&self) -> Vec<usize> {
        compact_order(self.displayed())
    }

    /// Slice index of every axis, `None` for displayed axes.
    ///
    /// Points are clipped to the axis range and divided by its step.
    pub fn indices(&self) -> Vec<Option<f32>> {
        let displayed = self.displayed();
        (0..self.ndim())
            .map(|axis| {
                if displayed.contains(&axis) {
                    return None;
                }
                let p = self.point[axis];
                Some(match self.range[axis] {
                    Some(r) => {
                        let lower = r.start.round();
                        let clipped = p.clamp(lower, (r.stop.round() - 1.0).max(lower));
                        (clipped / r.step).round()
                    }
                    None => p.round(),
                })
            })
            .collect()
    }

    /// Per-axis upper bound used to clamp new shapes, `None` when unbounded.
    pub fn max_shape(&self) -> Vec<Option<f32>> {
        self.range.iter().map(|r| r.map(|r| r.stop)).collect()
    }

    /// Roll axis order by one.
    pub fn roll(&mut self) {
        self.order.rotate_right(1);
    }

    /// Swap the two last displayed axes.
    pub fn transpose(&mut self) {
        let n = self.order.len();
        if n >= 2 {
            self.order.swap(n - 2, n - 1);
        }
    }

    fn axis_index(&self, axis: isize) -> Result<usize> {
        let ndim = self.ndim();
        let resolved = if axis < 0 { axis + ndim as isize } else { axis };
        if resolved < 0 || resolved as usize >= ndim {
            return Err(ShapesError::AxisOutOfRange { axis, ndim });
        }
        Ok(resolved as usize)
    }
}

impl Default for Dims {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Replace values by their rank, e.g. `[3, 1, 2] -> [2, 0, 1]`.
fn compact_order(values: &[usize]) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..values.len()).collect();
    ranked.sort_by_key(|&i| values[i]);
    let mut out = vec![0; values.len()];
    for (rank, &i) in ranked.iter().enumerate() {
        out[i] = rank;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_dims_displays_last_two() {
        let dims = Dims::new(4);
        assert_eq!(dims.order(), &[0, 1, 2, 3]);
        assert_eq!(dims.displayed(), &[2, 3]);
        assert_eq!(dims.not_displayed(), &[0, 1]);
    }

    #[test]
    fn test_set_ndim_grow_and_shrink() {
        let mut dims = Dims::new(2);
        dims.set_order(vec![1, 0]).unwrap();
        dims.set_ndim(3);
        assert_eq!(dims.order(), &[0, 2, 1]);

        dims.set_ndim(2);
        assert_eq!(dims.order(), &[1, 0]);
        assert_eq!(dims.ndim(), 2);
    }

    #[test]
    fn test_negative_axis() {
        let mut dims = Dims::new(3);
        dims.set_point(-3, 5.0).unwrap();
        assert_eq!(dims.point()[0], 5.0);
        assert!(matches!(
            dims.set_point(3, 1.0),
            Err(ShapesError::AxisOutOfRange { axis: 3, ndim: 3 })
        ));
        assert!(dims.set_point(-4, 1.0).is_err());
    }

    #[test]
    fn test_invalid_order_rejected() {
        let mut dims = Dims::new(3);
        assert!(dims.set_order(vec![0, 0, 1]).is_err());
        assert_eq!(dims.order(), &[0, 1, 2]);
    }

    #[test]
    fn test_indices_clip_to_range() {
        let mut dims = Dims::new(3);
        dims.set_point(0, 12.0).unwrap();
        assert_eq!(dims.indices(), vec![Some(12.0), None, None]);

        dims.set_range(
            0,
            Some(AxisRange {
                start: 0.0,
                stop: 10.0,
                step: 1.0,
            }),
        )
        .unwrap();
        assert_eq!(dims.indices()[0], Some(9.0));
        assert_eq!(dims.max_shape(), vec![Some(10.0), None, None]);
    }

    #[test]
    fn test_displayed_order_and_transpose() {
        let mut dims = Dims::new(3);
        dims.transpose();
        assert_eq!(dims.displayed(), &[2, 1]);
        assert_eq!(dims.displayed_order(), vec![1, 0]);
        dims.roll();
        assert_eq!(dims.order(), &[1, 0, 2]);
    }

    #[test]
    fn test_ndisplay_validation() {
        let mut dims = Dims::new(3);
        assert!(dims.set_ndisplay(4).is_err());
        dims.set_ndisplay(3).unwrap();
        assert!(dims.not_displayed().is_empty());
    }
}
