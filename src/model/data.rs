//! Authoritative shape storage.
//!
//! `ShapesData` is an arena of shape records. Each record owns its geometry,
//! style and triangulated mesh; the flattened mesh buffers are rebuilt from the
//! records in index order after every mutation, so shape indices in the
//! buffers are always the contiguous range `0..count`.

use ndarray::Array2;

use super::mesh::{FlatMesh, ShapeMesh};
use super::selector::{IndexSelector, MeshRole};
use super::shape::{Shape, ShapeGeometry, ShapeKind, plane_points, points_to_rows};
use crate::color_utils::Color;
use crate::constants::{DEFAULT_ELLIPSE_SEGMENTS, DEFAULT_ROTATION_HANDLE_LENGTH};
use crate::error::{Result, ShapesError};
use crate::geometry::{
    Point2, add, apply_matrix, bounding_box, ellipse_outline, rotation_matrix, selection_box,
    selection_box_from_frame, sub,
};

/// Display style of one shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    pub face_color: Color,
    pub edge_color: Color,
    pub show_face: bool,
    pub show_edge: bool,
}

impl ShapeStyle {
    pub fn new(face_color: Color, edge_color: Color) -> Self {
        Self {
            face_color,
            edge_color,
            show_face: true,
            show_edge: true,
        }
    }

    pub fn color(&self, role: MeshRole) -> Color {
        match role {
            MeshRole::Face => self.face_color,
            MeshRole::Edge => self.edge_color,
        }
    }

    pub fn is_shown(&self, role: MeshRole) -> bool {
        match role {
            MeshRole::Face => self.show_face,
            MeshRole::Edge => self.show_edge,
        }
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self::new(Color::WHITE, Color::BLACK)
    }
}

/// One shape with everything derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRecord {
    pub shape: Shape,
    pub style: ShapeStyle,
    /// Oriented frame (tl, tr, br, bl) carried along with transforms.
    pub frame: [Point2; 4],
    mesh: ShapeMesh,
}

impl ShapeRecord {
    pub fn mesh(&self) -> &ShapeMesh {
        &self.mesh
    }
}

/// A geometric operation applied to shapes in the displayed plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    /// Translate by an offset
    Shift(Point2),
    /// Scale each displayed axis about the center
    Scale(Point2),
    /// Rotate about the center by an angle in degrees
    Rotate(f32),
    /// Mirror along the second displayed axis
    FlipVertical,
    /// Mirror along the first displayed axis
    FlipHorizontal,
    /// Apply a linear map about the center
    Linear([[f32; 2]; 2]),
}

impl TransformOp {
    /// The linear part, `None` for a shift.
    pub fn matrix(&self) -> Option<[[f32; 2]; 2]> {
        match *self {
            TransformOp::Shift(_) => None,
            TransformOp::Scale([s0, s1]) => Some([[s0, 0.0], [0.0, s1]]),
            TransformOp::Rotate(degrees) => Some(rotation_matrix(degrees)),
            TransformOp::FlipVertical => Some([[1.0, 0.0], [0.0, -1.0]]),
            TransformOp::FlipHorizontal => Some([[-1.0, 0.0], [0.0, 1.0]]),
            TransformOp::Linear(m) => Some(m),
        }
    }

    /// Map a point, with the linear part acting about `center`.
    pub fn apply(&self, point: Point2, center: Point2) -> Point2 {
        match (self, self.matrix()) {
            (TransformOp::Shift(offset), _) => add(point, *offset),
            (_, Some(m)) => add(center, apply_matrix(&m, sub(point, center))),
            (_, None) => point,
        }
    }
}

/// Shape storage with per-shape meshes and flattened render buffers.
#[derive(Debug, Clone)]
pub struct ShapesData {
    records: Vec<ShapeRecord>,
    mesh: FlatMesh,
    ndim: usize,
    displayed: [usize; 2],
    selected_box: Option<Array2<f32>>,
    ellipse_segments: usize,
    rotation_handle_length: f32,
}

impl ShapesData {
    /// Create empty storage for `ndim`-dimensional shapes, displaying the
    /// last two axes.
    pub fn new(ndim: usize) -> Self {
        Self::with_settings(ndim, DEFAULT_ELLIPSE_SEGMENTS, DEFAULT_ROTATION_HANDLE_LENGTH)
    }

    pub fn with_settings(ndim: usize, ellipse_segments: usize, rotation_handle_length: f32) -> Self {
        let ndim = ndim.max(2);
        Self {
            records: Vec::new(),
            mesh: FlatMesh::default(),
            ndim,
            displayed: [ndim - 2, ndim - 1],
            selected_box: None,
            ellipse_segments,
            rotation_handle_length,
        }
    }

    pub fn ndim(&self) -> usize {
        self.ndim
    }

    pub fn displayed(&self) -> [usize; 2] {
        self.displayed
    }

    /// Change the displayed plane; every shape is re-triangulated.
    pub fn set_displayed(&mut self, displayed: [usize; 2]) -> Result<()> {
        for axis in displayed {
            if axis >= self.ndim {
                return Err(ShapesError::AxisOutOfRange {
                    axis: axis as isize,
                    ndim: self.ndim,
                });
            }
        }
        if displayed[0] == displayed[1] {
            return Err(ShapesError::InvalidOrder(displayed.to_vec()));
        }
        if displayed == self.displayed {
            return Ok(());
        }

        let meshes = self
            .records
            .iter()
            .map(|r| r.shape.triangulate(displayed, self.ellipse_segments))
            .collect::<Result<Vec<_>>>()?;
        for (record, mesh) in self.records.iter_mut().zip(meshes) {
            record.frame = record.shape.bounding_frame(displayed);
            record.mesh = mesh;
        }
        self.displayed = displayed;
        self.selected_box = None;
        self.rebuild();
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ShapeRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Result<&ShapeRecord> {
        self.records.get(index).ok_or(ShapesError::IndexOutOfRange {
            index,
            count: self.records.len(),
        })
    }

    pub fn shape(&self, index: usize) -> Result<&Shape> {
        Ok(&self.record(index)?.shape)
    }

    /// Flattened render buffers.
    pub fn mesh(&self) -> &FlatMesh {
        &self.mesh
    }

    /// Add a shape and return its index.
    pub fn add(
        &mut self,
        kind: ShapeKind,
        data: Array2<f32>,
        thickness: f32,
        style: ShapeStyle,
    ) -> Result<usize> {
        self.check_ndim(&data)?;
        let shape = Shape::new(kind, data, thickness, self.displayed)?;
        let record = self.make_record(shape, style)?;
        self.records.push(record);
        self.rebuild();
        Ok(self.records.len() - 1)
    }

    /// Remove one shape; shapes after it move down by one index.
    pub fn remove(&mut self, index: usize) -> Result<ShapeRecord> {
        self.record(index)?;
        let removed = self.records.remove(index);
        self.rebuild();
        Ok(removed)
    }

    pub fn remove_all(&mut self) {
        self.records.clear();
        self.selected_box = None;
        self.mesh = FlatMesh::default();
    }

    /// Replace the vertices of a shape, keeping its index, kind and style.
    ///
    /// Ellipses cannot be edited vertex by vertex, and rectangles only accept
    /// a new 4-vertex box; use [`ShapesData::convert_to_polygon`] first for
    /// free-form editing.
    pub fn edit(&mut self, index: usize, data: Array2<f32>) -> Result<()> {
        let record = self.record(index)?;
        let kind = record.shape.kind();
        let thickness = record.shape.thickness();

        match kind {
            ShapeKind::Ellipse => {
                return Err(ShapesError::unsupported(
                    "ellipse vertices cannot be edited individually",
                ));
            }
            ShapeKind::Rectangle if data.nrows() != 4 => {
                return Err(ShapesError::invalid_vertices(
                    kind.name(),
                    format!(
                        "edit expects 4 box vertices, got {}; convert to a polygon first",
                        data.nrows()
                    ),
                ));
            }
            _ => {}
        }

        self.check_ndim(&data)?;
        let shape = Shape::new(kind, data, thickness, self.displayed)?;
        let mesh = shape.triangulate(self.displayed, self.ellipse_segments)?;
        let frame = shape.bounding_frame(self.displayed);

        let record = &mut self.records[index];
        record.shape = shape;
        record.mesh = mesh;
        record.frame = frame;
        self.rebuild();
        Ok(())
    }

    /// Turn a rectangle or ellipse into a polygon with the same outline.
    ///
    /// Polygons are left unchanged. Lines and paths have no interior to
    /// convert.
    pub fn convert_to_polygon(&mut self, index: usize) -> Result<()> {
        let record = self.record(index)?;
        let kind = record.shape.kind();
        let data = match kind {
            ShapeKind::Polygon => return Ok(()),
            ShapeKind::Line | ShapeKind::Path => {
                return Err(ShapesError::unsupported(format!(
                    "a {} cannot be converted to a polygon",
                    kind
                )));
            }
            ShapeKind::Rectangle => record.shape.data().clone(),
            ShapeKind::Ellipse => {
                let plane = record.shape.plane(self.displayed);
                let corners = <[Point2; 4]>::try_from(plane.as_slice()).map_err(|_| {
                    ShapesError::invalid_vertices(kind.name(), "box must have 4 vertices")
                })?;
                let outline = ellipse_outline(&corners, self.ellipse_segments);
                points_to_rows(record.shape.data().row(0), self.displayed, &outline)
            }
        };

        let thickness = record.shape.thickness();
        let frame = record.frame;
        let shape = Shape::from_parts(ShapeKind::Polygon, ShapeGeometry { data, thickness });
        let mesh = shape.triangulate(self.displayed, self.ellipse_segments)?;

        let record = &mut self.records[index];
        record.shape = shape;
        record.mesh = mesh;
        record.frame = frame;
        self.rebuild();
        log::debug!("converted shape {} from {} to polygon", index, kind);
        Ok(())
    }

    /// Apply a transform to the selected shapes and to the cached selection
    /// box, with the linear part acting about `center`. Each shape is
    /// transformed once, however often the selector names it.
    pub fn transform(
        &mut self,
        op: TransformOp,
        center: Point2,
        selector: &IndexSelector,
    ) -> Result<()> {
        let mut indices = selector.resolve(self.count())?;
        indices.sort_unstable();
        indices.dedup();
        let displayed = self.displayed;
        let segments = self.ellipse_segments;

        for &i in &indices {
            let mut shape = self.records[i].shape.clone();
            shape.map_plane(displayed, |p| op.apply(p, center));
            let mesh = shape.triangulate(displayed, segments)?;

            let record = &mut self.records[i];
            record.frame = record.frame.map(|p| op.apply(p, center));
            record.shape = shape;
            record.mesh = mesh;
        }

        if let Some(b) = self.selected_box.as_mut() {
            for mut row in b.rows_mut() {
                let [x, y] = op.apply([row[0], row[1]], center);
                row[0] = x;
                row[1] = y;
            }
        }

        self.rebuild();
        Ok(())
    }

    pub fn shift(&mut self, offset: Point2, selector: &IndexSelector) -> Result<()> {
        self.transform(TransformOp::Shift(offset), [0.0, 0.0], selector)
    }

    pub fn scale(&mut self, scale: Point2, center: Point2, selector: &IndexSelector) -> Result<()> {
        self.transform(TransformOp::Scale(scale), center, selector)
    }

    pub fn rotate(&mut self, degrees: f32, center: Point2, selector: &IndexSelector) -> Result<()> {
        self.transform(TransformOp::Rotate(degrees), center, selector)
    }

    pub fn flip_vertical(&mut self, center: Point2, selector: &IndexSelector) -> Result<()> {
        self.transform(TransformOp::FlipVertical, center, selector)
    }

    pub fn flip_horizontal(&mut self, center: Point2, selector: &IndexSelector) -> Result<()> {
        self.transform(TransformOp::FlipHorizontal, center, selector)
    }

    /// Set border thickness. Border vertices are recomputed from the stored
    /// centers and offsets without re-triangulating.
    pub fn set_thickness(&mut self, selector: &IndexSelector, thickness: f32) -> Result<()> {
        for i in selector.resolve(self.count())? {
            self.records[i].shape.geometry_mut().thickness = thickness;
        }
        self.rebuild();
        Ok(())
    }

    pub fn set_face_color(&mut self, selector: &IndexSelector, color: Color) -> Result<()> {
        for i in selector.resolve(self.count())? {
            self.records[i].style.face_color = color;
        }
        Ok(())
    }

    pub fn set_edge_color(&mut self, selector: &IndexSelector, color: Color) -> Result<()> {
        for i in selector.resolve(self.count())? {
            self.records[i].style.edge_color = color;
        }
        Ok(())
    }

    /// Show or hide the fill, the border, or both (`role == None`).
    pub fn set_visibility(
        &mut self,
        selector: &IndexSelector,
        role: Option<MeshRole>,
        show: bool,
    ) -> Result<()> {
        for i in selector.resolve(self.count())? {
            let style = &mut self.records[i].style;
            if role != Some(MeshRole::Edge) {
                style.show_face = show;
            }
            if role != Some(MeshRole::Face) {
                style.show_edge = show;
            }
        }
        Ok(())
    }

    /// Compute and cache the selection box of the given shapes.
    ///
    /// An empty selection clears the box.
    pub fn select_box(&mut self, selector: &IndexSelector) -> Result<()> {
        let indices = selector.resolve(self.count())?;
        self.selected_box = self.compute_box(&indices);
        Ok(())
    }

    pub fn clear_box(&mut self) {
        self.selected_box = None;
    }

    /// Cached 10-point selection box, if any shapes are selected.
    pub fn selected_box(&self) -> Option<&Array2<f32>> {
        self.selected_box.as_ref()
    }

    /// Selection box of the given shapes without caching it.
    ///
    /// A single shape uses its own oriented frame; several shapes use the
    /// axis-aligned bounds of all their vertices.
    pub fn compute_box(&self, indices: &[usize]) -> Option<Array2<f32>> {
        match indices {
            [] => None,
            [single] => {
                let record = self.records.get(*single)?;
                Some(selection_box_from_frame(
                    &record.frame,
                    self.rotation_handle_length,
                ))
            }
            _ => {
                let points = indices
                    .iter()
                    .filter_map(|&i| self.records.get(i))
                    .flat_map(|r| plane_points(r.shape.data(), self.displayed));
                bounding_box(points).map(|b| selection_box(b, self.rotation_handle_length))
            }
        }
    }

    /// Vertices of a shape in the displayed plane.
    pub fn vertices(&self, index: usize) -> Result<Vec<Point2>> {
        Ok(self.shape(index)?.plane(self.displayed))
    }

    /// Whether a shape lies in the slice given by per-axis indices.
    ///
    /// Every vertex must match exactly on every axis with a slice index.
    /// Axes with `None` (the displayed ones) are ignored.
    pub fn in_slice(&self, index: usize, indices: &[Option<f32>]) -> Result<bool> {
        let data = self.shape(index)?.data();
        Ok(slice_matches(data, indices))
    }

    /// Per-shape slice visibility.
    pub fn slice_mask(&self, indices: &[Option<f32>]) -> Vec<bool> {
        self.records
            .iter()
            .map(|r| slice_matches(r.shape.data(), indices))
            .collect()
    }

    fn check_ndim(&self, data: &Array2<f32>) -> Result<()> {
        if data.ncols() != self.ndim {
            return Err(ShapesError::DimensionMismatch {
                expected: self.ndim,
                found: data.ncols(),
            });
        }
        Ok(())
    }

    fn make_record(&self, shape: Shape, style: ShapeStyle) -> Result<ShapeRecord> {
        let mesh = shape.triangulate(self.displayed, self.ellipse_segments)?;
        let frame = shape.bounding_frame(self.displayed);
        Ok(ShapeRecord {
            shape,
            style,
            frame,
            mesh,
        })
    }

    fn rebuild(&mut self) {
        self.mesh = FlatMesh::build(
            self.records
                .iter()
                .map(|r| (r.shape.kind(), &r.mesh, r.shape.thickness())),
        );
    }
}

fn slice_matches(data: &Array2<f32>, indices: &[Option<f32>]) -> bool {
    indices
        .iter()
        .enumerate()
        .filter_map(|(axis, index)| index.map(|v| (axis, v)))
        .filter(|(axis, _)| *axis < data.ncols())
        .all(|(axis, value)| data.column(axis).iter().all(|&c| c == value))
}
