//! The shapes layer controller.
//!
//! Owns display state (z-order, selection, hover, highlight), maps pointer
//! positions to data coordinates and runs the interaction state machine on top
//! of [`ShapesData`]. Every change marks the layer dirty; hosts poll
//! [`ShapesLayer::visuals`] and call [`ShapesLayer::clear_dirty`] after
//! drawing.

mod events;
mod hit;
mod interaction;
mod mode;
mod visuals;

#[cfg(test)]
mod tests;

use ndarray::Array2;

pub use events::{Key, KeyEvent, Modifiers, MouseEvent};
pub use interaction::InteractionState;
pub use mode::Mode;
pub use visuals::{LayerVisuals, LineVisual, MarkerVisual, MeshVisual};

use crate::color_utils::Color;
use crate::config::LayerConfig;
use crate::constants::{ROTATION_SNAP_DEGREES, handle};
use crate::dims::Dims;
use crate::error::{Result, ShapesError};
use crate::geometry::{Point2, dot, handle_angle, is_permutation, norm, scaled, sub};
use crate::model::{IndexSelector, MeshRole, ShapeKind, ShapeStyle, ShapesData, TransformOp};
use crate::transforms::{Camera, Transform, TransformChain};

/// Shapes to add in one call, grouped by kind.
#[derive(Debug, Clone, Default)]
pub struct ShapeBatch {
    pub lines: Vec<Array2<f32>>,
    pub rectangles: Vec<Array2<f32>>,
    pub ellipses: Vec<Array2<f32>>,
    pub paths: Vec<Array2<f32>>,
    pub polygons: Vec<Array2<f32>>,
}

impl ShapeBatch {
    pub fn len(&self) -> usize {
        self.lines.len()
            + self.rectangles.len()
            + self.ellipses.len()
            + self.paths.len()
            + self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn into_items(self) -> impl Iterator<Item = (ShapeKind, Array2<f32>)> {
        let tag = |kind: ShapeKind, items: Vec<Array2<f32>>| {
            items.into_iter().map(move |data| (kind, data))
        };
        tag(ShapeKind::Line, self.lines)
            .chain(tag(ShapeKind::Rectangle, self.rectangles))
            .chain(tag(ShapeKind::Ellipse, self.ellipses))
            .chain(tag(ShapeKind::Path, self.paths))
            .chain(tag(ShapeKind::Polygon, self.polygons))
    }
}

/// Shape under the pointer and, when a handle or vertex is hit, its index.
pub type Hover = (Option<usize>, Option<usize>);

/// An interactive layer of N-D shapes.
#[derive(Debug, Clone)]
pub struct ShapesLayer {
    data: ShapesData,
    /// Paint order, `z_order[0]` is the frontmost shape.
    z_order: Vec<usize>,
    mode: Mode,
    /// Mode to restore when the momentary pan/zoom key is released
    mode_history: Mode,
    state: InteractionState,
    selected: Vec<usize>,
    hover: Hover,
    fixed_aspect: bool,
    aspect_ratio: f32,
    mouse_coord: Point2,
    config: LayerConfig,
    dims: Dims,
    transforms: TransformChain,
    camera: Camera,
    status: String,
    visuals: LayerVisuals,
    dirty: bool,
}

impl ShapesLayer {
    pub fn new(ndim: usize) -> Self {
        Self::with_config(ndim, LayerConfig::default())
    }

    pub fn with_config(ndim: usize, config: LayerConfig) -> Self {
        let ndim = ndim.max(2);
        let data = ShapesData::with_settings(
            ndim,
            config.ellipse_segments,
            config.rotation_handle_length,
        );
        let mut layer = Self {
            data,
            z_order: Vec::new(),
            mode: Mode::PanZoom,
            mode_history: Mode::PanZoom,
            state: InteractionState::Idle,
            selected: Vec::new(),
            hover: (None, None),
            fixed_aspect: false,
            aspect_ratio: 1.0,
            mouse_coord: [0.0, 0.0],
            config,
            dims: Dims::new(ndim),
            transforms: TransformChain::default(),
            camera: Camera::identity(),
            status: String::new(),
            visuals: LayerVisuals::default(),
            dirty: false,
        };
        layer.refresh();
        layer
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn count(&self) -> usize {
        self.data.count()
    }

    pub fn data(&self) -> &ShapesData {
        &self.data
    }

    pub fn z_order(&self) -> &[usize] {
        &self.z_order
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn selected_shapes(&self) -> &[usize] {
        &self.selected
    }

    pub fn hover(&self) -> Hover {
        self.hover
    }

    pub fn fixed_aspect(&self) -> bool {
        self.fixed_aspect
    }

    /// Status bar message for the last pointer position.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    pub fn dims(&self) -> &Dims {
        &self.dims
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn transforms(&self) -> &TransformChain {
        &self.transforms
    }

    pub fn visuals(&self) -> &LayerVisuals {
        &self.visuals
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    // ------------------------------------------------------------------
    // Slicing and coordinates
    // ------------------------------------------------------------------

    /// Replace the dims state; the last two displayed axes become the
    /// displayed plane.
    pub fn set_dims(&mut self, dims: Dims) -> Result<()> {
        if dims.ndim() != self.ndim() {
            return Err(ShapesError::DimensionMismatch {
                expected: self.ndim(),
                found: dims.ndim(),
            });
        }
        let displayed = plane_axes(&dims)?;
        self.data.set_displayed(displayed)?;
        self.dims = dims;
        self.on_slice_changed()
    }

    /// Move the slider of a non-displayed axis.
    pub fn set_slice_point(&mut self, axis: isize, value: f32) -> Result<()> {
        self.dims.set_point(axis, value)?;
        self.on_slice_changed()
    }

    pub fn set_dims_order(&mut self, order: Vec<usize>) -> Result<()> {
        let mut dims = self.dims.clone();
        dims.set_order(order)?;
        self.set_dims(dims)
    }

    /// Per-shape visibility in the current slice.
    pub fn in_slice(&self) -> Vec<bool> {
        self.data.slice_mask(&self.dims.indices())
    }

    /// Replace the data-to-world transforms.
    pub fn set_transforms(&mut self, transforms: TransformChain) -> Result<()> {
        if let Some(t) = transforms
            .transforms()
            .iter()
            .find(|t| t.ndim() > self.ndim())
        {
            return Err(ShapesError::DimensionMismatch {
                expected: self.ndim(),
                found: t.ndim(),
            });
        }
        self.transforms = transforms;
        Ok(())
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    /// Map a canvas position to data coordinates on the displayed axes,
    /// through the inverse of `camera ∘ transforms`.
    pub fn canvas_to_data(&self, position: Point2) -> Result<Point2> {
        let [d0, d1] = self.data.displayed();
        let world = Transform::Affine(self.transforms.simplified(self.ndim())?)
            .set_slice(&[d0, d1])?
            .to_affine(2)?;
        let canvas = self.camera.to_affine().compose(&world)?;
        let mapped = Transform::Affine(canvas.inverse()?)
            .map(&[position[0] as f64, position[1] as f64])?;
        Ok([mapped[0] as f32, mapped[1] as f32])
    }

    fn on_slice_changed(&mut self) -> Result<()> {
        let in_slice = self.in_slice();
        self.selected.retain(|&s| in_slice[s]);
        self.hover = (None, None);
        self.sync_box()?;
        self.refresh();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Shape collection
    // ------------------------------------------------------------------

    fn default_style(&self) -> ShapeStyle {
        ShapeStyle::new(self.config.face_rgba(), self.config.edge_rgba())
    }

    /// Add one shape with the configured default style. The new shape is
    /// placed at the front.
    pub fn add_shape(&mut self, kind: ShapeKind, data: Array2<f32>) -> Result<usize> {
        let style = self.default_style();
        let index = self.data.add(kind, data, self.config.edge_width, style)?;
        self.z_order.insert(0, index);
        self.refresh();
        Ok(index)
    }

    /// Add several shapes. Either all of them are added or none.
    pub fn add_shapes(&mut self, batch: ShapeBatch) -> Result<Vec<usize>> {
        let backup = (self.data.clone(), self.z_order.clone());
        let style = self.default_style();
        let mut added = Vec::with_capacity(batch.len());
        for (kind, data) in batch.into_items() {
            match self.data.add(kind, data, self.config.edge_width, style) {
                Ok(index) => {
                    self.z_order.insert(0, index);
                    added.push(index);
                }
                Err(e) => {
                    (self.data, self.z_order) = backup;
                    return Err(e);
                }
            }
        }
        self.refresh();
        Ok(added)
    }

    /// Replace every shape.
    pub fn set_shapes(&mut self, batch: ShapeBatch) -> Result<Vec<usize>> {
        log::info!("setting {} shapes", batch.len());
        let backup = (self.data.clone(), self.z_order.clone());
        self.data.remove_all();
        self.z_order.clear();
        self.clear_selection();
        match self.add_shapes(batch) {
            Ok(added) => Ok(added),
            Err(e) => {
                (self.data, self.z_order) = backup;
                self.refresh();
                Err(e)
            }
        }
    }

    /// Remove shapes; later shapes move down to keep indices contiguous.
    pub fn remove_shapes(&mut self, selector: &IndexSelector) -> Result<()> {
        if *selector == IndexSelector::All {
            log::info!("removing all {} shapes", self.count());
            self.data.remove_all();
            self.z_order.clear();
        } else {
            let mut indices = selector.resolve(self.count())?;
            indices.sort_unstable_by(|a, b| b.cmp(a));
            indices.dedup();
            for index in indices {
                self.data.remove(index)?;
                self.z_order.retain(|&z| z != index);
                for z in self.z_order.iter_mut().filter(|z| **z > index) {
                    *z -= 1;
                }
            }
        }
        self.clear_selection();
        self.refresh();
        Ok(())
    }

    pub fn remove_selected(&mut self) -> Result<()> {
        let selected = IndexSelector::List(self.selected.clone());
        self.remove_shapes(&selected)
    }

    /// Replace the vertices of a shape.
    pub fn edit_shape(&mut self, index: usize, data: Array2<f32>) -> Result<()> {
        self.data.edit(index, data)?;
        self.sync_box()?;
        self.refresh();
        Ok(())
    }

    pub fn convert_to_polygon(&mut self, index: usize) -> Result<()> {
        self.data.convert_to_polygon(index)?;
        self.refresh();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Z-order
    // ------------------------------------------------------------------

    /// Set the paint order. Must be a permutation of all shape indices.
    pub fn set_z_order(&mut self, order: Vec<usize>) -> Result<()> {
        if !is_permutation(&order, self.count()) {
            return Err(ShapesError::InvalidZOrder {
                order,
                count: self.count(),
            });
        }
        self.z_order = order;
        self.refresh();
        Ok(())
    }

    pub fn move_to_front(&mut self, selector: &IndexSelector) -> Result<()> {
        let moving = unique(selector.resolve(self.count())?);
        let rest = self.z_order.iter().filter(|z| !moving.contains(z)).copied();
        self.z_order = moving.iter().copied().chain(rest).collect();
        self.refresh();
        Ok(())
    }

    pub fn move_to_back(&mut self, selector: &IndexSelector) -> Result<()> {
        let moving = unique(selector.resolve(self.count())?);
        let mut order: Vec<usize> = self
            .z_order
            .iter()
            .filter(|z| !moving.contains(z))
            .copied()
            .collect();
        order.extend(moving);
        self.z_order = order;
        self.refresh();
        Ok(())
    }

    /// Move shapes one step towards the front.
    pub fn move_forward(&mut self, selector: &IndexSelector) -> Result<()> {
        let moving = selector.resolve(self.count())?;
        for pos in 1..self.z_order.len() {
            if moving.contains(&self.z_order[pos]) && !moving.contains(&self.z_order[pos - 1]) {
                self.z_order.swap(pos, pos - 1);
            }
        }
        self.refresh();
        Ok(())
    }

    /// Move shapes one step towards the back.
    pub fn move_backward(&mut self, selector: &IndexSelector) -> Result<()> {
        let moving = selector.resolve(self.count())?;
        for pos in (0..self.z_order.len().saturating_sub(1)).rev() {
            if moving.contains(&self.z_order[pos]) && !moving.contains(&self.z_order[pos + 1]) {
                self.z_order.swap(pos, pos + 1);
            }
        }
        self.refresh();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Styles
    // ------------------------------------------------------------------

    pub fn set_face_color(&mut self, selector: &IndexSelector, color: Color) -> Result<()> {
        self.data.set_face_color(selector, color)?;
        self.refresh();
        Ok(())
    }

    pub fn set_edge_color(&mut self, selector: &IndexSelector, color: Color) -> Result<()> {
        self.data.set_edge_color(selector, color)?;
        self.refresh();
        Ok(())
    }

    pub fn set_thickness(&mut self, selector: &IndexSelector, thickness: f32) -> Result<()> {
        self.data.set_thickness(selector, thickness)?;
        self.refresh();
        Ok(())
    }

    /// Set the border thickness of every shape and of future shapes.
    pub fn set_edge_width(&mut self, width: f32) -> Result<()> {
        self.config.edge_width = width;
        self.set_thickness(&IndexSelector::All, width)
    }

    pub fn hide_shapes(&mut self, selector: &IndexSelector, role: Option<MeshRole>) -> Result<()> {
        self.data.set_visibility(selector, role, false)?;
        self.refresh();
        Ok(())
    }

    pub fn show_shapes(&mut self, selector: &IndexSelector, role: Option<MeshRole>) -> Result<()> {
        self.data.set_visibility(selector, role, true)?;
        self.refresh();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Selection and layer-level transforms
    // ------------------------------------------------------------------

    /// Replace the selection. Order is kept; duplicates are dropped.
    pub fn select_shapes(&mut self, indices: Vec<usize>) -> Result<()> {
        let indices = IndexSelector::List(indices).resolve(self.count())?;
        self.selected = unique(indices);
        self.sync_box()?;
        self.refresh();
        Ok(())
    }

    pub fn unselect(&mut self) {
        self.clear_selection();
        self.refresh();
    }

    /// Scale shapes about a box handle (the box center by default).
    pub fn scale_shapes(
        &mut self,
        scale: Point2,
        selector: &IndexSelector,
        vertex: Option<usize>,
    ) -> Result<()> {
        self.transform_shapes(TransformOp::Scale(scale), selector, vertex)
    }

    /// Rotate shapes by `degrees` about a box handle.
    pub fn rotate_shapes(
        &mut self,
        degrees: f32,
        selector: &IndexSelector,
        vertex: Option<usize>,
    ) -> Result<()> {
        self.transform_shapes(TransformOp::Rotate(degrees), selector, vertex)
    }

    pub fn flip_vertical_shapes(
        &mut self,
        selector: &IndexSelector,
        vertex: Option<usize>,
    ) -> Result<()> {
        self.transform_shapes(TransformOp::FlipVertical, selector, vertex)
    }

    pub fn flip_horizontal_shapes(
        &mut self,
        selector: &IndexSelector,
        vertex: Option<usize>,
    ) -> Result<()> {
        self.transform_shapes(TransformOp::FlipHorizontal, selector, vertex)
    }

    pub fn shift_shapes(&mut self, offset: Point2, selector: &IndexSelector) -> Result<()> {
        self.transform_shapes(TransformOp::Shift(offset), selector, None)
    }

    fn transform_shapes(
        &mut self,
        op: TransformOp,
        selector: &IndexSelector,
        vertex: Option<usize>,
    ) -> Result<()> {
        let indices = unique(selector.resolve(self.count())?);
        let vertex = vertex.unwrap_or(handle::CENTER);
        if vertex >= handle::BOX_POINTS {
            return Err(ShapesError::invalid_transform(format!(
                "box vertex {} out of range",
                vertex
            )));
        }
        let Some(pivot_box) = self.data.compute_box(&indices) else {
            return Ok(());
        };
        let center = [pivot_box[[vertex, 0]], pivot_box[[vertex, 1]]];
        self.data
            .transform(op, center, &IndexSelector::List(indices))?;
        self.sync_box()?;
        self.refresh();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Modes
    // ------------------------------------------------------------------

    /// Switch interaction mode.
    ///
    /// Switching between select and direct keeps the selection; any other
    /// switch clears it.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        let old = self.mode;
        self.mode = mode;
        self.state = InteractionState::Idle;
        match (old, mode) {
            (Mode::Select, Mode::Direct) | (Mode::Direct, Mode::Select) => {
                self.hover = (None, None);
                // the box is cached for both modes; only the overlay differs
                if let Err(e) = self.sync_box() {
                    log::warn!("could not restore selection box: {}", e);
                }
            }
            _ => self.clear_selection(),
        }
        log::debug!("mode: {} -> {}", old, mode);
        self.refresh();
    }

    /// Switch mode by name.
    pub fn set_mode_str(&mut self, mode: &str) -> Result<()> {
        self.set_mode(mode.parse()?);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Hit testing
    // ------------------------------------------------------------------

    /// Shape and handle/vertex under a data coordinate.
    ///
    /// In select mode the selection box handles are tested first, in direct
    /// mode the vertices of the selected shapes. Otherwise the frontmost
    /// drawn shape containing the point is returned.
    pub fn shape_at(&self, coord: Point2) -> Hover {
        let size = self.config.vertex_size;
        match self.mode {
            Mode::Select => {
                if let (Some(&first), Some(b)) = (self.selected.first(), self.data.selected_box()) {
                    if let Some(v) = hit::handle_at(b, coord, size) {
                        return (Some(first), Some(v));
                    }
                }
            }
            Mode::Direct => {
                let hit = self
                    .selected
                    .iter()
                    .filter_map(|&s| {
                        let points = self.data.vertices(s).ok()?;
                        hit::vertex_at(&points, coord, size).map(|v| (s, v))
                    })
                    .last();
                if let Some((s, v)) = hit {
                    return (Some(s), Some(v));
                }
            }
            _ => {}
        }
        let faces = self.drawn_faces();
        (
            hit::shape_at(self.data.mesh(), &faces, &self.z_order, coord),
            None,
        )
    }

    /// Shapes with any drawn vertex inside the box spanned by two corners,
    /// ascending.
    pub fn shapes_in_box(&self, corners: [Point2; 2]) -> Vec<usize> {
        hit::shapes_in_box(self.data.mesh(), &self.drawn_faces(), corners)
    }

    fn drawn_faces(&self) -> Vec<usize> {
        visuals::drawn_faces(&self.data, &self.z_order, &self.in_slice())
    }

    // ------------------------------------------------------------------
    // Pointer events
    // ------------------------------------------------------------------

    pub fn on_mouse_press(&mut self, event: &MouseEvent) -> Result<()> {
        let coord = self.canvas_to_data(event.position)?;
        self.mouse_coord = coord;

        if self.mode.is_editing() {
            if self.state.is_moving() || self.state.is_selecting() {
                return Ok(());
            }
            let (shape, vertex) = self.shape_at(coord);
            if event.modifiers.ctrl && self.mode == Mode::Select {
                if let (Some(s), None) = (shape, vertex) {
                    log::debug!("ctrl-click removes shape {}", s);
                    return self.remove_shapes(&IndexSelector::One(s));
                }
            }
            let shift = event.modifiers.shift;
            self.press_select(shape, vertex, shift)?;
            self.hover = (shape, vertex);
            self.state = InteractionState::PotentialDrag {
                start: coord,
                shape,
                vertex,
                shift,
            };
            self.refresh();
        } else if let Some(kind) = self.mode.creates() {
            self.state = InteractionState::Creating {
                kind,
                anchor: self.clamp_to_bounds(coord),
            };
        }
        Ok(())
    }

    pub fn on_mouse_move(&mut self, event: &MouseEvent) -> Result<()> {
        let coord = self.canvas_to_data(event.position)?;
        self.mouse_coord = coord;

        match self.state {
            InteractionState::Idle => {
                if self.mode.is_editing() {
                    self.hover = self.shape_at(coord);
                }
            }
            InteractionState::PotentialDrag {
                start,
                shape,
                vertex,
                ..
            } => {
                self.begin_drag(start, shape, vertex, coord);
                self.drag(coord)?;
            }
            InteractionState::Creating { kind, anchor } => self.create_at(kind, anchor, coord)?,
            _ => self.drag(coord)?,
        }
        self.refresh();
        Ok(())
    }

    pub fn on_mouse_release(&mut self, event: &MouseEvent) -> Result<()> {
        let coord = self.canvas_to_data(event.position)?;
        self.mouse_coord = coord;

        match std::mem::take(&mut self.state) {
            InteractionState::PotentialDrag { shape, shift, .. } if !shift => {
                self.selected = shape.into_iter().collect();
                self.sync_box()?;
            }
            InteractionState::MarqueeSelecting { anchor, .. } => {
                self.selected = self.shapes_in_box([anchor, coord]);
                log::debug!("marquee selected {:?}", self.selected);
                self.sync_box()?;
            }
            _ => {}
        }

        if self.mode.creates().is_some() {
            self.clear_selection();
        } else if self.mode.is_editing() {
            self.hover = self.shape_at(coord);
        }
        self.refresh();
        Ok(())
    }

    fn press_select(&mut self, shape: Option<usize>, vertex: Option<usize>, shift: bool) -> Result<()> {
        match shape {
            Some(s) if shift && vertex.is_none() => {
                if let Some(pos) = self.selected.iter().position(|&x| x == s) {
                    self.selected.remove(pos);
                } else {
                    self.selected.push(s);
                }
            }
            Some(s) if !self.selected.contains(&s) => self.selected = vec![s],
            None if !shift => self.selected.clear(),
            _ => return Ok(()),
        }
        self.sync_box()
    }

    /// Turn a potential drag into the interaction for what was hit.
    fn begin_drag(&mut self, start: Point2, shape: Option<usize>, vertex: Option<usize>, coord: Point2) {
        let state = match (self.mode, shape, vertex) {
            (Mode::Select, Some(_), Some(v)) if v == handle::ROTATION_HIT => self
                .box_point(handle::CENTER)
                .map(|pivot| InteractionState::Rotating { pivot }),
            (Mode::Select, Some(_), Some(v)) => {
                let fixed_index = (v + 4) % handle::BOX_HANDLES;
                if self.fixed_aspect {
                    self.update_aspect_ratio();
                }
                self.box_point(fixed_index)
                    .map(|fixed_vertex| InteractionState::Resizing {
                        handle: v,
                        fixed_index,
                        fixed_vertex,
                    })
            }
            (Mode::Direct, Some(s), Some(v)) => {
                Some(InteractionState::DraggingVertex { shape: s, vertex: v })
            }
            (Mode::Select, Some(_), None) if !self.selected.is_empty() => self
                .box_point(handle::CENTER)
                .map(|center| InteractionState::Dragging {
                    anchor: sub(start, center),
                }),
            // direct mode only moves vertices
            (Mode::Direct, Some(_), None) => Some(InteractionState::Idle),
            _ => None,
        };
        self.state = state.unwrap_or(InteractionState::MarqueeSelecting {
            anchor: start,
            current: coord,
        });
        log::debug!("drag started: {:?}", self.state);
    }

    fn drag(&mut self, coord: Point2) -> Result<()> {
        match self.state {
            InteractionState::Dragging { anchor } => self.translate_selected(anchor, coord),
            InteractionState::Resizing {
                fixed_index,
                fixed_vertex,
                ..
            } => self.resize_selected(fixed_index, fixed_vertex, coord),
            InteractionState::Rotating { pivot } => self.rotate_selected(pivot, coord),
            InteractionState::DraggingVertex { shape, vertex } => {
                self.move_vertex(shape, vertex, coord)
            }
            InteractionState::MarqueeSelecting { anchor, .. } => {
                self.state = InteractionState::MarqueeSelecting {
                    anchor,
                    current: coord,
                };
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn translate_selected(&mut self, anchor: Point2, coord: Point2) -> Result<()> {
        let Some(center) = self.box_point(handle::CENTER) else {
            return Ok(());
        };
        let shift = sub(sub(coord, center), anchor);
        let selected = IndexSelector::List(self.selected.clone());
        self.data.shift(shift, &selected)
    }

    /// Scale the selection so the dragged handle follows the pointer while
    /// the opposite handle stays at `fixed`. Scaling happens in the box's own
    /// rotated frame, against the current box, so repeated moves compose.
    fn resize_selected(&mut self, fixed_index: usize, fixed: Point2, coord: Point2) -> Result<()> {
        let (Some(moving), Some(center), Some(rotation)) = (
            self.box_point((fixed_index + 4) % handle::BOX_HANDLES),
            self.box_point(handle::CENTER),
            self.box_point(handle::ROTATION),
        ) else {
            return Ok(());
        };
        let size = sub(moving, fixed);

        let up = sub(rotation, center);
        let len = norm(up);
        let offset = if len > 0.0 {
            scaled(up, 1.0 / len)
        } else {
            [0.0, -1.0]
        };
        let perp = [offset[1], -offset[0]];

        let mut new = coord;
        if self.fixed_aspect && fixed_index % 2 == 0 {
            let d = sub(new, fixed);
            let ratio = if d[0] == 0.0 { 1.0 } else { (d[1] / d[0]).abs() };
            if ratio > self.aspect_ratio {
                new[1] = fixed[1] + d[1] * self.aspect_ratio / ratio;
            } else {
                new[0] = fixed[0] + d[0] * ratio / self.aspect_ratio;
            }
        }

        let d = sub(new, fixed);
        let dist = safe_ratio(dot(d, offset), dot(size, offset));
        let dist_perp = safe_ratio(dot(d, perp), dot(size, perp));
        let mut scale = match fixed_index % 4 {
            3 => [dist_perp, 1.0],
            1 => [1.0, dist],
            _ => [dist_perp, dist],
        };
        for s in scale.iter_mut().filter(|s| **s == 0.0) {
            *s = 1.0;
        }

        // scale[0] along `perp`, scale[1] along `offset`
        let [p0, p1] = perp;
        let [o0, o1] = offset;
        let [s0, s1] = scale;
        let m = [
            [s0 * p0 * p0 + s1 * o0 * o0, s0 * p0 * p1 + s1 * o0 * o1],
            [s0 * p1 * p0 + s1 * o1 * o0, s0 * p1 * p1 + s1 * o1 * o1],
        ];
        let selected = IndexSelector::List(self.selected.clone());
        self.data.transform(TransformOp::Linear(m), fixed, &selected)
    }

    fn rotate_selected(&mut self, pivot: Point2, coord: Point2) -> Result<()> {
        let Some(rotation) = self.box_point(handle::ROTATION) else {
            return Ok(());
        };
        let fixed_angle = handle_angle(sub(rotation, pivot));
        let new_offset = sub(coord, pivot);
        let new_angle = handle_angle(new_offset);

        let angle = if norm(new_offset) < 1.0 {
            0.0
        } else if self.fixed_aspect {
            (new_angle / ROTATION_SNAP_DEGREES).round() * ROTATION_SNAP_DEGREES - fixed_angle
        } else {
            new_angle - fixed_angle
        };
        if angle == 0.0 {
            return Ok(());
        }
        let selected = IndexSelector::List(self.selected.clone());
        self.data.rotate(angle, pivot, &selected)
    }

    /// Move one vertex in direct mode. Rectangles become polygons first;
    /// ellipses cannot be edited vertex by vertex and are skipped.
    fn move_vertex(&mut self, shape: usize, vertex: usize, coord: Point2) -> Result<()> {
        match self.data.shape(shape)?.kind() {
            ShapeKind::Ellipse => {
                log::warn!("shape {} is an ellipse; vertex drag ignored", shape);
                return Ok(());
            }
            ShapeKind::Rectangle => self.data.convert_to_polygon(shape)?,
            _ => {}
        }

        let mut data = self.data.shape(shape)?.data().clone();
        if vertex >= data.nrows() {
            return Err(ShapesError::VertexOutOfRange {
                shape,
                vertex,
                count: data.nrows(),
            });
        }
        let [d0, d1] = self.data.displayed();
        data[[vertex, d0]] = coord[0];
        data[[vertex, d1]] = coord[1];
        self.data.edit(shape, data)?;
        self.sync_box()
    }

    /// Create the new shape once the pointer has moved off the anchor, then
    /// continue the drag as a resize (or a vertex move for lines).
    fn create_at(&mut self, kind: ShapeKind, anchor: Point2, coord: Point2) -> Result<()> {
        let coord = self.clamp_to_bounds(coord);
        let ready = match kind {
            ShapeKind::Line => coord != anchor,
            _ => coord[0] != anchor[0] && coord[1] != anchor[1],
        };
        if !ready {
            return Ok(());
        }

        let rows = self.new_shape_rows(&[anchor, coord]);
        let index = self.add_shape(kind, rows)?;
        self.selected = vec![index];
        self.sync_box()?;

        if kind == ShapeKind::Line {
            self.state = InteractionState::DraggingVertex {
                shape: index,
                vertex: 1,
            };
            self.hover = (Some(index), Some(1));
        } else {
            let handle = self.nearest_box_handle(coord);
            let fixed_index = (handle + 4) % handle::BOX_HANDLES;
            let fixed_vertex = self.box_point(fixed_index).unwrap_or(anchor);
            self.state = InteractionState::Resizing {
                handle,
                fixed_index,
                fixed_vertex,
            };
            self.hover = (Some(index), Some(handle));
        }
        log::debug!("created {} {}", kind, index);
        Ok(())
    }

    /// Full-dimensional rows lying in the current slice.
    fn new_shape_rows(&self, points: &[Point2]) -> Array2<f32> {
        let indices = self.dims.indices();
        let [d0, d1] = self.data.displayed();
        Array2::from_shape_fn((points.len(), self.ndim()), |(i, axis)| {
            if axis == d0 {
                points[i][0]
            } else if axis == d1 {
                points[i][1]
            } else {
                indices.get(axis).copied().flatten().unwrap_or(0.0)
            }
        })
    }

    fn nearest_box_handle(&self, coord: Point2) -> usize {
        (0..handle::BOX_HANDLES)
            .filter_map(|i| self.box_point(i).map(|p| (i, norm(sub(p, coord)))))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(handle::BOX_HANDLES / 2, |(i, _)| i)
    }

    /// Clamp a new-shape coordinate to the slider bounds of the displayed axes.
    fn clamp_to_bounds(&self, coord: Point2) -> Point2 {
        let max_shape = self.dims.max_shape();
        let [d0, d1] = self.data.displayed();
        let clamp = |value: f32, axis: usize| match max_shape.get(axis).copied().flatten() {
            Some(stop) => value.max(0.0).min((stop - 1.0).max(0.0)),
            None => value,
        };
        [clamp(coord[0], d0), clamp(coord[1], d1)]
    }

    // ------------------------------------------------------------------
    // Keyboard events
    // ------------------------------------------------------------------

    pub fn on_key_press(&mut self, event: &KeyEvent) -> Result<()> {
        if event.repeat {
            return Ok(());
        }
        match event.key {
            Key::Space => {
                if self.mode != Mode::PanZoom {
                    self.mode_history = self.mode;
                    self.mode = Mode::PanZoom;
                    self.state = InteractionState::Idle;
                    log::debug!("momentary pan/zoom from {}", self.mode_history);
                } else {
                    self.mode_history = Mode::PanZoom;
                }
            }
            Key::Shift => {
                self.fixed_aspect = true;
                self.update_aspect_ratio();
                if self.state.is_moving() {
                    self.drag(self.mouse_coord)?;
                }
            }
            Key::Backspace | Key::Delete => {
                if self.mode.is_editing() && !self.selected.is_empty() {
                    self.remove_selected()?;
                }
            }
            Key::Char(c) => {
                if let Some(mode) = self.config.keybindings.mode_for_key(c) {
                    self.set_mode(mode);
                }
            }
        }
        self.refresh();
        Ok(())
    }

    pub fn on_key_release(&mut self, event: &KeyEvent) -> Result<()> {
        if event.repeat {
            return Ok(());
        }
        match event.key {
            Key::Space => {
                if self.mode == Mode::PanZoom && self.mode_history != Mode::PanZoom {
                    self.mode = self.mode_history;
                    log::debug!("back to {}", self.mode);
                }
            }
            Key::Shift => {
                self.fixed_aspect = false;
                if self.state.is_moving() {
                    self.drag(self.mouse_coord)?;
                }
            }
            _ => {}
        }
        self.refresh();
        Ok(())
    }

    fn update_aspect_ratio(&mut self) {
        if let (Some(tl), Some(br)) = (self.box_point(0), self.box_point(4)) {
            let (h, w) = (br[1] - tl[1], br[0] - tl[0]);
            self.aspect_ratio = if h == 0.0 || w == 0.0 {
                1.0
            } else {
                (h / w).abs()
            };
        }
    }

    // ------------------------------------------------------------------
    // Bookkeeping
    // ------------------------------------------------------------------

    fn box_point(&self, index: usize) -> Option<Point2> {
        self.data
            .selected_box()
            .filter(|b| index < b.nrows())
            .map(|b| [b[[index, 0]], b[[index, 1]]])
    }

    fn sync_box(&mut self) -> Result<()> {
        self.data
            .select_box(&IndexSelector::List(self.selected.clone()))
    }

    fn clear_selection(&mut self) {
        self.selected.clear();
        self.hover = (None, None);
        self.data.clear_box();
    }

    /// Rebuild everything handed to the renderer and the status message.
    fn refresh(&mut self) {
        let in_slice = self.in_slice();
        let highlight_color = self.config.highlight_rgba();

        let mut highlighted = self.selected.clone();
        if let Some(h) = self.hover.0.filter(|h| !highlighted.contains(h)) {
            highlighted.push(h);
        }

        let shapes = visuals::shapes_mesh(&self.data, &self.z_order, &in_slice);
        let highlight = visuals::highlight_mesh(
            &self.data,
            &highlighted,
            &in_slice,
            self.config.highlight_thickness,
            highlight_color,
        );
        let (markers, outline) = self.overlays(highlight_color);

        self.visuals = LayerVisuals {
            shapes,
            highlight,
            markers,
            outline,
        };
        self.status = self.status_message();
        self.dirty = true;
    }

    fn overlays(&self, color: Color) -> (Option<MarkerVisual>, Option<LineVisual>) {
        if let Some(corners) = self.state.marquee() {
            return (None, Some(visuals::marquee_outline(corners, color)));
        }
        let size = self.config.vertex_size;
        match self.mode {
            Mode::Direct => {
                let points: Vec<Point2> = self
                    .selected
                    .iter()
                    .filter_map(|&s| self.data.vertices(s).ok())
                    .flatten()
                    .collect();
                if points.is_empty() {
                    return (None, None);
                }
                let face = if self.hover.1.is_some() { color } else { Color::WHITE };
                (Some(visuals::point_markers(&points, size, face, color)), None)
            }
            Mode::PanZoom => (None, None),
            _ => match (self.selected.is_empty(), self.data.selected_box()) {
                (false, Some(b)) => {
                    let face = if self.hover.1.is_some() { color } else { Color::WHITE };
                    (
                        Some(visuals::box_markers(b, size, face, color)),
                        Some(visuals::box_outline(b, color)),
                    )
                }
                _ => (None, None),
            },
        }
    }

    /// `"{col}, {row}, {name}[, shape i[, vertex j]]"`, reporting the
    /// displayed coordinates swapped.
    fn status_message(&self) -> String {
        let [c0, c1] = self.mouse_coord;
        let mut msg = format!(
            "{}, {}, {}",
            c1.round() as i64,
            c0.round() as i64,
            self.config.name
        );
        if let Some(shape) = self.hover.0 {
            msg.push_str(&format!(", shape {}", shape));
            if let Some(vertex) = self.hover.1 {
                msg.push_str(&format!(", vertex {}", vertex));
            }
        }
        msg
    }
}

/// The last two displayed axes.
fn plane_axes(dims: &Dims) -> Result<[usize; 2]> {
    match dims.displayed() {
        [.., a, b] => Ok([*a, *b]),
        _ => Err(ShapesError::InvalidNdisplay(dims.displayed().len())),
    }
}

fn safe_ratio(num: f32, den: f32) -> f32 {
    if den == 0.0 { 1.0 } else { num / den }
}

/// Drop repeated indices, keeping first occurrences in order.
fn unique(indices: Vec<usize>) -> Vec<usize> {
    let mut out = Vec::with_capacity(indices.len());
    for i in indices {
        if !out.contains(&i) {
            out.push(i);
        }
    }
    out
}
