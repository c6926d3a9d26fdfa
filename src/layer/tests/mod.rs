//! Tests for the shapes layer controller.
//!
//! These drive the layer through pointer and keyboard events the way a host
//! would, and check selection, geometry and visual output.

mod property_tests;
mod selection_tests;

use ndarray::{Array2, array};

use super::{Key, KeyEvent, Modifiers, Mode, MouseEvent, ShapesLayer};
use crate::geometry::{Point2, bounding_box};
use crate::model::ShapeKind;

const EPSILON: f32 = 1e-3;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point2, b: Point2) -> bool {
    approx_eq(a[0], b[0]) && approx_eq(a[1], b[1])
}

fn square(min: f32, max: f32) -> Array2<f32> {
    array![[min, min], [max, max]]
}

/// A 2-D layer holding one rectangle (10,10)-(50,50), in select mode.
fn rect_layer() -> ShapesLayer {
    init_logging();
    let mut layer = ShapesLayer::new(2);
    layer
        .add_shape(ShapeKind::Rectangle, square(10.0, 50.0))
        .unwrap();
    layer.set_mode(Mode::Select);
    layer
}

/// Axis-aligned bounds of a shape in the displayed plane.
fn bounds(layer: &ShapesLayer, index: usize) -> [Point2; 2] {
    let vertices = layer.data().vertices(index).unwrap();
    bounding_box(vertices).unwrap()
}

fn press(layer: &mut ShapesLayer, position: Point2) {
    layer.on_mouse_press(&MouseEvent::new(position)).unwrap();
}

fn press_with(layer: &mut ShapesLayer, position: Point2, modifiers: Modifiers) {
    layer
        .on_mouse_press(&MouseEvent::with_modifiers(position, modifiers))
        .unwrap();
}

fn move_to(layer: &mut ShapesLayer, position: Point2) {
    layer.on_mouse_move(&MouseEvent::new(position)).unwrap();
}

fn release(layer: &mut ShapesLayer, position: Point2) {
    layer.on_mouse_release(&MouseEvent::new(position)).unwrap();
}

fn click(layer: &mut ShapesLayer, position: Point2) {
    press(layer, position);
    release(layer, position);
}

fn shift_click(layer: &mut ShapesLayer, position: Point2) {
    press_with(layer, position, Modifiers::SHIFT);
    layer
        .on_mouse_release(&MouseEvent::with_modifiers(position, Modifiers::SHIFT))
        .unwrap();
}

fn drag(layer: &mut ShapesLayer, from: Point2, to: Point2) {
    press(layer, from);
    move_to(layer, to);
    release(layer, to);
}

fn key(layer: &mut ShapesLayer, key: Key) {
    layer.on_key_press(&KeyEvent::new(key)).unwrap();
}

fn key_up(layer: &mut ShapesLayer, key: Key) {
    layer.on_key_release(&KeyEvent::new(key)).unwrap();
}
