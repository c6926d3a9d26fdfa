//! Tests for hit testing, selection, slicing and collection bookkeeping.

use ndarray::array;

use super::*;
use crate::dims::Dims;
use crate::error::ShapesError;
use crate::layer::ShapeBatch;
use crate::model::{IndexSelector, MeshRole};
use crate::transforms::Camera;

#[test]
fn test_click_selects_shape() {
    let mut layer = rect_layer();
    click(&mut layer, [20.0, 20.0]);
    assert_eq!(layer.selected_shapes(), &[0]);
    assert!(layer.data().selected_box().is_some());

    click(&mut layer, [200.0, 200.0]);
    assert!(layer.selected_shapes().is_empty());
    assert!(layer.data().selected_box().is_none());
}

#[test]
fn test_shift_click_toggles_membership() {
    let mut layer = rect_layer();
    layer
        .add_shape(ShapeKind::Rectangle, square(100.0, 140.0))
        .unwrap();

    click(&mut layer, [20.0, 20.0]);
    shift_click(&mut layer, [120.0, 120.0]);
    assert_eq!(layer.selected_shapes(), &[0, 1]);

    shift_click(&mut layer, [20.0, 20.0]);
    assert_eq!(layer.selected_shapes(), &[1]);

    // shift on empty space keeps the selection
    shift_click(&mut layer, [300.0, 300.0]);
    assert_eq!(layer.selected_shapes(), &[1]);
}

#[test]
fn test_overlapping_shapes_front_wins() {
    let mut layer = rect_layer();
    layer
        .add_shape(ShapeKind::Rectangle, square(30.0, 70.0))
        .unwrap();
    // newest shape is in front
    assert_eq!(layer.z_order(), &[1, 0]);
    assert_eq!(layer.shape_at([40.0, 40.0]), (Some(1), None));

    layer.move_to_front(&IndexSelector::One(0)).unwrap();
    assert_eq!(layer.shape_at([40.0, 40.0]), (Some(0), None));
}

#[test]
fn test_hit_outside_everything() {
    let layer = rect_layer();
    assert_eq!(layer.shape_at([20.0, 20.0]), (Some(0), None));
    assert_eq!(layer.shape_at([80.0, 80.0]), (None, None));
}

#[test]
fn test_marquee_selects_ascending() {
    let mut layer = rect_layer();
    layer
        .add_shape(ShapeKind::Ellipse, square(100.0, 140.0))
        .unwrap();
    layer
        .add_shape(ShapeKind::Line, array![[200.0, 200.0], [240.0, 230.0]])
        .unwrap();

    press(&mut layer, [-10.0, -10.0]);
    move_to(&mut layer, [150.0, 150.0]);
    assert!(layer.state().is_selecting());
    let outline = layer.visuals().outline.as_ref().unwrap();
    assert_eq!(outline.points.nrows(), 5);

    move_to(&mut layer, [300.0, 300.0]);
    release(&mut layer, [300.0, 300.0]);
    assert_eq!(layer.selected_shapes(), &[0, 1, 2]);
    assert!(!layer.state().is_selecting());
}

#[test]
fn test_marquee_partial() {
    let mut layer = rect_layer();
    layer
        .add_shape(ShapeKind::Rectangle, square(100.0, 140.0))
        .unwrap();
    drag(&mut layer, [90.0, 90.0], [160.0, 160.0]);
    assert_eq!(layer.selected_shapes(), &[1]);
}

#[test]
fn test_delete_renumbers_and_keeps_order() {
    init_logging();
    let mut layer = ShapesLayer::new(2);
    for offset in [0.0, 100.0, 200.0] {
        layer
            .add_shape(ShapeKind::Rectangle, square(offset, offset + 20.0))
            .unwrap();
    }
    layer.set_z_order(vec![2, 0, 1]).unwrap();
    layer.remove_shapes(&IndexSelector::One(1)).unwrap();

    assert_eq!(layer.count(), 2);
    // C (now index 1) stays in front of A
    assert_eq!(layer.z_order(), &[1, 0]);
    assert_eq!(bounds(&layer, 1), [[200.0, 200.0], [220.0, 220.0]]);

    let tags = layer.data().mesh().faces_index.column(0).to_vec();
    assert_eq!(tags.iter().max(), Some(&1));
}

#[test]
fn test_invalid_z_order_rejected() {
    let mut layer = rect_layer();
    layer
        .add_shape(ShapeKind::Rectangle, square(100.0, 140.0))
        .unwrap();
    let before = layer.z_order().to_vec();
    let result = layer.set_z_order(vec![0, 0]);
    assert!(matches!(result, Err(ShapesError::InvalidZOrder { count: 2, .. })));
    assert_eq!(layer.z_order(), before.as_slice());
    assert!(layer.set_z_order(vec![0, 1, 2]).is_err());
}

#[test]
fn test_z_order_moves() {
    init_logging();
    let mut layer = ShapesLayer::new(2);
    for offset in [0.0, 100.0, 200.0] {
        layer
            .add_shape(ShapeKind::Rectangle, square(offset, offset + 20.0))
            .unwrap();
    }
    assert_eq!(layer.z_order(), &[2, 1, 0]);

    layer.move_to_front(&IndexSelector::One(0)).unwrap();
    assert_eq!(layer.z_order(), &[0, 2, 1]);
    layer.move_to_back(&IndexSelector::One(0)).unwrap();
    assert_eq!(layer.z_order(), &[2, 1, 0]);
    layer.move_forward(&IndexSelector::One(0)).unwrap();
    assert_eq!(layer.z_order(), &[2, 0, 1]);
    layer.move_backward(&IndexSelector::One(2)).unwrap();
    assert_eq!(layer.z_order(), &[0, 2, 1]);
    // already at the front
    layer.move_forward(&IndexSelector::One(0)).unwrap();
    assert_eq!(layer.z_order(), &[0, 2, 1]);
}

#[test]
fn test_slice_visibility() {
    init_logging();
    let mut layer = ShapesLayer::new(3);
    layer
        .add_shape(
            ShapeKind::Rectangle,
            array![[2.0, 10.0, 10.0], [2.0, 50.0, 50.0]],
        )
        .unwrap();

    layer.set_slice_point(0, 2.0).unwrap();
    assert_eq!(layer.in_slice(), vec![true]);
    assert!(!layer.visuals().shapes.is_empty());
    layer.set_mode(Mode::Select);
    assert_eq!(layer.shape_at([20.0, 20.0]), (Some(0), None));

    layer.set_slice_point(0, 3.0).unwrap();
    assert_eq!(layer.in_slice(), vec![false]);
    assert!(layer.visuals().shapes.is_empty());
    assert_eq!(layer.shape_at([20.0, 20.0]), (None, None));
}

#[test]
fn test_new_shapes_land_in_current_slice() {
    init_logging();
    let mut layer = ShapesLayer::new(3);
    layer.set_slice_point(0, 4.0).unwrap();
    layer.set_mode(Mode::AddRectangle);
    drag(&mut layer, [10.0, 10.0], [30.0, 40.0]);

    assert_eq!(layer.count(), 1);
    let data = layer.data().shape(0).unwrap().data();
    assert!(data.column(0).iter().all(|&v| v == 4.0));
    assert_eq!(layer.in_slice(), vec![true]);
}

#[test]
fn test_transposed_dims() {
    init_logging();
    let mut layer = ShapesLayer::new(3);
    layer
        .add_shape(
            ShapeKind::Line,
            array![[0.0, 0.0, 0.0], [10.0, 0.0, 5.0]],
        )
        .unwrap();
    layer.set_dims_order(vec![1, 0, 2]).unwrap();
    assert_eq!(layer.data().displayed(), [0, 2]);
    assert_eq!(layer.in_slice(), vec![true]);
    assert!(layer.set_dims(Dims::new(2)).is_err());
}

#[test]
fn test_camera_maps_canvas_to_data() {
    let mut layer = rect_layer();
    layer.set_camera(Camera::new(2.0, [10.0, 10.0]));
    assert!(point_approx_eq(
        layer.canvas_to_data([50.0, 50.0]).unwrap(),
        [20.0, 20.0]
    ));
    click(&mut layer, [50.0, 50.0]);
    assert_eq!(layer.selected_shapes(), &[0]);
}

#[test]
fn test_add_shapes_is_atomic() {
    let mut layer = rect_layer();
    let batch = ShapeBatch {
        rectangles: vec![square(100.0, 120.0)],
        polygons: vec![array![[0.0, 0.0], [1.0, 1.0]]],
        ..Default::default()
    };
    assert!(layer.add_shapes(batch).is_err());
    assert_eq!(layer.count(), 1);
    assert_eq!(layer.z_order(), &[0]);

    let batch = ShapeBatch {
        lines: vec![array![[0.0, 0.0], [5.0, 5.0]]],
        paths: vec![array![[0.0, 0.0], [5.0, 5.0], [9.0, 2.0]]],
        ..Default::default()
    };
    assert_eq!(layer.add_shapes(batch).unwrap(), vec![1, 2]);
    assert_eq!(layer.z_order(), &[2, 1, 0]);
}

#[test]
fn test_set_shapes_replaces() {
    let mut layer = rect_layer();
    click(&mut layer, [20.0, 20.0]);
    let batch = ShapeBatch {
        ellipses: vec![square(0.0, 10.0), square(20.0, 30.0)],
        ..Default::default()
    };
    layer.set_shapes(batch).unwrap();
    assert_eq!(layer.count(), 2);
    assert!(layer.selected_shapes().is_empty());
    assert_eq!(
        layer.data().shape(0).unwrap().kind(),
        ShapeKind::Ellipse
    );
}

#[test]
fn test_remove_all() {
    let mut layer = rect_layer();
    layer
        .add_shape(ShapeKind::Rectangle, square(100.0, 140.0))
        .unwrap();
    layer.remove_shapes(&IndexSelector::All).unwrap();
    assert_eq!(layer.count(), 0);
    assert!(layer.z_order().is_empty());
    assert!(layer.visuals().shapes.is_empty());
}

#[test]
fn test_hidden_fill_is_not_hit() {
    let mut layer = rect_layer();
    layer
        .hide_shapes(&IndexSelector::One(0), Some(MeshRole::Face))
        .unwrap();
    assert_eq!(layer.shape_at([30.0, 30.0]), (None, None));
    // the border is still drawn and can be hit
    assert_eq!(layer.shape_at([10.2, 30.0]), (Some(0), None));

    layer.show_shapes(&IndexSelector::All, None).unwrap();
    assert_eq!(layer.shape_at([30.0, 30.0]), (Some(0), None));
}

#[test]
fn test_styles_reach_visuals() {
    let mut layer = rect_layer();
    let red = crate::color_utils::Color::rgb(1.0, 0.0, 0.0);
    layer.set_face_color(&IndexSelector::All, red).unwrap();
    let colors = &layer.visuals().shapes.face_colors;
    assert_eq!(colors.row(0).to_vec(), red.0.to_vec());

    layer.set_edge_width(4.0).unwrap();
    assert_eq!(layer.data().shape(0).unwrap().thickness(), 4.0);
    assert_eq!(layer.config().edge_width, 4.0);
}

#[test]
fn test_status_message() {
    let mut layer = rect_layer();
    move_to(&mut layer, [20.4, 30.0]);
    assert_eq!(layer.status(), "30, 20, Shapes, shape 0");

    click(&mut layer, [20.0, 20.0]);
    move_to(&mut layer, [10.0, 11.0]);
    assert_eq!(layer.status(), "11, 10, Shapes, shape 0, vertex 0");

    move_to(&mut layer, [100.0, 100.0]);
    assert_eq!(layer.status(), "100, 100, Shapes");
}

#[test]
fn test_dirty_flag() {
    let mut layer = rect_layer();
    layer.clear_dirty();
    assert!(!layer.is_dirty());
    layer
        .add_shape(ShapeKind::Rectangle, square(100.0, 140.0))
        .unwrap();
    assert!(layer.is_dirty());
}

#[test]
fn test_select_out_of_range() {
    let mut layer = rect_layer();
    assert!(matches!(
        layer.select_shapes(vec![0, 3]),
        Err(ShapesError::IndexOutOfRange { index: 3, count: 1 })
    ));
    assert!(layer.selected_shapes().is_empty());
    layer.select_shapes(vec![0, 0]).unwrap();
    assert_eq!(layer.selected_shapes(), &[0]);
}
