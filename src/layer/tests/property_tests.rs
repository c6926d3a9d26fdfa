//! Property tests for collection bookkeeping under random edits.

use proptest::prelude::*;

use super::*;
use crate::geometry::is_permutation;
use crate::model::IndexSelector;

#[derive(Debug, Clone)]
enum Edit {
    Add(f32, f32, f32),
    Remove(usize),
    ToFront(usize),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0.0f32..200.0, 0.0f32..200.0, 1.0f32..50.0).prop_map(|(x, y, s)| Edit::Add(x, y, s)),
        (0usize..8).prop_map(Edit::Remove),
        (0usize..8).prop_map(Edit::ToFront),
    ]
}

fn apply(layer: &mut ShapesLayer, edit: &Edit) {
    match *edit {
        Edit::Add(x, y, s) => {
            layer
                .add_shape(
                    ShapeKind::Rectangle,
                    ndarray::array![[x, y], [x + s, y + s]],
                )
                .unwrap();
        }
        Edit::Remove(i) if i < layer.count() => {
            layer.remove_shapes(&IndexSelector::One(i)).unwrap();
        }
        Edit::ToFront(i) if i < layer.count() => {
            layer.move_to_front(&IndexSelector::One(i)).unwrap();
        }
        _ => {}
    }
}

proptest! {
    #[test]
    fn prop_indices_stay_contiguous(edits in prop::collection::vec(edit_strategy(), 1..30)) {
        let mut layer = ShapesLayer::new(2);
        for edit in &edits {
            apply(&mut layer, edit);

            let count = layer.count();
            prop_assert!(is_permutation(layer.z_order(), count));
            prop_assert_eq!(layer.data().mesh().shape_count(), count);

            let mut tagged: Vec<usize> = layer.data().mesh().faces_index.column(0).to_vec();
            tagged.sort_unstable();
            tagged.dedup();
            prop_assert_eq!(tagged, (0..count).collect::<Vec<_>>());
        }
    }

    #[test]
    fn prop_invalid_z_order_leaves_state(
        n in 1usize..6,
        order in prop::collection::vec(0usize..8, 0..8),
    ) {
        let mut layer = ShapesLayer::new(2);
        for i in 0..n {
            let offset = i as f32 * 30.0;
            layer
                .add_shape(ShapeKind::Rectangle, square(offset, offset + 20.0))
                .unwrap();
        }
        let before = layer.z_order().to_vec();
        let valid = is_permutation(&order, n);
        let result = layer.set_z_order(order.clone());

        prop_assert_eq!(result.is_ok(), valid);
        if valid {
            prop_assert_eq!(layer.z_order(), order.as_slice());
        } else {
            prop_assert_eq!(layer.z_order(), before.as_slice());
        }
    }

    #[test]
    fn prop_translation_moves_every_vertex(dx in -50.0f32..50.0, dy in -50.0f32..50.0) {
        let mut layer = ShapesLayer::new(2);
        layer
            .add_shape(ShapeKind::Rectangle, square(10.0, 50.0))
            .unwrap();
        layer
            .add_shape(ShapeKind::Ellipse, square(60.0, 90.0))
            .unwrap();
        let before: Vec<Point2> = (0..2)
            .flat_map(|i| layer.data().vertices(i).unwrap())
            .collect();

        layer.shift_shapes([dx, dy], &IndexSelector::All).unwrap();
        let after: Vec<Point2> = (0..2)
            .flat_map(|i| layer.data().vertices(i).unwrap())
            .collect();

        for (b, a) in before.iter().zip(&after) {
            prop_assert!(point_approx_eq([b[0] + dx, b[1] + dy], *a));
        }
    }
}
