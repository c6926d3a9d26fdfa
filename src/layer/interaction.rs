//! Pointer interaction state of the shapes layer.

use crate::geometry::Point2;
use crate::model::ShapeKind;

/// What the pointer is doing between press and release.
///
/// A press first records a potential drag; the first move turns it into the
/// concrete interaction for the handle or shape that was hit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    /// No button held.
    #[default]
    Idle,
    /// Button held, nothing moved yet.
    PotentialDrag {
        start: Point2,
        shape: Option<usize>,
        vertex: Option<usize>,
        /// Shift was held at press time
        shift: bool,
    },
    /// Translating the selected shapes; `anchor` is the pointer offset from
    /// the box center when the drag started.
    Dragging { anchor: Point2 },
    /// Resizing the selection box from `handle`, with the opposite handle
    /// held at `fixed_vertex`.
    Resizing {
        handle: usize,
        fixed_index: usize,
        fixed_vertex: Point2,
    },
    /// Rotating the selected shapes about `pivot`.
    Rotating { pivot: Point2 },
    /// Moving one vertex of one shape.
    DraggingVertex { shape: usize, vertex: usize },
    /// Growing a marquee selection rectangle.
    MarqueeSelecting { anchor: Point2, current: Point2 },
    /// Waiting for the first move of a new shape.
    Creating { kind: ShapeKind, anchor: Point2 },
}

impl InteractionState {
    /// A shape or the selection is being changed by the pointer.
    pub fn is_moving(&self) -> bool {
        matches!(
            self,
            InteractionState::Dragging { .. }
                | InteractionState::Resizing { .. }
                | InteractionState::Rotating { .. }
                | InteractionState::DraggingVertex { .. }
        )
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self, InteractionState::MarqueeSelecting { .. })
    }

    /// The marquee corners, if one is being drawn.
    pub fn marquee(&self) -> Option<[Point2; 2]> {
        match self {
            InteractionState::MarqueeSelecting { anchor, current } => Some([*anchor, *current]),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(!InteractionState::Idle.is_moving());
        assert!(InteractionState::Rotating { pivot: [0.0, 0.0] }.is_moving());
        let marquee = InteractionState::MarqueeSelecting {
            anchor: [1.0, 2.0],
            current: [3.0, 4.0],
        };
        assert!(marquee.is_selecting());
        assert_eq!(marquee.marquee(), Some([[1.0, 2.0], [3.0, 4.0]]));
        assert_eq!(InteractionState::Idle.marquee(), None);
    }
}
