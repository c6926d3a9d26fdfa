//! Interaction modes of the shapes layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ShapesError;
use crate::model::ShapeKind;

/// The active interaction mode. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Mouse events drive the camera; the layer ignores them
    #[default]
    PanZoom,
    /// Move, resize and rotate whole shapes through the selection box
    Select,
    /// Move individual vertices of the selected shapes
    Direct,
    /// Click-drag to create a rectangle
    AddRectangle,
    /// Click-drag to create an ellipse
    AddEllipse,
    /// Click-drag to create a line
    AddLine,
}

impl Mode {
    pub fn all() -> &'static [Mode] {
        &[
            Mode::PanZoom,
            Mode::Select,
            Mode::Direct,
            Mode::AddRectangle,
            Mode::AddEllipse,
            Mode::AddLine,
        ]
    }

    /// Identifier used in mode strings and serialized settings.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::PanZoom => "pan_zoom",
            Mode::Select => "select",
            Mode::Direct => "direct",
            Mode::AddRectangle => "add_rectangle",
            Mode::AddEllipse => "add_ellipse",
            Mode::AddLine => "add_line",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::PanZoom => "Pan/zoom",
            Mode::Select => "Select",
            Mode::Direct => "Direct",
            Mode::AddRectangle => "Add rectangle",
            Mode::AddEllipse => "Add ellipse",
            Mode::AddLine => "Add line",
        }
    }

    /// Kind of shape created by click-drag in this mode.
    pub fn creates(&self) -> Option<ShapeKind> {
        match self {
            Mode::AddRectangle => Some(ShapeKind::Rectangle),
            Mode::AddEllipse => Some(ShapeKind::Ellipse),
            Mode::AddLine => Some(ShapeKind::Line),
            _ => None,
        }
    }

    /// Modes in which pointer events edit the selection.
    pub fn is_editing(&self) -> bool {
        matches!(self, Mode::Select | Mode::Direct)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = ShapesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('/', "_");
        Mode::all()
            .iter()
            .copied()
            .find(|mode| mode.name() == normalized)
            .ok_or_else(|| ShapesError::UnknownMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode() {
        assert_eq!("select".parse::<Mode>().unwrap(), Mode::Select);
        assert_eq!("pan_zoom".parse::<Mode>().unwrap(), Mode::PanZoom);
        assert_eq!("Pan/Zoom".parse::<Mode>().unwrap(), Mode::PanZoom);
        assert!(matches!(
            "lasso".parse::<Mode>(),
            Err(ShapesError::UnknownMode(m)) if m == "lasso"
        ));
    }

    #[test]
    fn test_creates() {
        assert_eq!(Mode::AddRectangle.creates(), Some(ShapeKind::Rectangle));
        assert_eq!(Mode::Select.creates(), None);
        assert!(Mode::Direct.is_editing());
        assert!(!Mode::AddLine.is_editing());
    }

    #[test]
    fn test_display_round_trip() {
        for mode in Mode::all() {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), *mode);
        }
    }
}
