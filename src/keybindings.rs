//! Customizable mode keybindings for the shapes layer.
//!
//! Mode keys are single characters matched case-insensitively. Space (momentary
//! pan/zoom), Shift (aspect and rotation lock) and Ctrl (delete on click) are
//! fixed and cannot be rebound.

use serde::{Deserialize, Serialize};

use crate::layer::Mode;

/// Keybinding configuration for interaction modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Hotkey for pan/zoom mode
    pub mode_pan_zoom: char,
    /// Hotkey for select mode
    pub mode_select: char,
    /// Hotkey for direct (vertex) mode
    pub mode_direct: char,
    /// Hotkey for rectangle creation
    pub mode_add_rectangle: char,
    /// Hotkey for ellipse creation
    pub mode_add_ellipse: char,
    /// Hotkey for line creation
    pub mode_add_line: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            mode_pan_zoom: 'z',
            mode_select: 's',
            mode_direct: 'd',
            mode_add_rectangle: 'r',
            mode_add_ellipse: 'e',
            mode_add_line: 'l',
        }
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the mode that corresponds to a key press, if any.
    pub fn mode_for_key(&self, key: char) -> Option<Mode> {
        Mode::all()
            .iter()
            .copied()
            .find(|mode| same_key(self.key_for_mode(*mode), key))
    }

    /// Get the hotkey for a specific mode.
    pub fn key_for_mode(&self, mode: Mode) -> char {
        match mode {
            Mode::PanZoom => self.mode_pan_zoom,
            Mode::Select => self.mode_select,
            Mode::Direct => self.mode_direct,
            Mode::AddRectangle => self.mode_add_rectangle,
            Mode::AddEllipse => self.mode_add_ellipse,
            Mode::AddLine => self.mode_add_line,
        }
    }

    /// Set the hotkey for a mode.
    pub fn set_mode_key(&mut self, mode: Mode, key: char) {
        let slot = match mode {
            Mode::PanZoom => &mut self.mode_pan_zoom,
            Mode::Select => &mut self.mode_select,
            Mode::Direct => &mut self.mode_direct,
            Mode::AddRectangle => &mut self.mode_add_rectangle,
            Mode::AddEllipse => &mut self.mode_add_ellipse,
            Mode::AddLine => &mut self.mode_add_line,
        };
        *slot = key;
    }

    /// Check if a key is already used by any binding.
    /// Returns a description of what it's used for, if anything.
    pub fn key_conflict(&self, key: char, exclude_mode: Option<Mode>) -> Option<String> {
        if key == ' ' {
            return Some("Momentary pan/zoom".to_string());
        }
        Mode::all()
            .iter()
            .filter(|mode| Some(**mode) != exclude_mode)
            .find(|mode| same_key(self.key_for_mode(**mode), key))
            .map(|mode| format!("{} mode", mode.label()))
    }
}

fn same_key(a: char, b: char) -> bool {
    a.to_ascii_lowercase() == b.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let kb = KeyBindings::new();
        assert_eq!(kb.mode_for_key('r'), Some(Mode::AddRectangle));
        assert_eq!(kb.mode_for_key('d'), Some(Mode::Direct));
        assert_eq!(kb.mode_for_key('s'), Some(Mode::Select));
        assert_eq!(kb.mode_for_key('z'), Some(Mode::PanZoom));
        assert_eq!(kb.mode_for_key('q'), None);
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let kb = KeyBindings::new();
        assert_eq!(kb.mode_for_key('S'), Some(Mode::Select));
    }

    #[test]
    fn test_rebind_and_conflict() {
        let mut kb = KeyBindings::new();
        assert_eq!(
            kb.key_conflict('d', Some(Mode::Select)),
            Some("Direct mode".to_string())
        );
        assert_eq!(kb.key_conflict('s', Some(Mode::Select)), None);
        assert!(kb.key_conflict(' ', None).is_some());

        kb.set_mode_key(Mode::Select, 'v');
        assert_eq!(kb.mode_for_key('v'), Some(Mode::Select));
        assert_eq!(kb.mode_for_key('s'), None);
        assert_eq!(kb.key_for_mode(Mode::Select), 'v');
    }
}
