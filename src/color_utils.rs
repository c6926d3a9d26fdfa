//! Color parsing shared by shape styles and the highlight overlay.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShapesError};

/// An RGBA color with components in range 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const BLACK: Color = Color([0.0, 0.0, 0.0, 1.0]);
    pub const WHITE: Color = Color([1.0, 1.0, 1.0, 1.0]);
    pub const TRANSPARENT: Color = Color([0.0, 0.0, 0.0, 0.0]);

    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b, 1.0])
    }

    /// Parse a named color or a `#rrggbb` / `#rrggbbaa` hex string.
    pub fn parse(value: &str) -> Result<Self> {
        let name = value.trim().to_ascii_lowercase();
        if let Some(hex) = name.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ShapesError::UnknownColor(value.to_string()));
        }
        let color = match name.as_str() {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "red" => Color::rgb(1.0, 0.0, 0.0),
            "green" => Color::rgb(0.0, 0.5, 0.0),
            "lime" => Color::rgb(0.0, 1.0, 0.0),
            "blue" => Color::rgb(0.0, 0.0, 1.0),
            "yellow" => Color::rgb(1.0, 1.0, 0.0),
            "cyan" => Color::rgb(0.0, 1.0, 1.0),
            "magenta" => Color::rgb(1.0, 0.0, 1.0),
            "gray" | "grey" => Color::rgb(0.5, 0.5, 0.5),
            "orange" => Color::rgb(1.0, 0.647, 0.0),
            "transparent" => Color::TRANSPARENT,
            _ => return Err(ShapesError::UnknownColor(value.to_string())),
        };
        Ok(color)
    }

    /// Hex representation, alpha included only when not opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        if a == 255 {
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl From<[f32; 3]> for Color {
    fn from(rgb: [f32; 3]) -> Self {
        Color::rgb(rgb[0], rgb[1], rgb[2])
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| -> Option<f32> {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .ok()
            .map(|v| v as f32 / 255.0)
    };
    let alpha = if hex.len() == 8 { channel(6)? } else { 1.0 };
    Some(Color([channel(0)?, channel(2)?, channel(4)?, alpha]))
}
