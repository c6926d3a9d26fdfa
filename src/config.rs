//! Layer configuration.
//!
//! Settings are serializable to JSON so hosts can export and import them.
//! Missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};

use crate::color_utils::Color;
use crate::constants::{
    DEFAULT_EDGE_WIDTH, DEFAULT_ELLIPSE_SEGMENTS, DEFAULT_HIGHLIGHT_COLOR,
    DEFAULT_HIGHLIGHT_THICKNESS, DEFAULT_ROTATION_HANDLE_LENGTH, DEFAULT_VERTEX_SIZE,
};
use crate::error::Result;
use crate::keybindings::KeyBindings;

/// Verbosity a host should use for the layer's `log` output.
///
/// Mode switches and drag transitions log at debug, bulk replacement and
/// removal at info, ignored edits at warn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Levels from quietest to most verbose.
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
    }

    pub fn to_level_filter(&self) -> log::LevelFilter {
        (*self).into()
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Config format version; bumped on incompatible changes.
pub const CONFIG_VERSION: u32 = 1;

/// Settings of a shapes layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Version of the configuration format
    pub version: u32,
    /// Layer name, shown in the status message
    pub name: String,
    /// Default border thickness of new shapes
    pub edge_width: f32,
    /// Default border color of new shapes
    pub edge_color: String,
    /// Default fill color of new shapes
    pub face_color: String,
    /// Handle hit tolerance and marker size
    pub vertex_size: f32,
    /// Color of the hover/selection highlight
    pub highlight_color: [f32; 3],
    /// Border thickness of the highlight overlay
    pub highlight_thickness: f32,
    /// Distance of the rotation handle above the top edge of the box
    pub rotation_handle_length: f32,
    /// Number of outline points per ellipse
    pub ellipse_segments: usize,
    /// Log verbosity level
    pub log_level: LogLevel,
    /// Mode keybindings
    pub keybindings: KeyBindings,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            name: "Shapes".to_string(),
            edge_width: DEFAULT_EDGE_WIDTH,
            edge_color: "black".to_string(),
            face_color: "white".to_string(),
            vertex_size: DEFAULT_VERTEX_SIZE,
            highlight_color: DEFAULT_HIGHLIGHT_COLOR,
            highlight_thickness: DEFAULT_HIGHLIGHT_THICKNESS,
            rotation_handle_length: DEFAULT_ROTATION_HANDLE_LENGTH,
            ellipse_segments: DEFAULT_ELLIPSE_SEGMENTS,
            log_level: LogLevel::default(),
            keybindings: KeyBindings::default(),
        }
    }
}

impl LayerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> std::result::Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        // Colors are validated up front so the layer never sees an unknown name.
        Color::parse(&config.edge_color).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Color::parse(&config.face_color).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(config)
    }

    /// Default border color as RGBA.
    pub fn edge_rgba(&self) -> Color {
        Color::parse(&self.edge_color).unwrap_or(Color::BLACK)
    }

    /// Default fill color as RGBA.
    pub fn face_rgba(&self) -> Color {
        Color::parse(&self.face_color).unwrap_or(Color::WHITE)
    }

    pub fn highlight_rgba(&self) -> Color {
        Color::from(self.highlight_color)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A field holds a value the layer cannot use
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::Mode;

    #[test]
    fn test_json_round_trip() {
        let mut config = LayerConfig::new();
        config.name = "cells".to_string();
        config.vertex_size = 6.0;
        config.keybindings.set_mode_key(Mode::Select, 'v');

        let json = config.to_json().unwrap();
        let back = LayerConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = LayerConfig::from_json(r#"{ "name": "roi" }"#).unwrap();
        assert_eq!(config.name, "roi");
        assert_eq!(config.vertex_size, DEFAULT_VERTEX_SIZE);
        assert_eq!(config.keybindings, KeyBindings::default());
    }

    #[test]
    fn test_newer_version_rejected() {
        let json = format!(r#"{{ "version": {} }}"#, CONFIG_VERSION + 1);
        assert!(matches!(
            LayerConfig::from_json(&json),
            Err(ConfigError::VersionTooNew { .. })
        ));
    }

    #[test]
    fn test_unknown_color_rejected() {
        let result = LayerConfig::from_json(r#"{ "face_color": "not-a-color" }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Debug.to_level_filter(), log::LevelFilter::Debug);
        assert_eq!(LogLevel::all().len(), 5);
        let json = serde_json::to_string(&LogLevel::Warn).unwrap();
        assert_eq!(json, "\"warn\"");
    }
}
