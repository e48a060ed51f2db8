//! Renderer and demo settings
//!
//! Loaded from a JSON file next to the binary; every field falls back to its default.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Default look of text nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Font size used when a text descriptor omits `fontSize`
    pub font_size: f32,
    /// Font family used when a text descriptor omits `fontFamily`
    pub font_family: String,
    /// Fill color (0xRRGGBB)
    pub fill: u32,
    /// Outline color (0xRRGGBB)
    pub stroke: u32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            fill: DEFAULT_TEXT_FILL,
            stroke: DEFAULT_TEXT_STROKE,
        }
    }
}

/// Approximate text measurement used for layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextMetrics {
    /// Glyph advance as a fraction of the font size
    pub glyph_width: f32,
    /// Line height as a fraction of the font size
    pub line_height: f32,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            glyph_width: GLYPH_WIDTH_RATIO,
            line_height: LINE_HEIGHT_RATIO,
        }
    }
}

impl TextMetrics {
    /// Measure a single line of text
    pub fn measure(&self, content: &str, font_size: f32) -> Vec2 {
        let glyphs = content.chars().count() as f32;
        Vec2::new(
            glyphs * font_size * self.glyph_width,
            font_size * self.line_height,
        )
    }
}

/// All settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Text ===
    pub text: TextStyle,
    pub metrics: TextMetrics,

    // === Demo loop ===
    /// Canvas width in pixels
    pub canvas_width: f32,
    /// Canvas height in pixels
    pub canvas_height: f32,
    /// Frames per second of the demo loop
    pub frame_rate: f32,
    /// Frames to run before the demo exits
    pub frames: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            text: TextStyle::default(),
            metrics: TextMetrics::default(),
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            frame_rate: FRAME_RATE,
            frames: 180,
        }
    }
}

impl Settings {
    /// Canvas size as a vector
    pub fn canvas_size(&self) -> Vec2 {
        Vec2::new(self.canvas_width, self.canvas_height)
    }

    /// Seconds per frame (falls back to the default rate for non-positive values)
    pub fn frame_dt(&self) -> f32 {
        if self.frame_rate > 0.0 {
            1.0 / self.frame_rate
        } else {
            FRAME_DT
        }
    }

    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from a file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("No settings at {} ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}
