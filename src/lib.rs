//! GSX Arcade - retained-mode scene reconciler for 2D arcade prototypes
//!
//! Core modules:
//! - `gsx`: Declarative descriptors, fiber reconciliation, commit, renderer façade
//! - `scene`: Retained scene graph of text and container nodes
//! - `sim`: Frame dispatcher (entities + plugins) and collision helpers
//! - `settings`: Text style, metrics and canvas configuration
//! - `error`: Error types shared by the renderer and the scene

pub mod error;
pub mod gsx;
pub mod scene;
pub mod settings;
pub mod sim;

pub use error::{RenderError, SceneError};
pub use gsx::{Component, Renderer, container, text};
pub use scene::{NodeId, Scene};
pub use settings::Settings;

use glam::Vec2;

/// Configuration constants
pub mod consts {
    /// Frame rate the prototypes are tuned for
    pub const FRAME_RATE: f32 = 60.0;
    /// Fixed frame timestep
    pub const FRAME_DT: f32 = 1.0 / FRAME_RATE;

    /// Default canvas dimensions
    pub const CANVAS_WIDTH: f32 = 500.0;
    pub const CANVAS_HEIGHT: f32 = 500.0;

    /// Default text style (white fill, blue outline)
    pub const DEFAULT_FONT_SIZE: f32 = 26.0;
    pub const DEFAULT_FONT_FAMILY: &str = "Arial";
    pub const DEFAULT_TEXT_FILL: u32 = 0xffffff;
    pub const DEFAULT_TEXT_STROKE: u32 = 0x0044ff;

    /// Approximate glyph advance as a fraction of the font size
    pub const GLYPH_WIDTH_RATIO: f32 = 0.6;
    /// Line height as a fraction of the font size
    pub const LINE_HEIGHT_RATIO: f32 = 1.25;

    /// Entity appearance animation advances this much per frame (30 frames total)
    pub const APPEAL_STEP: f32 = 1.0 / 30.0;
}

/// Linear interpolation between two points, `t` clamped to [0, 1]
#[inline]
pub fn lerp_clamped(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    from.lerp(to, t.clamp(0.0, 1.0))
}
