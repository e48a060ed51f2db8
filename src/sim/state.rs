//! Per-session state shared by the frame dispatcher and its plugins

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::APPEAL_STEP;
use crate::lerp_clamped;

/// Current mode of a prototype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Title screen, waiting for the player
    #[default]
    Start,
    /// Active gameplay
    Play,
    /// Run ended
    GameOver,
}

/// Keyboard state fed by the embedding application
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    held: HashSet<String>,
    pressed: HashSet<String>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key went down
    pub fn press(&mut self, key: &str) {
        if self.held.insert(key.to_string()) {
            self.pressed.insert(key.to_string());
        }
    }

    /// Key went up
    pub fn release(&mut self, key: &str) {
        self.held.remove(key);
    }

    /// Key is currently held
    pub fn is_down(&self, key: &str) -> bool {
        self.held.contains(key)
    }

    /// Key went down during the current frame
    pub fn just_pressed(&self, key: &str) -> bool {
        self.pressed.contains(key)
    }

    /// Forget edge-triggered presses (called at the end of each frame)
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }
}

/// Where an entity sits relative to the canvas edges.
///
/// `left`/`top` win over `right`/`bottom`, which win over centering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub left: Option<f32>,
    pub right: Option<f32>,
    pub top: Option<f32>,
    pub bottom: Option<f32>,
    #[serde(default)]
    pub center_x: bool,
    #[serde(default)]
    pub center_y: bool,
}

impl Placement {
    pub fn centered() -> Self {
        Self {
            center_x: true,
            center_y: true,
            ..Self::default()
        }
    }

    /// Top-left position of a node of `size` inside `canvas`.
    ///
    /// Axes with no constraint keep the matching component of `current`.
    pub fn resolve(&self, size: Vec2, canvas: Vec2, current: Vec2) -> Vec2 {
        let x = match (self.left, self.right) {
            (Some(left), _) => left,
            (None, Some(right)) => canvas.x - right - size.x,
            (None, None) if self.center_x => (canvas.x - size.x) / 2.0,
            (None, None) => current.x,
        };
        let y = match (self.top, self.bottom) {
            (Some(top), _) => top,
            (None, Some(bottom)) => canvas.y - bottom - size.y,
            (None, None) if self.center_y => (canvas.y - size.y) / 2.0,
            (None, None) => current.y,
        };
        Vec2::new(x, y)
    }
}

/// Appearance animation state of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AppealPhase {
    /// No animation configured or not started
    #[default]
    None,
    /// Parked at the start placement until the start condition holds
    Waiting,
    /// Moving toward the final placement
    Appeal,
    /// At rest
    Done,
}

/// Progress of an entity's appearance animation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AppealState {
    pub phase: AppealPhase,
    /// Animation progress in [0, 1]
    pub t: f32,
}

impl AppealState {
    /// Advance one frame; returns true when the animation just finished
    pub fn step(&mut self) -> bool {
        if self.phase != AppealPhase::Appeal {
            return false;
        }
        self.t = (self.t + APPEAL_STEP).min(1.0);
        if self.t >= 1.0 {
            self.phase = AppealPhase::Done;
            return true;
        }
        false
    }

    /// Interpolated position between two resolved placements
    pub fn position(&self, from: Vec2, to: Vec2) -> Vec2 {
        match self.phase {
            AppealPhase::None | AppealPhase::Done => to,
            AppealPhase::Waiting => from,
            AppealPhase::Appeal => lerp_clamped(from, to, self.t),
        }
    }
}
