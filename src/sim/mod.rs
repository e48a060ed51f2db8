//! Gameplay helpers shared by the arcade prototypes
//!
//! - `game`: entity + plugin frame dispatcher
//! - `state`: per-session state (mode, keys, placements)
//! - `collision`: boxes, segments and reflections

pub mod collision;
pub mod game;
pub mod state;

pub use collision::{
    Rect, Segment, rect_segment_intersection, reflect_across_line, reflect_velocity,
    segment_intersection,
};
pub use game::{
    Appeal, AppealStart, Entity, EntityPlugin, Game, GameContext, GamePlugin, MoveByArrowKeys,
    RenderHook, Variables,
};
pub use state::{AppealPhase, AppealState, GameMode, KeyState, Placement};
