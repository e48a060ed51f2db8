//! Frame dispatcher
//!
//! A [`Game`] owns the scene, a flat list of entities and a list of plugins.
//! Every frame it places new entities on stage, advances their appearance
//! animation, runs their per-entity plugins and hooks and finally each game
//! plugin's `on_render` hook. All per-session state lives in [`GameContext`].

use std::collections::HashMap;

use glam::Vec2;

use super::state::{AppealPhase, AppealState, GameMode, KeyState, Placement};
use crate::error::{RenderError, SceneError};
use crate::scene::{NodeId, Scene};
use crate::settings::Settings;

/// State handed to plugins every frame
#[derive(Debug)]
pub struct GameContext {
    pub scene: Scene,
    /// Root container everything is drawn under
    pub stage: NodeId,
    pub canvas_size: Vec2,
    pub keys: KeyState,
    pub mode: GameMode,
    /// Frames rendered so far
    pub frame: u64,
    /// Seconds per frame
    pub dt: f32,
    spawned: Vec<Entity>,
}

impl GameContext {
    /// Simulated time covered by the frames rendered so far
    pub fn elapsed(&self) -> f32 {
        self.frame as f32 * self.dt
    }

    /// Queue an entity; it goes on stage at the start of the next frame
    pub fn register(&mut self, entity: Entity) {
        self.spawned.push(entity);
    }
}

/// Game-wide hooks
pub trait GamePlugin {
    fn name(&self) -> &str;

    /// Called once from [`Game::init`]
    fn on_init(&mut self, _ctx: &mut GameContext) -> Result<(), RenderError> {
        Ok(())
    }

    /// Called every frame after entities have been updated
    fn on_render(&mut self, _ctx: &mut GameContext) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Per-entity behavior
pub trait EntityPlugin {
    fn update(&mut self, node: NodeId, ctx: &mut GameContext) -> Result<(), SceneError>;
}

/// Per-entity scratch values shared by its hooks
pub type Variables = HashMap<String, f64>;

/// Closure run every frame after the entity's plugins
pub type RenderHook =
    Box<dyn FnMut(NodeId, &mut Variables, &mut GameContext) -> Result<(), SceneError>>;

/// When a waiting entity starts its appearance animation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppealStart {
    Immediately,
    /// When the key goes down
    OnKey(String),
    /// Once the game has rendered this many frames
    AtFrame(u64),
}

impl AppealStart {
    fn ready(&self, ctx: &GameContext) -> bool {
        match self {
            AppealStart::Immediately => true,
            AppealStart::OnKey(key) => ctx.keys.just_pressed(key),
            AppealStart::AtFrame(frame) => ctx.frame >= *frame,
        }
    }
}

/// Slide in from `from` to the entity's placement
#[derive(Debug, Clone, PartialEq)]
pub struct Appeal {
    pub from: Placement,
    pub start: AppealStart,
}

/// A visual node plus its placement and behaviors
pub struct Entity {
    pub node: NodeId,
    pub placement: Placement,
    pub appeal: Option<Appeal>,
    pub state: AppealState,
    pub on_stage: bool,
    pub plugins: Vec<Box<dyn EntityPlugin>>,
    pub hooks: Vec<RenderHook>,
    pub variables: Variables,
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("node", &self.node)
            .field("placement", &self.placement)
            .field("appeal", &self.appeal)
            .field("state", &self.state)
            .field("on_stage", &self.on_stage)
            .field("plugins", &self.plugins.len())
            .field("hooks", &self.hooks.len())
            .field("variables", &self.variables)
            .finish()
    }
}

impl Entity {
    pub fn new(node: NodeId, placement: Placement) -> Self {
        Self {
            node,
            placement,
            appeal: None,
            state: AppealState::default(),
            on_stage: false,
            plugins: Vec::new(),
            hooks: Vec::new(),
            variables: Variables::new(),
        }
    }

    pub fn with_appeal(mut self, appeal: Appeal) -> Self {
        self.appeal = Some(appeal);
        self
    }

    pub fn with_plugin(mut self, plugin: impl EntityPlugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn with_hook(
        mut self,
        hook: impl FnMut(NodeId, &mut Variables, &mut GameContext) -> Result<(), SceneError>
        + 'static,
    ) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    fn update(&mut self, ctx: &mut GameContext) -> Result<(), SceneError> {
        let size = ctx.scene.size(self.node)?;
        let current = ctx.scene.position(self.node)?;

        if !self.on_stage {
            ctx.scene.append_child(ctx.stage, self.node)?;
            self.on_stage = true;
            let target = match &self.appeal {
                Some(appeal) => {
                    self.state.phase = AppealPhase::Waiting;
                    appeal.from.resolve(size, ctx.canvas_size, current)
                }
                None => self.placement.resolve(size, ctx.canvas_size, current),
            };
            ctx.scene.set_position(self.node, target)?;
        }

        if let Some(appeal) = &self.appeal {
            if self.state.phase == AppealPhase::Waiting && appeal.start.ready(ctx) {
                self.state.phase = AppealPhase::Appeal;
                self.state.t = 0.0;
            }
            if self.state.phase == AppealPhase::Appeal {
                self.state.step();
                let from = appeal.from.resolve(size, ctx.canvas_size, current);
                let to = self.placement.resolve(size, ctx.canvas_size, current);
                ctx.scene.set_position(self.node, self.state.position(from, to))?;
            }
        }

        for plugin in &mut self.plugins {
            plugin.update(self.node, ctx)?;
        }
        for hook in &mut self.hooks {
            hook(self.node, &mut self.variables, ctx)?;
        }
        Ok(())
    }
}

/// Moves an entity with the arrow keys
#[derive(Debug, Clone, PartialEq)]
pub struct MoveByArrowKeys {
    /// Pixels per frame
    pub speed: f32,
    /// Keep the node inside this area (origin at 0,0)
    pub clamp: Option<Vec2>,
    /// Only move in this mode
    pub only_in: Option<GameMode>,
}

impl MoveByArrowKeys {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            clamp: None,
            only_in: None,
        }
    }
}

impl EntityPlugin for MoveByArrowKeys {
    fn update(&mut self, node: NodeId, ctx: &mut GameContext) -> Result<(), SceneError> {
        if self.only_in.is_some_and(|mode| mode != ctx.mode) {
            return Ok(());
        }

        let mut delta = Vec2::ZERO;
        if ctx.keys.is_down("ArrowLeft") {
            delta.x -= self.speed;
        }
        if ctx.keys.is_down("ArrowRight") {
            delta.x += self.speed;
        }
        if ctx.keys.is_down("ArrowUp") {
            delta.y -= self.speed;
        }
        if ctx.keys.is_down("ArrowDown") {
            delta.y += self.speed;
        }

        let mut position = ctx.scene.position(node)? + delta;
        if let Some(area) = self.clamp {
            let size = ctx.scene.size(node)?;
            position = position.clamp(Vec2::ZERO, (area - size).max(Vec2::ZERO));
        }
        ctx.scene.set_position(node, position)
    }
}

/// The frame loop
pub struct Game {
    ctx: GameContext,
    entities: Vec<Entity>,
    plugins: Vec<Box<dyn GamePlugin>>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.plugins.iter().map(|p| p.name()).collect();
        f.debug_struct("Game")
            .field("ctx", &self.ctx)
            .field("entities", &self.entities)
            .field("plugins", &names)
            .finish()
    }
}

impl Game {
    pub fn new(settings: &Settings) -> Self {
        let mut scene = Scene::new(settings);
        let stage = scene.create_container();
        Self {
            ctx: GameContext {
                scene,
                stage,
                canvas_size: settings.canvas_size(),
                keys: KeyState::new(),
                mode: GameMode::default(),
                frame: 0,
                dt: settings.frame_dt(),
                spawned: Vec::new(),
            },
            entities: Vec::new(),
            plugins: Vec::new(),
        }
    }

    pub fn with_plugin(mut self, plugin: impl GamePlugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut GameContext {
        &mut self.ctx
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Run every plugin's `on_init`
    pub fn init(&mut self) -> Result<(), RenderError> {
        for plugin in &mut self.plugins {
            log::info!("Initializing plugin {}", plugin.name());
            plugin.on_init(&mut self.ctx)?;
        }
        Ok(())
    }

    /// Advance one frame
    pub fn render(&mut self) -> Result<(), RenderError> {
        self.entities.append(&mut self.ctx.spawned);

        for entity in &mut self.entities {
            entity.update(&mut self.ctx)?;
        }
        for plugin in &mut self.plugins {
            plugin.on_render(&mut self.ctx)?;
        }

        self.ctx.keys.end_frame();
        self.ctx.frame += 1;
        Ok(())
    }
}
