//! Retained scene graph
//!
//! The visual nodes the reconciler drives: text nodes and layout containers,
//! stored in an arena and addressed by [`NodeId`]. Every mutation is counted in
//! [`SceneStats`] so callers can tell whether a frame touched the scene at all.
//!
//! Layout is explicit: [`Scene::set_layout`] arranges a container immediately,
//! and any change that alters a node's size re-arranges its ancestors.

pub mod arrange;

use std::collections::HashMap;
use std::fmt::{self, Write as _};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::settings::{Settings, TextMetrics, TextStyle};
use crate::sim::Rect;

pub use arrange::{Align, arrange_vertical, centerize};

/// Handle to a node in a [`Scene`]. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Direction a container stacks its children in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    Row,
    Column,
}

/// Container layout: stacking direction plus spacing between children
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(rename = "type")]
    pub kind: LayoutKind,
    pub gap: f32,
}

impl Layout {
    pub fn row(gap: f32) -> Self {
        Self {
            kind: LayoutKind::Row,
            gap,
        }
    }

    pub fn column(gap: f32) -> Self {
        Self {
            kind: LayoutKind::Column,
            gap,
        }
    }
}

/// A text primitive
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub content: String,
    pub font_size: f32,
    pub font_family: String,
    pub fill: u32,
    pub stroke: u32,
}

/// A container primitive with ordered children
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerNode {
    pub children: Vec<NodeId>,
    pub layout: Option<Layout>,
}

/// What a node draws
#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    Text(TextNode),
    Container(ContainerNode),
}

/// A node in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub visual: Visual,
    pub parent: Option<NodeId>,
    /// Position relative to the parent
    pub position: Vec2,
    /// Measured size (text) or extent of children (container)
    pub size: Vec2,
}

/// Mutation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub nodes_created: u64,
    pub nodes_destroyed: u64,
    pub attaches: u64,
    pub detaches: u64,
    /// Writes of text content (the expensive one)
    pub content_writes: u64,
    /// Writes of font size or family
    pub style_writes: u64,
    pub layout_writes: u64,
}

impl SceneStats {
    /// Total number of mutations of any kind
    pub fn mutations(&self) -> u64 {
        self.nodes_created
            + self.nodes_destroyed
            + self.attaches
            + self.detaches
            + self.content_writes
            + self.style_writes
            + self.layout_writes
    }
}

/// Arena of visual nodes
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: HashMap<NodeId, SceneNode>,
    next_id: u64,
    style: TextStyle,
    metrics: TextMetrics,
    stats: SceneStats,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl Scene {
    pub fn new(settings: &Settings) -> Self {
        Self {
            nodes: HashMap::new(),
            next_id: 0,
            style: settings.text.clone(),
            metrics: settings.metrics,
            stats: SceneStats::default(),
        }
    }

    /// Default text style applied to new text nodes
    pub fn text_style(&self) -> &TextStyle {
        &self.style
    }

    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SceneStats::default();
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    fn node(&self, id: NodeId) -> Result<&SceneNode, SceneError> {
        self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(&id).ok_or(SceneError::NodeNotFound(id))
    }

    fn insert_node(&mut self, visual: Visual, size: Vec2) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            SceneNode {
                visual,
                parent: None,
                position: Vec2::ZERO,
                size,
            },
        );
        self.stats.nodes_created += 1;
        id
    }

    /// Create an empty, detached text node with the default style
    pub fn create_text(&mut self) -> NodeId {
        let text = TextNode {
            content: String::new(),
            font_size: self.style.font_size,
            font_family: self.style.font_family.clone(),
            fill: self.style.fill,
            stroke: self.style.stroke,
        };
        let size = self.metrics.measure(&text.content, text.font_size);
        self.insert_node(Visual::Text(text), size)
    }

    /// Create an empty, detached container without layout
    pub fn create_container(&mut self) -> NodeId {
        self.insert_node(Visual::Container(ContainerNode::default()), Vec2::ZERO)
    }

    pub fn text(&self, id: NodeId) -> Result<&TextNode, SceneError> {
        match &self.node(id)?.visual {
            Visual::Text(text) => Ok(text),
            Visual::Container(_) => Err(SceneError::NotText(id)),
        }
    }

    fn text_mut(&mut self, id: NodeId) -> Result<&mut TextNode, SceneError> {
        match &mut self.node_mut(id)?.visual {
            Visual::Text(text) => Ok(text),
            Visual::Container(_) => Err(SceneError::NotText(id)),
        }
    }

    fn container(&self, id: NodeId) -> Result<&ContainerNode, SceneError> {
        match &self.node(id)?.visual {
            Visual::Container(container) => Ok(container),
            Visual::Text(_) => Err(SceneError::NotAContainer(id)),
        }
    }

    fn container_mut(&mut self, id: NodeId) -> Result<&mut ContainerNode, SceneError> {
        match &mut self.node_mut(id)?.visual {
            Visual::Container(container) => Ok(container),
            Visual::Text(_) => Err(SceneError::NotAContainer(id)),
        }
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], SceneError> {
        Ok(&self.container(id)?.children)
    }

    pub fn layout(&self, id: NodeId) -> Result<Option<Layout>, SceneError> {
        Ok(self.container(id)?.layout)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    // === Text setters ===

    pub fn set_text_content(&mut self, id: NodeId, content: &str) -> Result<(), SceneError> {
        let text = self.text_mut(id)?;
        text.content.clear();
        text.content.push_str(content);
        self.stats.content_writes += 1;
        self.remeasure_text(id)
    }

    /// Set the font size; `None` restores the default
    pub fn set_font_size(&mut self, id: NodeId, size: Option<f32>) -> Result<(), SceneError> {
        let size = size.unwrap_or(self.style.font_size);
        self.text_mut(id)?.font_size = size;
        self.stats.style_writes += 1;
        self.remeasure_text(id)
    }

    /// Set the font family; `None` restores the default
    pub fn set_font_family(&mut self, id: NodeId, family: Option<&str>) -> Result<(), SceneError> {
        let family = family.unwrap_or(self.style.font_family.as_str()).to_string();
        self.text_mut(id)?.font_family = family;
        self.stats.style_writes += 1;
        Ok(())
    }

    fn remeasure_text(&mut self, id: NodeId) -> Result<(), SceneError> {
        let text = self.text(id)?;
        let size = self.metrics.measure(&text.content, text.font_size);
        let node = self.node_mut(id)?;
        node.size = size;
        match node.parent {
            Some(parent) => self.relayout_upwards(parent),
            None => Ok(()),
        }
    }

    // === Container setters ===

    /// Set a container's layout and arrange its children right away
    pub fn set_layout(&mut self, id: NodeId, layout: Option<Layout>) -> Result<(), SceneError> {
        self.container_mut(id)?.layout = layout;
        self.stats.layout_writes += 1;
        self.relayout_upwards(id)
    }

    /// Insert `child` into `parent` at `index` (clamped to the child count).
    ///
    /// A child that already has a parent is detached from it first. Inserting
    /// a node into itself or into one of its descendants is rejected.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), SceneError> {
        self.node(child)?;
        self.container(parent)?;
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == child {
                return Err(SceneError::Cycle(child));
            }
            ancestor = self.parent(current);
        }
        if self.parent(child).is_some() {
            self.detach(child)?;
        }

        let container = self.container_mut(parent)?;
        let index = index.min(container.children.len());
        container.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.stats.attaches += 1;
        self.relayout_upwards(parent)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        let index = self.children(parent)?.len();
        self.insert_child(parent, index, child)
    }

    /// Remove a node from its parent; detached nodes stay alive
    pub fn detach(&mut self, id: NodeId) -> Result<(), SceneError> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(());
        };
        self.container_mut(parent)?.children.retain(|c| *c != id);
        self.node_mut(id)?.parent = None;
        self.node_mut(id)?.position = Vec2::ZERO;
        self.stats.detaches += 1;
        self.relayout_upwards(parent)
    }

    /// Detach a node and free it together with its whole subtree
    pub fn destroy(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.detach(id)?;

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                if let Visual::Container(container) = node.visual {
                    stack.extend(container.children);
                }
                self.stats.nodes_destroyed += 1;
            }
        }
        Ok(())
    }

    // === Geometry ===

    pub fn position(&self, id: NodeId) -> Result<Vec2, SceneError> {
        Ok(self.node(id)?.position)
    }

    pub fn set_position(&mut self, id: NodeId, position: Vec2) -> Result<(), SceneError> {
        self.node_mut(id)?.position = position;
        Ok(())
    }

    pub fn size(&self, id: NodeId) -> Result<Vec2, SceneError> {
        Ok(self.node(id)?.size)
    }

    pub fn width(&self, id: NodeId) -> Result<f32, SceneError> {
        Ok(self.size(id)?.x)
    }

    pub fn height(&self, id: NodeId) -> Result<f32, SceneError> {
        Ok(self.size(id)?.y)
    }

    /// Position in the coordinate space of the topmost ancestor
    pub fn world_position(&self, id: NodeId) -> Result<Vec2, SceneError> {
        let mut node = self.node(id)?;
        let mut position = node.position;
        while let Some(parent) = node.parent {
            node = self.node(parent)?;
            position += node.position;
        }
        Ok(position)
    }

    /// World-space bounding box
    pub fn bounds(&self, id: NodeId) -> Result<Rect, SceneError> {
        Ok(Rect::new(self.world_position(id)?, self.size(id)?))
    }

    /// Re-arrange `id` (if it is a container) and every ancestor above it
    fn relayout_upwards(&mut self, id: NodeId) -> Result<(), SceneError> {
        let mut current = Some(id);
        while let Some(node) = current {
            if matches!(self.node(node)?.visual, Visual::Container(_)) {
                self.arrange(node)?;
            }
            current = self.parent(node);
        }
        Ok(())
    }

    /// Stack children per the container's layout, then recompute its extent
    fn arrange(&mut self, id: NodeId) -> Result<(), SceneError> {
        let container = self.container(id)?;
        let layout = container.layout;
        let children = container.children.clone();

        let mut origin = Vec2::ZERO;
        let mut extent = Vec2::ZERO;
        for child in children {
            let size = self.size(child)?;
            let position = if layout.is_some() {
                origin
            } else {
                self.position(child)?
            };
            self.set_position(child, position)?;
            extent = extent.max(position + size);

            if let Some(layout) = layout {
                match layout.kind {
                    LayoutKind::Row => origin.x += size.x + layout.gap,
                    LayoutKind::Column => origin.y += size.y + layout.gap,
                }
            }
        }

        self.node_mut(id)?.size = extent;
        Ok(())
    }

    /// Indented, human-readable dump of a subtree
    pub fn dump(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.dump_into(id, 0, &mut out);
        out
    }

    fn dump_into(&self, id: NodeId, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        let Some(node) = self.nodes.get(&id) else {
            let _ = writeln!(out, "{indent}<missing {id}>");
            return;
        };
        match &node.visual {
            Visual::Text(text) => {
                let _ = writeln!(
                    out,
                    "{indent}text {id} {:?} {}px {} @ ({}, {})",
                    text.content,
                    text.font_size,
                    text.font_family,
                    node.position.x,
                    node.position.y
                );
            }
            Visual::Container(container) => {
                let layout = match container.layout {
                    Some(Layout {
                        kind: LayoutKind::Row,
                        gap,
                    }) => format!("row gap={gap}"),
                    Some(Layout {
                        kind: LayoutKind::Column,
                        gap,
                    }) => format!("column gap={gap}"),
                    None => "free".to_string(),
                };
                let _ = writeln!(
                    out,
                    "{indent}container {id} [{layout}] {}x{} @ ({}, {})",
                    node.size.x, node.size.y, node.position.x, node.position.y
                );
                for child in &container.children {
                    self.dump_into(*child, depth + 1, out);
                }
            }
        }
    }
}
