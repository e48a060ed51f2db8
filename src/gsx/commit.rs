//! Commit phase: apply a fiber tree's effects to the scene
//!
//! Props reach the scene through an explicit setter table per node kind.
//! Deletions run first, then the work tree in pre-order, so a placed node is
//! inserted at its final index among the siblings that survive the pass.

use super::component::{
    KIND_CONTAINER, KIND_TEXT, PROP_CONTENT, PROP_FONT_FAMILY, PROP_FONT_SIZE, PROP_LAYOUT,
    PropValue, Props,
};
use super::fiber::{Effect, EffectCounts, FiberId, FiberTree};
use crate::error::RenderError;
use crate::scene::{Layout, NodeId, Scene};

/// Visual primitives the scene can realize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Container,
}

impl NodeKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            KIND_TEXT => Some(NodeKind::Text),
            KIND_CONTAINER => Some(NodeKind::Container),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Text => KIND_TEXT,
            NodeKind::Container => KIND_CONTAINER,
        }
    }

    fn create(&self, scene: &mut Scene) -> NodeId {
        match self {
            NodeKind::Text => scene.create_text(),
            NodeKind::Container => scene.create_container(),
        }
    }
}

/// A text prop write; `None` resets to the default
#[derive(Debug, Clone, PartialEq)]
pub enum TextProp<'a> {
    FontSize(Option<f32>),
    FontFamily(Option<&'a str>),
    Content(Option<&'a str>),
}

/// A container prop write; `None` resets to the default
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerProp {
    Layout(Option<Layout>),
}

/// A resolved prop write
#[derive(Debug, Clone, PartialEq)]
pub enum PropSetter<'a> {
    Text(TextProp<'a>),
    Container(ContainerProp),
}

impl<'a> PropSetter<'a> {
    /// Resolve `key` for `kind`.
    ///
    /// Returns `Ok(None)` for keys the kind does not know.
    pub fn resolve(
        kind: NodeKind,
        key: &str,
        value: Option<&'a PropValue>,
    ) -> Result<Option<Self>, RenderError> {
        let invalid = || RenderError::InvalidProp {
            kind: kind.as_str().to_string(),
            key: key.to_string(),
        };

        let setter = match (kind, key, value) {
            (NodeKind::Text, PROP_FONT_SIZE, None) => PropSetter::Text(TextProp::FontSize(None)),
            (NodeKind::Text, PROP_FONT_SIZE, Some(PropValue::Number(size))) => {
                PropSetter::Text(TextProp::FontSize(Some(*size as f32)))
            }
            (NodeKind::Text, PROP_FONT_FAMILY, None) => {
                PropSetter::Text(TextProp::FontFamily(None))
            }
            (NodeKind::Text, PROP_FONT_FAMILY, Some(PropValue::Text(family))) => {
                PropSetter::Text(TextProp::FontFamily(Some(family.as_str())))
            }
            (NodeKind::Text, PROP_CONTENT, None) => PropSetter::Text(TextProp::Content(None)),
            (NodeKind::Text, PROP_CONTENT, Some(PropValue::Text(content))) => {
                PropSetter::Text(TextProp::Content(Some(content.as_str())))
            }
            (NodeKind::Container, PROP_LAYOUT, None) => {
                PropSetter::Container(ContainerProp::Layout(None))
            }
            (NodeKind::Container, PROP_LAYOUT, Some(PropValue::Layout(layout))) => {
                PropSetter::Container(ContainerProp::Layout(Some(*layout)))
            }
            (NodeKind::Text, PROP_FONT_SIZE | PROP_FONT_FAMILY | PROP_CONTENT, Some(_))
            | (NodeKind::Container, PROP_LAYOUT, Some(_)) => return Err(invalid()),
            _ => {
                log::debug!("Ignoring unknown prop `{}` on `{}`", key, kind.as_str());
                return Ok(None);
            }
        };
        Ok(Some(setter))
    }

    pub fn apply(&self, scene: &mut Scene, node: NodeId) -> Result<(), RenderError> {
        match self {
            PropSetter::Text(TextProp::FontSize(size)) => scene.set_font_size(node, *size)?,
            PropSetter::Text(TextProp::FontFamily(family)) => {
                scene.set_font_family(node, *family)?
            }
            PropSetter::Text(TextProp::Content(content)) => {
                scene.set_text_content(node, content.unwrap_or_default())?
            }
            PropSetter::Container(ContainerProp::Layout(layout)) => {
                scene.set_layout(node, *layout)?
            }
        }
        Ok(())
    }
}

/// Apply every prop as an initial attribute of a fresh node
fn apply_initial(
    scene: &mut Scene,
    node: NodeId,
    kind: NodeKind,
    props: &Props,
) -> Result<(), RenderError> {
    for (key, value) in props {
        if let Some(setter) = PropSetter::resolve(kind, key, Some(value))? {
            setter.apply(scene, node)?;
        }
    }
    Ok(())
}

/// Apply only what changed between two prop sets
fn apply_delta(
    scene: &mut Scene,
    node: NodeId,
    kind: NodeKind,
    old: &Props,
    new: &Props,
) -> Result<(), RenderError> {
    for key in old.keys().filter(|key| !new.contains_key(*key)) {
        if let Some(setter) = PropSetter::resolve(kind, key, None)? {
            setter.apply(scene, node)?;
        }
    }
    for (key, value) in new {
        if old.get(key) == Some(value) {
            continue;
        }
        if let Some(setter) = PropSetter::resolve(kind, key, Some(value))? {
            setter.apply(scene, node)?;
        }
    }
    Ok(())
}

/// Apply `tree` to `scene`.
///
/// `prev` is the tree the alternates point into. Place fibers get their node
/// assigned here.
pub fn commit(
    tree: &mut FiberTree,
    prev: Option<&FiberTree>,
    scene: &mut Scene,
) -> Result<EffectCounts, RenderError> {
    let mut counts = EffectCounts::default();

    for &id in tree.deletions() {
        let fiber = tree.get(id);
        let node = fiber
            .node
            .ok_or_else(|| RenderError::MissingNode(fiber.kind.clone()))?;
        scene.destroy(node)?;
        counts.deleted += 1;
    }

    let root = tree.root();
    commit_children(tree, root, prev, scene, &mut counts)?;
    Ok(counts)
}

fn commit_children(
    tree: &mut FiberTree,
    parent: FiberId,
    prev: Option<&FiberTree>,
    scene: &mut Scene,
    counts: &mut EffectCounts,
) -> Result<(), RenderError> {
    let parent_node = {
        let fiber = tree.get(parent);
        fiber
            .node
            .ok_or_else(|| RenderError::MissingNode(fiber.kind.clone()))?
    };

    let children: Vec<FiberId> = tree.children(parent).collect();
    for (index, id) in children.into_iter().enumerate() {
        commit_fiber(tree, id, parent_node, index, prev, scene, counts)?;
        commit_children(tree, id, prev, scene, counts)?;
    }
    Ok(())
}

fn commit_fiber(
    tree: &mut FiberTree,
    id: FiberId,
    parent_node: NodeId,
    index: usize,
    prev: Option<&FiberTree>,
    scene: &mut Scene,
    counts: &mut EffectCounts,
) -> Result<(), RenderError> {
    let fiber = tree.get(id);
    let kind =
        NodeKind::parse(&fiber.kind).ok_or_else(|| RenderError::UnknownKind(fiber.kind.clone()))?;

    let effect = fiber.effect;

    match effect {
        Effect::Place => {
            // Attach first; every created node stays reachable from the root.
            let node = kind.create(scene);
            scene.insert_child(parent_node, index, node)?;
            apply_initial(scene, node, kind, &fiber.props)?;
            tree.get_mut(id).node = Some(node);
            counts.placed += 1;
        }
        Effect::Update => {
            let node = fiber
                .node
                .ok_or_else(|| RenderError::MissingNode(fiber.kind.clone()))?;
            let old = match (prev, fiber.alternate) {
                (Some(prev), Some(alternate)) => &prev.get(alternate).props,
                _ => return Err(RenderError::MissingNode(fiber.kind.clone())),
            };
            apply_delta(scene, node, kind, old, &fiber.props)?;
            counts.updated += 1;
        }
        // Delete fibers live in `deletions` and are never linked.
        Effect::Delete => {}
    }
    Ok(())
}
