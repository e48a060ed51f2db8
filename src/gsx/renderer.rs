//! Renderer façade
//!
//! Owns the root container and the fiber tree of the last pass. Call
//! [`Renderer::display`] once per frame with a freshly built descriptor tree;
//! it skips all work when the tree hashes the same as last time.

use super::commit::commit;
use super::component::Component;
use super::fiber::{EffectCounts, FiberTree};
use crate::error::RenderError;
use crate::scene::{NodeId, Scene};

/// Whether the renderer has a previous tree to diff against
#[derive(Debug, Default)]
enum RenderState {
    /// Nothing rendered yet (or the last pass failed)
    #[default]
    Fresh,
    Mounted {
        prev: FiberTree,
        hash: Option<blake3::Hash>,
    },
}

/// Retained-mode renderer for [`Component`] trees
#[derive(Debug)]
pub struct Renderer {
    root: NodeId,
    state: RenderState,
    passes: u64,
}

impl Renderer {
    /// Create the renderer and its root container in `scene`
    pub fn new(scene: &mut Scene) -> Self {
        Self {
            root: scene.create_container(),
            state: RenderState::Fresh,
            passes: 0,
        }
    }

    /// The container the rendered tree is mounted in
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// True once a pass has been committed
    pub fn is_mounted(&self) -> bool {
        matches!(self.state, RenderState::Mounted { .. })
    }

    /// Number of committed passes
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Forget the cached hash so the next `display` re-renders
    pub fn invalidate(&mut self) {
        if let RenderState::Mounted { hash, .. } = &mut self.state {
            *hash = None;
        }
    }

    /// Reconcile and commit unconditionally
    pub fn render(
        &mut self,
        scene: &mut Scene,
        component: &Component,
    ) -> Result<EffectCounts, RenderError> {
        self.reconcile(scene, component, None)
    }

    /// Reconcile and commit only if `component` differs from the last displayed tree.
    ///
    /// Returns whether a pass ran.
    pub fn display(&mut self, scene: &mut Scene, component: &Component) -> Result<bool, RenderError> {
        let hash = component.structural_hash()?;
        if let RenderState::Mounted {
            hash: Some(cached), ..
        } = &self.state
        {
            if *cached == hash {
                return Ok(false);
            }
        }

        self.reconcile(scene, component, Some(hash))?;
        Ok(true)
    }

    fn reconcile(
        &mut self,
        scene: &mut Scene,
        component: &Component,
        hash: Option<blake3::Hash>,
    ) -> Result<EffectCounts, RenderError> {
        let prev = match std::mem::take(&mut self.state) {
            RenderState::Fresh => None,
            RenderState::Mounted { prev, .. } => Some(prev),
        };

        let mut tree = FiberTree::build(self.root, component, prev.as_ref());
        match commit(&mut tree, prev.as_ref(), scene) {
            Ok(counts) => {
                self.passes += 1;
                log::debug!(
                    "Pass {}: {} placed, {} updated, {} deleted",
                    self.passes,
                    counts.placed,
                    counts.updated,
                    counts.deleted
                );
                self.state = RenderState::Mounted { prev: tree, hash };
                Ok(counts)
            }
            Err(e) => {
                log::error!("Render pass failed: {}", e);
                if let Err(unmount_err) = self.unmount(scene) {
                    log::error!("Failed to unmount after error: {}", unmount_err);
                }
                Err(e)
            }
        }
    }

    /// Drop everything under the root; the next pass places from scratch
    fn unmount(&mut self, scene: &mut Scene) -> Result<(), RenderError> {
        let children = scene.children(self.root)?.to_vec();
        for child in children {
            scene.destroy(child)?;
        }
        self.state = RenderState::Fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gsx::component::{ContainerProps, Element, Props, TextProps, container, text};
    use crate::scene::Layout;
    use proptest::prelude::*;

    fn list(items: &[&str]) -> Component {
        container(ContainerProps {
            layout: Layout::column(4.0),
            children: items.iter().map(|s| text(TextProps::new(*s))).collect(),
        })
    }

    fn contents(scene: &Scene, container: NodeId) -> Vec<String> {
        scene
            .children(container)
            .unwrap()
            .iter()
            .map(|id| scene.text(*id).unwrap().content.clone())
            .collect()
    }

    fn mounted(scene: &Scene, renderer: &Renderer) -> NodeId {
        let children = scene.children(renderer.root()).unwrap();
        assert_eq!(children.len(), 1);
        children[0]
    }

    #[test]
    fn test_display_is_idempotent() {
        let mut scene = Scene::default();
        let mut renderer = Renderer::new(&mut scene);
        let tree = list(&["a", "b"]);

        assert!(renderer.display(&mut scene, &tree).unwrap());
        let after_first = scene.stats();
        assert!(after_first.mutations() > 0);

        assert!(!renderer.display(&mut scene, &list(&["a", "b"])).unwrap());
        assert_eq!(scene.stats(), after_first);
        assert_eq!(renderer.passes(), 1);
    }

    #[test]
    fn test_same_kind_reuses_node() {
        let mut scene = Scene::default();
        let mut renderer = Renderer::new(&mut scene);

        renderer.display(&mut scene, &list(&["A"])).unwrap();
        let outer = mounted(&scene, &renderer);
        let node = scene.children(outer).unwrap()[0];

        renderer.display(&mut scene, &list(&["B"])).unwrap();
        assert_eq!(mounted(&scene, &renderer), outer);
        assert_eq!(scene.children(outer).unwrap(), &[node]);
        assert_eq!(scene.text(node).unwrap().content, "B");
    }

    #[test]
    fn test_type_change_replaces_node() {
        let mut scene = Scene::default();
        let mut renderer = Renderer::new(&mut scene);

        renderer.display(&mut scene, &text(TextProps::new("A"))).unwrap();
        let old = mounted(&scene, &renderer);

        let counts = renderer
            .render(
                &mut scene,
                &container(ContainerProps {
                    layout: Layout::row(0.0),
                    children: vec![],
                }),
            )
            .unwrap();
        assert_eq!(counts.placed, 1);
        assert_eq!(counts.deleted, 1);

        let new = mounted(&scene, &renderer);
        assert_ne!(old, new);
        assert!(!scene.contains(old));
        assert!(scene.children(new).unwrap().is_empty());
    }

    #[test]
    fn test_trailing_deletion() {
        let mut scene = Scene::default();
        let mut renderer = Renderer::new(&mut scene);

        renderer.display(&mut scene, &list(&["a", "b", "c"])).unwrap();
        let outer = mounted(&scene, &renderer);
        let first = scene.children(outer).unwrap()[0];
        let before = scene.stats();

        let counts = renderer.render(&mut scene, &list(&["a"])).unwrap();
        assert_eq!(counts.deleted, 2);
        assert_eq!(counts.placed, 0);

        let after = scene.stats();
        assert_eq!(after.nodes_destroyed - before.nodes_destroyed, 2);
        assert_eq!(after.content_writes, before.content_writes);
        assert_eq!(after.style_writes, before.style_writes);
        assert_eq!(scene.children(outer).unwrap(), &[first]);
    }

    #[test]
    fn test_trailing_addition() {
        let mut scene = Scene::default();
        let mut renderer = Renderer::new(&mut scene);

        renderer.display(&mut scene, &list(&["a"])).unwrap();
        let outer = mounted(&scene, &renderer);
        let first = scene.children(outer).unwrap()[0];
        let before = scene.stats();

        let counts = renderer.render(&mut scene, &list(&["a", "b", "c"])).unwrap();
        assert_eq!(counts.placed, 2);
        assert_eq!(counts.deleted, 0);

        let after = scene.stats();
        assert_eq!(after.nodes_created - before.nodes_created, 2);
        // Only the two new nodes had their content written.
        assert_eq!(after.content_writes - before.content_writes, 2);
        assert_eq!(scene.children(outer).unwrap()[0], first);
        assert_eq!(contents(&scene, outer), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_font_size_change_skips_content_write() {
        let mut scene = Scene::default();
        let mut renderer = Renderer::new(&mut scene);

        renderer
            .display(&mut scene, &text(TextProps::new("Hello").font_size(16.0)))
            .unwrap();
        let node = mounted(&scene, &renderer);
        assert_eq!(scene.stats().content_writes, 1);

        renderer
            .display(&mut scene, &text(TextProps::new("Hello").font_size(18.0)))
            .unwrap();
        assert_eq!(mounted(&scene, &renderer), node);
        assert_eq!(scene.text(node).unwrap().font_size, 18.0);
        assert_eq!(scene.stats().content_writes, 1);
        assert_eq!(scene.stats().style_writes, 2);
    }

    #[test]
    fn test_unknown_kind_unmounts() {
        let mut scene = Scene::default();
        let mut renderer = Renderer::new(&mut scene);
        renderer.display(&mut scene, &list(&["a"])).unwrap();

        let bogus = container(ContainerProps {
            layout: Layout::row(0.0),
            children: vec![Element::new("sprite", Props::new(), vec![]).into()],
        });
        let err = renderer.display(&mut scene, &bogus).unwrap_err();
        assert!(matches!(err, RenderError::UnknownKind(_)));
        assert!(!renderer.is_mounted());
        assert!(scene.children(renderer.root()).unwrap().is_empty());
        assert_eq!(scene.len(), 1);

        // Recovery is a fresh placement.
        let counts = renderer.render(&mut scene, &list(&["a"])).unwrap();
        assert_eq!(counts.placed, 2);
    }

    #[test]
    fn test_failed_unmount_keeps_pass_error() {
        let mut scene = Scene::default();
        let mut renderer = Renderer::new(&mut scene);
        // Root gone, so cleanup after the failed pass fails too
        scene.destroy(renderer.root()).unwrap();

        let bogus: Component = Element::new("sprite", Props::new(), vec![]).into();
        let err = renderer.render(&mut scene, &bogus).unwrap_err();
        assert!(matches!(err, RenderError::UnknownKind(kind) if kind == "sprite"));
        assert!(!renderer.is_mounted());
    }

    #[test]
    fn test_invalidate_forces_pass() {
        let mut scene = Scene::default();
        let mut renderer = Renderer::new(&mut scene);
        let tree = list(&["a"]);
        renderer.display(&mut scene, &tree).unwrap();
        renderer.invalidate();
        let before = scene.stats();
        assert!(renderer.display(&mut scene, &tree).unwrap());
        // The pass ran but found nothing to change.
        assert_eq!(scene.stats(), before);
    }

    #[test]
    fn test_none_clears_root() {
        let mut scene = Scene::default();
        let mut renderer = Renderer::new(&mut scene);
        renderer.display(&mut scene, &list(&["a", "b"])).unwrap();
        renderer.display(&mut scene, &Component::None).unwrap();
        assert!(scene.children(renderer.root()).unwrap().is_empty());
        assert_eq!(scene.len(), 1);
    }

    fn arb_component() -> impl Strategy<Value = Component> {
        let leaf = prop_oneof![
            Just(Component::None),
            ("[a-z]{0,6}", proptest::option::of(8u8..40))
                .prop_map(|(content, size)| {
                    let props = TextProps::new(content);
                    text(match size {
                        Some(size) => props.font_size(f64::from(size)),
                        None => props,
                    })
                }),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            (prop::collection::vec(inner, 0..4), any::<bool>(), 0u8..8).prop_map(
                |(children, row, gap)| {
                    let gap = f32::from(gap);
                    container(ContainerProps {
                        layout: if row {
                            Layout::row(gap)
                        } else {
                            Layout::column(gap)
                        },
                        children,
                    })
                },
            )
        })
    }

    /// Text contents of the rendered scene in pre-order
    fn scene_texts(scene: &Scene, node: NodeId, out: &mut Vec<String>) {
        if let Ok(text) = scene.text(node) {
            out.push(text.content.clone());
        } else if let Ok(children) = scene.children(node) {
            for child in children {
                scene_texts(scene, *child, out);
            }
        }
    }

    fn descriptor_texts(component: &Component, out: &mut Vec<String>) {
        if let Some(element) = component.element() {
            if let Some(crate::gsx::component::PropValue::Text(content)) =
                element.props.get(crate::gsx::component::PROP_CONTENT)
            {
                out.push(content.clone());
            }
            for child in &element.children {
                descriptor_texts(child, out);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_second_display_is_a_no_op(tree in arb_component()) {
            let mut scene = Scene::default();
            let mut renderer = Renderer::new(&mut scene);
            renderer.display(&mut scene, &tree).unwrap();
            let stats = scene.stats();
            prop_assert!(!renderer.display(&mut scene, &tree.clone()).unwrap());
            prop_assert_eq!(scene.stats(), stats);
        }

        #[test]
        fn prop_rerender_matches_descriptor(first in arb_component(), second in arb_component()) {
            let mut scene = Scene::default();
            let mut renderer = Renderer::new(&mut scene);
            renderer.display(&mut scene, &first).unwrap();
            renderer.display(&mut scene, &second).unwrap();

            let mut rendered = Vec::new();
            scene_texts(&scene, renderer.root(), &mut rendered);
            let mut expected = Vec::new();
            descriptor_texts(&second, &mut expected);
            prop_assert_eq!(rendered, expected);
        }

        #[test]
        fn prop_no_orphaned_nodes(first in arb_component(), second in arb_component()) {
            let mut fresh_scene = Scene::default();
            let mut fresh = Renderer::new(&mut fresh_scene);
            fresh.display(&mut fresh_scene, &second).unwrap();

            let mut scene = Scene::default();
            let mut renderer = Renderer::new(&mut scene);
            renderer.display(&mut scene, &first).unwrap();
            renderer.display(&mut scene, &second).unwrap();
            prop_assert_eq!(scene.len(), fresh_scene.len());
        }
    }
}
