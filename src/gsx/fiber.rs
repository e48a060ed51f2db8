//! Fiber work tree
//!
//! One pass of reconciliation walks the new descriptor tree alongside the
//! previous pass's fiber tree (the *alternate* tree) and tags each slot with an
//! [`Effect`]. Building a tree never touches the scene; see
//! [`commit`](super::commit) for that.
//!
//! Children are matched by slot index only. A slot whose kind is unchanged is
//! an [`Effect::Update`] that keeps its node; a slot whose kind changed becomes
//! an [`Effect::Place`] fiber plus a separate [`Effect::Delete`] fiber for the
//! stale node. Delete fibers are kept in [`FiberTree::deletions`] and are never
//! linked into a sibling chain, so they cannot become alternates later.

use super::component::{Component, Element, Props};
use crate::scene::NodeId;

/// Kind of the synthetic fiber that owns the renderer's root container
pub const ROOT_KIND: &str = "root";

/// Index of a fiber within its [`FiberTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiberId(usize);

/// What commit must do for a fiber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Create a node and attach it to the parent
    Place,
    /// Patch the existing node with prop deltas
    Update,
    /// Detach and free the alternate's node
    Delete,
}

/// A reconciliation record for one descriptor slot
#[derive(Debug, Clone)]
pub struct Fiber {
    /// Visual node; `None` for a Place fiber until it is committed
    pub node: Option<NodeId>,
    pub kind: String,
    /// New props (always empty for Delete fibers)
    pub props: Props,
    /// Slot index within the parent's descriptor children
    pub slot: usize,
    pub parent: Option<FiberId>,
    pub child: Option<FiberId>,
    pub next: Option<FiberId>,
    /// Matching fiber of the previous pass (index into that tree)
    pub alternate: Option<FiberId>,
    pub effect: Effect,
}

/// Number of fibers per effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectCounts {
    pub placed: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl EffectCounts {
    pub fn is_empty(&self) -> bool {
        self.placed == 0 && self.updated == 0 && self.deleted == 0
    }
}

/// Arena of fibers produced by one pass
#[derive(Debug, Clone)]
pub struct FiberTree {
    fibers: Vec<Fiber>,
    root: FiberId,
    deletions: Vec<FiberId>,
}

impl FiberTree {
    /// Reconcile `component` against the previous pass.
    ///
    /// `root_node` is the container that hosts the rendered tree; it belongs to
    /// the synthetic root fiber and is never placed or deleted.
    pub fn build(root_node: NodeId, component: &Component, prev: Option<&FiberTree>) -> Self {
        let mut tree = Self {
            fibers: Vec::new(),
            root: FiberId(0),
            deletions: Vec::new(),
        };
        let root = tree.push(Fiber {
            node: Some(root_node),
            kind: ROOT_KIND.to_string(),
            props: Props::new(),
            slot: 0,
            parent: None,
            child: None,
            next: None,
            alternate: prev.map(|p| p.root),
            effect: Effect::Update,
        });
        tree.root = root;
        tree.reconcile_children(root, std::slice::from_ref(component), prev);
        tree
    }

    pub fn root(&self) -> FiberId {
        self.root
    }

    pub fn get(&self, id: FiberId) -> &Fiber {
        &self.fibers[id.0]
    }

    pub(super) fn get_mut(&mut self, id: FiberId) -> &mut Fiber {
        &mut self.fibers[id.0]
    }

    /// Delete fibers, in discovery order
    pub fn deletions(&self) -> &[FiberId] {
        &self.deletions
    }

    /// Linked children of a fiber, in slot order
    pub fn children(&self, id: FiberId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).child,
        }
    }

    /// Fibers of the work tree in pre-order, root excluded
    pub fn walk(&self) -> Vec<FiberId> {
        let mut order = Vec::new();
        let mut stack: Vec<FiberId> = self.children(self.root).collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            order.push(id);
            let start = stack.len();
            stack.extend(self.children(id));
            stack[start..].reverse();
        }
        order
    }

    pub fn effects(&self) -> EffectCounts {
        let mut counts = EffectCounts {
            deleted: self.deletions.len(),
            ..EffectCounts::default()
        };
        for id in self.walk() {
            match self.get(id).effect {
                Effect::Place => counts.placed += 1,
                Effect::Update => counts.updated += 1,
                Effect::Delete => counts.deleted += 1,
            }
        }
        counts
    }

    fn push(&mut self, fiber: Fiber) -> FiberId {
        let id = FiberId(self.fibers.len());
        self.fibers.push(fiber);
        id
    }

    fn reconcile_children(
        &mut self,
        parent: FiberId,
        components: &[Component],
        prev: Option<&FiberTree>,
    ) {
        let mut old = match (prev, self.get(parent).alternate) {
            (Some(prev), Some(alternate)) => prev.get(alternate).child,
            _ => None,
        };
        let mut last: Option<FiberId> = None;

        for (slot, component) in components.iter().enumerate() {
            // Lockstep: the alternate at this slot, if the chain has one.
            let alternate = match (prev, old) {
                (Some(prev), Some(id)) if prev.get(id).slot == slot => {
                    old = prev.get(id).next;
                    Some((prev, id))
                }
                _ => None,
            };

            let fiber = match (component, alternate) {
                (Component::Node(element), Some((prev, alt)))
                    if prev.get(alt).kind == element.kind =>
                {
                    self.push(Fiber {
                        node: prev.get(alt).node,
                        kind: element.kind.clone(),
                        props: element.props.clone(),
                        slot,
                        parent: Some(parent),
                        child: None,
                        next: None,
                        alternate: Some(alt),
                        effect: Effect::Update,
                    })
                }
                (Component::Node(element), alternate) => {
                    if let Some((prev, alt)) = alternate {
                        self.push_deletion(parent, prev, alt);
                    }
                    self.push(placement(element, slot, parent))
                }
                (Component::None, Some((prev, alt))) => {
                    self.push_deletion(parent, prev, alt);
                    continue;
                }
                (Component::None, None) => continue,
            };

            match last {
                None => self.get_mut(parent).child = Some(fiber),
                Some(previous) => self.get_mut(previous).next = Some(fiber),
            }
            last = Some(fiber);

            let children = component.children();
            // A placed fiber has no alternate, so its whole subtree is placed.
            let child_prev = match self.get(fiber).effect {
                Effect::Update => prev,
                _ => None,
            };
            self.reconcile_children(fiber, children, child_prev);
        }

        // Alternates past the end of the new list are stale.
        if let Some(prev) = prev {
            while let Some(id) = old {
                self.push_deletion(parent, prev, id);
                old = prev.get(id).next;
            }
        }
    }

    fn push_deletion(&mut self, parent: FiberId, prev: &FiberTree, alternate: FiberId) {
        let stale = prev.get(alternate);
        let id = self.push(Fiber {
            node: stale.node,
            kind: stale.kind.clone(),
            props: Props::new(),
            slot: stale.slot,
            parent: Some(parent),
            child: None,
            next: None,
            alternate: Some(alternate),
            effect: Effect::Delete,
        });
        self.deletions.push(id);
    }
}

fn placement(element: &Element, slot: usize, parent: FiberId) -> Fiber {
    Fiber {
        node: None,
        kind: element.kind.clone(),
        props: element.props.clone(),
        slot,
        parent: Some(parent),
        child: None,
        next: None,
        alternate: None,
        effect: Effect::Place,
    }
}

/// Iterator over a fiber's linked children
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a FiberTree,
    next: Option<FiberId>,
}

impl Iterator for Children<'_> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        let id = self.next?;
        self.next = self.tree.get(id).next;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gsx::component::{ContainerProps, TextProps, container, text};
    use crate::scene::{Layout, Scene};

    fn root() -> NodeId {
        Scene::default().create_container()
    }

    fn list(items: &[&str]) -> Component {
        container(ContainerProps {
            layout: Layout::column(0.0),
            children: items.iter().map(|s| text(TextProps::new(*s))).collect(),
        })
    }

    /// Pretend every placed fiber got a node, as commit would
    fn fake_commit(tree: &mut FiberTree, scene: &mut Scene) {
        for id in tree.walk() {
            if tree.get(id).node.is_none() {
                tree.get_mut(id).node = Some(scene.create_text());
            }
        }
    }

    #[test]
    fn test_first_pass_places_everything() {
        let tree = FiberTree::build(root(), &list(&["a", "b"]), None);
        assert_eq!(
            tree.effects(),
            EffectCounts {
                placed: 3,
                updated: 0,
                deleted: 0
            }
        );
        assert!(tree.walk().iter().all(|id| tree.get(*id).node.is_none()));
    }

    #[test]
    fn test_same_kind_updates_and_keeps_node() {
        let mut scene = Scene::default();
        let root = scene.create_container();
        let mut first = FiberTree::build(root, &list(&["a"]), None);
        fake_commit(&mut first, &mut scene);

        let second = FiberTree::build(root, &list(&["b"]), Some(&first));
        let counts = second.effects();
        assert_eq!(counts.updated, 2);
        assert_eq!(counts.placed + counts.deleted, 0);

        let old_nodes: Vec<_> = first.walk().iter().map(|id| first.get(*id).node).collect();
        let new_nodes: Vec<_> = second.walk().iter().map(|id| second.get(*id).node).collect();
        assert_eq!(old_nodes, new_nodes);
    }

    #[test]
    fn test_kind_change_places_and_deletes() {
        let mut scene = Scene::default();
        let root = scene.create_container();
        let mut first = FiberTree::build(root, &text(TextProps::new("a")), None);
        fake_commit(&mut first, &mut scene);

        let second = FiberTree::build(root, &list(&[]), Some(&first));
        assert_eq!(
            second.effects(),
            EffectCounts {
                placed: 1,
                updated: 0,
                deleted: 1
            }
        );
        let deleted = second.get(second.deletions()[0]);
        assert_eq!(deleted.kind, "text");
        assert!(deleted.props.is_empty());
        assert!(deleted.node.is_some());
    }

    #[test]
    fn test_trailing_entries() {
        let mut scene = Scene::default();
        let root = scene.create_container();
        let mut three = FiberTree::build(root, &list(&["a", "b", "c"]), None);
        fake_commit(&mut three, &mut scene);

        let one = FiberTree::build(root, &list(&["a"]), Some(&three));
        assert_eq!(one.effects().deleted, 2);
        let slots: Vec<_> = one.deletions().iter().map(|id| one.get(*id).slot).collect();
        assert_eq!(slots, vec![1, 2]);

        let mut one_committed = FiberTree::build(root, &list(&["a"]), None);
        fake_commit(&mut one_committed, &mut scene);
        let grown = FiberTree::build(root, &list(&["a", "b", "c"]), Some(&one_committed));
        let counts = grown.effects();
        assert_eq!(counts.placed, 2);
        assert_eq!(counts.updated, 2);
        assert_eq!(counts.deleted, 0);
    }

    #[test]
    fn test_none_slot_keeps_positions() {
        let mut scene = Scene::default();
        let root = scene.create_container();
        let with_hole = || {
            container(ContainerProps {
                layout: Layout::row(0.0),
                children: vec![
                    text(TextProps::new("a")),
                    Component::None,
                    text(TextProps::new("b")),
                ],
            })
        };
        let mut first = FiberTree::build(root, &with_hole(), None);
        fake_commit(&mut first, &mut scene);

        let second = FiberTree::build(root, &with_hole(), Some(&first));
        let counts = second.effects();
        assert_eq!(counts.updated, 3);
        assert_eq!(counts.placed + counts.deleted, 0);
    }

    #[test]
    fn test_none_over_existing_deletes() {
        let mut scene = Scene::default();
        let root = scene.create_container();
        let mut first = FiberTree::build(root, &list(&["a", "b"]), None);
        fake_commit(&mut first, &mut scene);

        let second = FiberTree::build(
            root,
            &container(ContainerProps {
                layout: Layout::column(0.0),
                children: vec![Component::None, text(TextProps::new("b"))],
            }),
            Some(&first),
        );
        let counts = second.effects();
        assert_eq!(counts.deleted, 1);
        assert_eq!(counts.updated, 2);
        assert_eq!(second.get(second.deletions()[0]).slot, 0);
    }

    #[test]
    fn test_walk_is_preorder() {
        let nested = container(ContainerProps {
            layout: Layout::column(0.0),
            children: vec![list(&["a", "b"]), text(TextProps::new("c"))],
        });
        let tree = FiberTree::build(root(), &nested, None);
        let kinds: Vec<_> = tree
            .walk()
            .iter()
            .map(|id| tree.get(*id).kind.clone())
            .collect();
        assert_eq!(
            kinds,
            vec!["container", "container", "text", "text", "text"]
        );
    }
}
