//! One-shot placement helpers for containers without a layout

use glam::Vec2;

use super::{NodeId, Scene};
use crate::error::SceneError;

/// Horizontal alignment for [`arrange_vertical`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
}

/// Stack children top to bottom with `gap` between them, aligned within the
/// container's current width.
pub fn arrange_vertical(
    scene: &mut Scene,
    container: NodeId,
    align: Align,
    gap: f32,
) -> Result<(), SceneError> {
    let width = scene.width(container)?;
    let children = scene.children(container)?.to_vec();

    let mut y = 0.0;
    for child in children {
        let size = scene.size(child)?;
        let x = match align {
            Align::Left => 0.0,
            Align::Center => width / 2.0 - size.x / 2.0,
        };
        scene.set_position(child, Vec2::new(x, y))?;
        y += size.y + gap;
    }
    Ok(())
}

/// Center a node inside a canvas of the given size
pub fn centerize(scene: &mut Scene, node: NodeId, canvas: Vec2) -> Result<(), SceneError> {
    let size = scene.size(node)?;
    scene.set_position(node, (canvas - size) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centerize() {
        let mut scene = Scene::default();
        let text = scene.create_text();
        scene.set_text_content(text, "Hello").unwrap();
        let size = scene.size(text).unwrap();

        centerize(&mut scene, text, Vec2::new(500.0, 500.0)).unwrap();
        let pos = scene.position(text).unwrap();
        assert!((pos.x - (250.0 - size.x / 2.0)).abs() < 0.001);
        assert!((pos.y - (250.0 - size.y / 2.0)).abs() < 0.001);
    }

    #[test]
    fn test_arrange_vertical_center() {
        let mut scene = Scene::default();
        let container = scene.create_container();
        let wide = scene.create_text();
        let narrow = scene.create_text();
        scene.set_text_content(wide, "wide text").unwrap();
        scene.set_text_content(narrow, "n").unwrap();
        scene.append_child(container, wide).unwrap();
        scene.append_child(container, narrow).unwrap();

        arrange_vertical(&mut scene, container, Align::Center, 8.0).unwrap();

        let wide_size = scene.size(wide).unwrap();
        let narrow_pos = scene.position(narrow).unwrap();
        assert_eq!(narrow_pos.y, wide_size.y + 8.0);
        assert!(narrow_pos.x > 0.0);
        assert_eq!(scene.position(wide).unwrap().x, 0.0);
    }
}
