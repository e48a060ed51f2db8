//! GSX: declarative scene rendering
//!
//! A pass goes descriptor tree → [`FiberTree::build`] → [`commit`] → scene.
//! [`Renderer`] wraps the pass and skips it when the tree did not change.

pub mod commit;
pub mod component;
pub mod fiber;
pub mod renderer;

pub use commit::{NodeKind, PropSetter, commit};
pub use component::{
    Component, ContainerProps, Element, PropValue, Props, TextProps, container, text,
};
pub use fiber::{Effect, EffectCounts, Fiber, FiberId, FiberTree};
pub use renderer::Renderer;
pub use crate::scene::{Layout, LayoutKind};
