//! Error types for the renderer and the scene graph

use thiserror::Error;

use crate::scene::NodeId;

/// Errors raised by scene graph operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// The handle does not refer to a live node.
    #[error("scene node {0} does not exist")]
    NodeNotFound(NodeId),
    /// A child operation was attempted on a text node.
    #[error("scene node {0} is not a container")]
    NotAContainer(NodeId),
    /// A text operation was attempted on a container.
    #[error("scene node {0} is not a text node")]
    NotText(NodeId),
    /// The insertion would make a node its own ancestor.
    #[error("scene node {0} cannot be inserted below itself")]
    Cycle(NodeId),
}

/// Errors raised while reconciling or committing a descriptor tree
#[derive(Debug, Error)]
pub enum RenderError {
    /// The descriptor names a visual primitive the scene cannot realize.
    #[error("unknown component kind `{0}`")]
    UnknownKind(String),
    /// A known prop carries a value of the wrong type.
    #[error("invalid value for prop `{key}` on `{kind}`")]
    InvalidProp { kind: String, key: String },
    /// A fiber that should own a node has none; the fiber tree is corrupt.
    #[error("fiber for `{0}` has no visual node")]
    MissingNode(String),
    /// The scene rejected an operation.
    #[error(transparent)]
    Scene(#[from] SceneError),
    /// The descriptor could not be encoded for hashing.
    #[error("failed to encode component: {0}")]
    Hash(#[from] serde_json::Error),
}
