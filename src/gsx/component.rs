//! Declarative component descriptors
//!
//! Descriptors are plain values rebuilt by the caller every frame. They carry
//! no identity: the reconciler matches children by their index in the parent's
//! children list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scene::Layout;

pub const KIND_TEXT: &str = "text";
pub const KIND_CONTAINER: &str = "container";

pub const PROP_FONT_SIZE: &str = "fontSize";
pub const PROP_FONT_FAMILY: &str = "fontFamily";
pub const PROP_CONTENT: &str = "content";
pub const PROP_LAYOUT: &str = "layout";

/// A single prop value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Layout(Layout),
}

/// Props keyed by name; ordered so the encoding used for hashing is canonical
pub type Props = BTreeMap<String, PropValue>;

/// A realized descriptor node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub kind: String,
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub children: Vec<Component>,
}

impl Element {
    pub fn new(kind: impl Into<String>, props: Props, children: Vec<Component>) -> Self {
        Self {
            kind: kind.into(),
            props,
            children,
        }
    }
}

/// A descriptor: either nothing or a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Component {
    #[default]
    None,
    Node(Element),
}

impl Component {
    pub fn element(&self) -> Option<&Element> {
        match self {
            Component::None => None,
            Component::Node(element) => Some(element),
        }
    }

    pub fn kind(&self) -> Option<&str> {
        self.element().map(|e| e.kind.as_str())
    }

    pub fn children(&self) -> &[Component] {
        match self {
            Component::None => &[],
            Component::Node(element) => &element.children,
        }
    }

    /// BLAKE3 digest of the canonical JSON encoding.
    ///
    /// Structurally equal trees hash equal.
    pub fn structural_hash(&self) -> Result<blake3::Hash, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        Ok(blake3::hash(&bytes))
    }

    /// Parse a descriptor tree from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<Element> for Component {
    fn from(element: Element) -> Self {
        Component::Node(element)
    }
}

/// Props of a text descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub content: String,
}

impl TextProps {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }
}

/// Props of a container descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerProps {
    pub layout: Layout,
    pub children: Vec<Component>,
}

/// Text descriptor
pub fn text(props: TextProps) -> Component {
    let mut map = Props::new();
    if let Some(size) = props.font_size {
        map.insert(PROP_FONT_SIZE.to_string(), PropValue::Number(size));
    }
    if let Some(family) = props.font_family {
        map.insert(PROP_FONT_FAMILY.to_string(), PropValue::Text(family));
    }
    map.insert(PROP_CONTENT.to_string(), PropValue::Text(props.content));
    Element::new(KIND_TEXT, map, Vec::new()).into()
}

/// Layout container descriptor
pub fn container(props: ContainerProps) -> Component {
    let mut map = Props::new();
    map.insert(PROP_LAYOUT.to_string(), PropValue::Layout(props.layout));
    Element::new(KIND_CONTAINER, map, props.children).into()
}
