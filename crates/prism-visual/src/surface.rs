//! Render surface - the host side of the view
//!
//! The host owns the actual rendering (a DOM, a canvas, a terminal). PRISM
//! only ever creates div-like nodes under a root container, writes inline
//! style properties and sets a hover label. Nodes are never removed.

use std::collections::BTreeMap;
use std::fmt;

use prism_core::{PrismError, PrismResult};

use crate::{StyleProperty, StyleWrite};

/// Handle to a node owned by a render surface
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeHandle(pub u32);

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Host rendering surface
pub trait RenderSurface {
    /// Root container that entity nodes are appended to
    fn root(&self) -> NodeHandle;

    /// Create a detached node carrying a category class
    fn create_node(&mut self, class: &str) -> NodeHandle;

    fn append_child(&mut self, parent: NodeHandle, child: NodeHandle) -> PrismResult<()>;

    /// Set (`Some`) or unset (`None`) an inline style property
    fn set_style(
        &mut self,
        node: NodeHandle,
        property: StyleProperty,
        value: Option<&str>,
    ) -> PrismResult<()>;

    /// Set the hover label
    fn set_title(&mut self, node: NodeHandle, title: &str) -> PrismResult<()>;

    fn apply(&mut self, write: &StyleWrite) -> PrismResult<()> {
        self.set_style(write.node, write.property, write.value.as_deref())
    }
}

/// Retained node in a [`MemorySurface`]
#[derive(Debug, Clone, Default)]
pub struct MemoryNode {
    pub class: String,
    pub parent: Option<NodeHandle>,
    pub children: Vec<NodeHandle>,
    pub styles: BTreeMap<StyleProperty, String>,
    pub title: String,
}

/// In-process retained render surface.
///
/// Used headless and in tests; `to_html` renders a snapshot of the tree.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    nodes: Vec<MemoryNode>,
}

impl MemorySurface {
    pub fn new(root_class: &str) -> Self {
        MemorySurface {
            nodes: vec![MemoryNode {
                class: root_class.to_string(),
                ..MemoryNode::default()
            }],
        }
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&MemoryNode> {
        self.nodes.get(handle.0 as usize)
    }

    fn node_mut(&mut self, handle: NodeHandle) -> PrismResult<&mut MemoryNode> {
        self.nodes
            .get_mut(handle.0 as usize)
            .ok_or(PrismError::UnknownNode(handle.0))
    }

    pub fn style(&self, handle: NodeHandle, property: StyleProperty) -> Option<&str> {
        self.node(handle)
            .and_then(|n| n.styles.get(&property))
            .map(String::as_str)
    }

    pub fn title(&self, handle: NodeHandle) -> Option<&str> {
        self.node(handle).map(|n| n.title.as_str())
    }

    /// Total nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Children of the root, in append order
    pub fn entity_nodes(&self) -> &[NodeHandle] {
        &self.nodes[0].children
    }

    /// HTML snapshot of the root subtree
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(self.root(), &mut out);
        out
    }

    fn write_html(&self, handle: NodeHandle, out: &mut String) {
        let Some(node) = self.node(handle) else {
            return;
        };

        out.push_str("<div class=\"");
        out.push_str(&escape_attr(&node.class));
        out.push('"');

        if !node.styles.is_empty() {
            let style = node
                .styles
                .iter()
                .map(|(p, v)| format!("{}: {}", p.css_name(), v))
                .collect::<Vec<_>>()
                .join("; ");
            out.push_str(" style=\"");
            out.push_str(&escape_attr(&style));
            out.push('"');
        }

        if !node.title.is_empty() {
            out.push_str(" title=\"");
            out.push_str(&escape_attr(&node.title));
            out.push('"');
        }

        out.push('>');
        for child in &node.children {
            self.write_html(*child, out);
        }
        out.push_str("</div>");
    }
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new("root")
    }
}

impl RenderSurface for MemorySurface {
    fn root(&self) -> NodeHandle {
        NodeHandle(0)
    }

    fn create_node(&mut self, class: &str) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len() as u32);
        self.nodes.push(MemoryNode {
            class: class.to_string(),
            ..MemoryNode::default()
        });
        handle
    }

    fn append_child(&mut self, parent: NodeHandle, child: NodeHandle) -> PrismResult<()> {
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    fn set_style(
        &mut self,
        node: NodeHandle,
        property: StyleProperty,
        value: Option<&str>,
    ) -> PrismResult<()> {
        let node = self.node_mut(node)?;
        match value {
            Some(v) => {
                node.styles.insert(property, v.to_string());
            }
            None => {
                node.styles.remove(&property);
            }
        }
        Ok(())
    }

    fn set_title(&mut self, node: NodeHandle, title: &str) -> PrismResult<()> {
        self.node_mut(node)?.title = title.to_string();
        Ok(())
    }
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
