//! Read-only facade over the precomputed condensation (C2): nodes,
//! components, and the component-DAG adjacency. Nothing here mutates after
//! construction — the condensation is immutable for the life of the engine.

use crate::types::{Component, ComponentId, Node, NodeId};

pub struct Condensation {
    nodes: Vec<Node>,
    components: Vec<Component>,
    children: Vec<Vec<ComponentId>>,
}

impl Condensation {
    /// Assemble a condensation from already-validated parts. Used by the
    /// loader (C0) and by tests that build small graphs by hand.
    pub fn from_parts(
        nodes: Vec<Node>,
        mut components: Vec<Component>,
        children: Vec<Vec<ComponentId>>,
    ) -> Self {
        debug_assert_eq!(components.len(), children.len());
        for (cid, comp) in components.iter_mut().enumerate() {
            comp.members.clear();
            comp.id = ComponentId(cid as u32);
        }
        for (nid, node) in nodes.iter().enumerate() {
            components[node.cid.index()]
                .members
                .push(NodeId(nid as u32));
        }
        Condensation {
            nodes,
            components,
            children,
        }
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn component(&self, id: ComponentId) -> &Component {
        &self.components[id.index()]
    }

    #[inline]
    pub fn children(&self, id: ComponentId) -> &[ComponentId] {
        &self.children[id.index()]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }
}
