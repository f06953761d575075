//! Node and edge storage for the active session.

use crate::models::{AircraftType, Edge, Node};

/// Edge set together with the aircraft type that produced it.
#[derive(Debug, Clone, PartialEq)]
struct EdgeSet {
    aircraft: AircraftType,
    edges: Vec<Edge>,
}

/// Holds the node set from the last nearby query and the edge set of the
/// last completed router initialization.
#[derive(Debug, Clone, Default)]
pub struct GraphCache {
    nodes: Option<Vec<Node>>,
    edges: Option<EdgeSet>,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the node set. The edge set is dropped because it refers to
    /// the previous nodes.
    pub fn replace_nodes(&mut self, nodes: Vec<Node>) {
        self.nodes = Some(nodes);
        self.edges = None;
    }

    pub fn replace_edges(&mut self, aircraft: AircraftType, edges: Vec<Edge>) {
        self.edges = Some(EdgeSet { aircraft, edges });
    }

    /// `None` until the first nearby query succeeds.
    pub fn current_nodes(&self) -> Option<&[Node]> {
        self.nodes.as_deref()
    }

    pub fn has_nodes(&self) -> bool {
        self.nodes.is_some()
    }

    /// Edges for `aircraft`, or an empty slice when the cached set was
    /// produced for a different type.
    pub fn current_edges(&self, aircraft: AircraftType) -> &[Edge] {
        match &self.edges {
            Some(set) if set.aircraft == aircraft => &set.edges,
            _ => &[],
        }
    }

    pub fn find_node(&self, uid: &str) -> Option<&Node> {
        self.nodes.as_ref()?.iter().find(|node| node.uid == uid)
    }
}
