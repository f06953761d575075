//! Response decoding and validation.
//!
//! Bodies are parsed into the planner records and checked before they
//! reach the session. Anything that does not fit is reported as a
//! `BackendRejection` carrying the HTTP status it arrived with.

use std::collections::HashSet;

use planner_core::{Edge, Location, Node, RemoteError, Route};
use serde::de::DeserializeOwned;

fn malformed(status: u16, detail: impl std::fmt::Display) -> RemoteError {
    RemoteError::BackendRejection {
        status,
        message: format!("malformed response: {}", detail),
    }
}

fn parse<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, RemoteError> {
    serde_json::from_slice(body).map_err(|e| malformed(status, e))
}

fn check_node(status: u16, node: &Node) -> Result<(), RemoteError> {
    if node.uid.trim().is_empty() {
        return Err(malformed(status, "node with blank uid"));
    }
    node.location
        .validate()
        .map_err(|e| malformed(status, format!("node {}: {}", node.uid, e)))
}

pub fn decode_nodes(status: u16, body: &[u8]) -> Result<Vec<Node>, RemoteError> {
    let nodes: Vec<Node> = parse(status, body)?;
    let mut seen = HashSet::new();
    for node in &nodes {
        check_node(status, node)?;
        if !seen.insert(node.uid.as_str()) {
            return Err(malformed(status, format!("duplicate node uid {}", node.uid)));
        }
    }
    Ok(nodes)
}

pub fn decode_edges(status: u16, body: &[u8]) -> Result<Vec<Edge>, RemoteError> {
    let edges: Vec<Edge> = parse(status, body)?;
    for edge in &edges {
        check_node(status, &edge.from)?;
        check_node(status, &edge.to)?;
    }
    Ok(edges)
}

/// `null` is read as "no route" and yields an empty path.
pub fn decode_route(status: u16, body: &[u8]) -> Result<Route, RemoteError> {
    let route: Option<Vec<Location>> = parse(status, body)?;
    let route = route.unwrap_or_default();
    for (index, point) in route.iter().enumerate() {
        point
            .validate()
            .map_err(|e| malformed(status, format!("route point {}: {}", index, e)))?;
    }
    Ok(route)
}

pub fn decode_flag(status: u16, body: &[u8]) -> Result<bool, RemoteError> {
    parse(status, body)
}
