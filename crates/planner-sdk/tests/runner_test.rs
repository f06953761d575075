//! Session runner tests against a scripted backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use planner_core::{
    AircraftType, Edge, IntentError, Location, NearbyQuery, Node, OperationStatus, RemoteError,
    Route, RouteQuery, SessionConfig, SessionView,
};
use planner_sdk::{spawn_session, RouterBackend, SessionError, SessionHandle};
use tokio::sync::Semaphore;

/// Backend that answers from fixed data and records every call.
struct ScriptedBackend {
    nodes: Result<Vec<Node>, RemoteError>,
    /// Each initialize waits for one permit.
    init_gate: Arc<Semaphore>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedBackend {
    fn new(nodes: Result<Vec<Node>, RemoteError>, init_permits: usize) -> Self {
        Self {
            nodes,
            init_gate: Arc::new(Semaphore::new(init_permits)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl RouterBackend for ScriptedBackend {
    async fn initialize_router(&self, aircraft: AircraftType) -> Result<(), RemoteError> {
        self.record(format!("init:{}", aircraft));
        let permit = self
            .init_gate
            .acquire()
            .await
            .map_err(|e| RemoteError::NetworkFailure(e.to_string()))?;
        permit.forget();
        Ok(())
    }

    async fn get_edges(&self, aircraft: AircraftType) -> Result<Vec<Edge>, RemoteError> {
        self.record(format!("edges:{}", aircraft));
        let nodes = self.nodes.clone()?;
        Ok(nodes
            .windows(2)
            .map(|pair| Edge {
                from: pair[0].clone(),
                to: pair[1].clone(),
                cost: None,
            })
            .collect())
    }

    async fn get_nearby_nodes(&self, query: &NearbyQuery) -> Result<Vec<Node>, RemoteError> {
        self.record(format!("nearby:{}", query.capacity));
        self.nodes.clone()
    }

    async fn get_route(&self, query: &RouteQuery) -> Result<Route, RemoteError> {
        self.record(format!("route:{}:{}->{}", query.aircraft, query.from.uid, query.to.uid));
        Ok(vec![query.from.location, query.to.location])
    }
}

fn nodes() -> Vec<Node> {
    vec![
        Node::new("A", Location::new(0.0, 0.0, 0.0)),
        Node::new("B", Location::new(1.0, 1.0, 0.0)),
        Node::new("C", Location::new(2.0, 2.0, 0.0)),
    ]
}

fn origin() -> Location {
    Location::new(37.7749, -122.4194, 0.0)
}

async fn wait(
    handle: &SessionHandle,
    ready: impl FnMut(&SessionView) -> bool,
) -> SessionView {
    tokio::time::timeout(Duration::from_secs(5), handle.wait_for(ready))
        .await
        .expect("timed out waiting for view")
        .expect("runner stopped")
}

#[tokio::test]
async fn plans_a_route_end_to_end() {
    let backend = ScriptedBackend::new(Ok(nodes()), 10);
    let calls = backend.calls.clone();
    let (handle, _task) = spawn_session(backend, SessionConfig::default());

    handle.request_nearby_nodes(origin(), 500.0, 3).await.unwrap();
    let view = wait(&handle, |v| v.router_ready).await;
    assert_eq!(view.nodes.as_ref().map(Vec::len), Some(3));
    assert_eq!(view.edges.len(), 2);

    handle.click_node("A").await.unwrap();
    handle.click_node("C").await.unwrap();
    handle.request_route().await.unwrap();

    let view = wait(&handle, |v| v.route.is_some()).await;
    assert_eq!(
        view.route.unwrap(),
        vec![Location::new(0.0, 0.0, 0.0), Location::new(2.0, 2.0, 0.0)]
    );
    assert_eq!(view.route_status, OperationStatus::Succeeded);

    handle.click_node("B").await.unwrap();
    let view = handle.view();
    assert!(view.route.is_none());
    assert!(view.selection.src().is_none());

    let calls = calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            "nearby:3".to_string(),
            "init:ArrowXl".to_string(),
            "edges:ArrowXl".to_string(),
            "route:ArrowXl:A->C".to_string(),
        ]
    );
}

#[tokio::test]
async fn aircraft_switch_discards_stale_chain() {
    let backend = ScriptedBackend::new(Ok(nodes()), 0);
    let gate = backend.init_gate.clone();
    let calls = backend.calls.clone();
    let (handle, _task) = spawn_session(backend, SessionConfig::default());

    handle.request_nearby_nodes(origin(), 500.0, 3).await.unwrap();
    wait(&handle, |v| v.router_busy).await;

    handle.pick_aircraft(AircraftType::ArrowCargo).await.unwrap();
    let view = handle.view();
    assert_eq!(view.aircraft, AircraftType::ArrowCargo);
    assert!(!view.router_ready);

    gate.add_permits(2);
    let view = wait(&handle, |v| v.router_ready).await;
    assert_eq!(view.aircraft, AircraftType::ArrowCargo);

    let edges_calls: Vec<String> = calls
        .lock()
        .unwrap()
        .iter()
        .filter(|c| c.starts_with("edges:"))
        .cloned()
        .collect();
    assert_eq!(edges_calls, vec!["edges:ArrowCargo".to_string()]);
}

#[tokio::test]
async fn repeated_pick_does_not_duplicate_initialize() {
    let backend = ScriptedBackend::new(Ok(nodes()), 0);
    let gate = backend.init_gate.clone();
    let calls = backend.calls.clone();
    let (handle, _task) = spawn_session(backend, SessionConfig::default());

    handle.request_nearby_nodes(origin(), 500.0, 3).await.unwrap();
    wait(&handle, |v| v.router_busy).await;
    handle.pick_aircraft(AircraftType::ArrowXl).await.unwrap();
    handle.pick_aircraft(AircraftType::ArrowXl).await.unwrap();

    gate.add_permits(1);
    wait(&handle, |v| v.router_ready).await;

    let inits = calls
        .lock()
        .unwrap()
        .iter()
        .filter(|c| c.starts_with("init:"))
        .count();
    assert_eq!(inits, 1);
}

#[tokio::test]
async fn nearby_failure_is_reported_in_view() {
    let backend = ScriptedBackend::new(
        Err(RemoteError::NetworkFailure("connection refused".to_string())),
        1,
    );
    let (handle, _task) = spawn_session(backend, SessionConfig::default());

    handle.request_nearby_nodes(origin(), 500.0, 3).await.unwrap();
    let view = wait(&handle, |v| matches!(v.nearby_status, OperationStatus::Failed(_))).await;
    assert!(view.nodes.is_none());
    assert!(!view.router_busy);
}

#[tokio::test]
async fn rejected_intents_are_returned() {
    let backend = ScriptedBackend::new(Ok(nodes()), 1);
    let (handle, _task) = spawn_session(backend, SessionConfig::default());

    let err = handle.click_node("A").await.unwrap_err();
    assert_eq!(err, SessionError::Intent(IntentError::UnknownNode("A".to_string())));

    let err = handle
        .request_nearby_nodes(origin(), 500.0, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Intent(IntentError::InvalidQuery(_))));
}

#[tokio::test]
async fn route_without_selection_sends_nothing() {
    let backend = ScriptedBackend::new(Ok(nodes()), 1);
    let calls = backend.calls.clone();
    let (handle, _task) = spawn_session(backend, SessionConfig::default());

    handle.request_route().await.unwrap();
    assert_eq!(handle.view().route_status, OperationStatus::Idle);
    assert!(calls.lock().unwrap().is_empty());
}
