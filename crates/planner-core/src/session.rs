//! Route session controller.
//!
//! `RouteSession` owns every piece of planner state and is driven by two
//! kinds of events: user intents (`pick_aircraft`, `click_node`,
//! `request_nearby_nodes`, `request_route`) and completions of remote
//! calls. Neither performs I/O. Both return the [`Request`]s the caller
//! must dispatch, each stamped with a [`Ticket`]. A completion is applied
//! only while its ticket is still awaited; anything else is reported as
//! [`RemoteError::StaleResponse`] and leaves state untouched.

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{IntentError, RemoteError};
use crate::graph::GraphCache;
use crate::models::{AircraftType, Edge, Location, NearbyQuery, Node, Route, RouteQuery};
use crate::selection::{Selection, SelectionMachine};

/// Monotonic request stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub u64);

/// A remote call the session wants performed.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    InitializeRouter { ticket: Ticket, aircraft: AircraftType },
    FetchEdges { ticket: Ticket, aircraft: AircraftType },
    FetchNearbyNodes { ticket: Ticket, query: NearbyQuery },
    FetchRoute { ticket: Ticket, query: RouteQuery },
}

impl Request {
    pub fn ticket(&self) -> Ticket {
        match self {
            Request::InitializeRouter { ticket, .. }
            | Request::FetchEdges { ticket, .. }
            | Request::FetchNearbyNodes { ticket, .. }
            | Request::FetchRoute { ticket, .. } => *ticket,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Request::InitializeRouter { .. } => "init-router",
            Request::FetchEdges { .. } => "get-edges",
            Request::FetchNearbyNodes { .. } => "get-nearby-nodes",
            Request::FetchRoute { .. } => "get-route",
        }
    }
}

/// Result of a remote call, fed back into the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    RouterInitialized {
        ticket: Ticket,
        aircraft: AircraftType,
        result: Result<(), RemoteError>,
    },
    EdgesFetched {
        ticket: Ticket,
        aircraft: AircraftType,
        result: Result<Vec<Edge>, RemoteError>,
    },
    NearbyNodesFetched {
        ticket: Ticket,
        result: Result<Vec<Node>, RemoteError>,
    },
    RouteFetched {
        ticket: Ticket,
        result: Result<Route, RemoteError>,
    },
}

impl Completion {
    pub fn ticket(&self) -> Ticket {
        match self {
            Completion::RouterInitialized { ticket, .. }
            | Completion::EdgesFetched { ticket, .. }
            | Completion::NearbyNodesFetched { ticket, .. }
            | Completion::RouteFetched { ticket, .. } => *ticket,
        }
    }
}

/// Status of one family of remote operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OperationStatus {
    /// Not attempted since the last reset.
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(RemoteError),
}

impl OperationStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, OperationStatus::Pending)
    }
}

/// What `request_route` does while the router is not ready.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoutePolicy {
    /// Hold the request until the edges fetch for the active type lands.
    #[default]
    AwaitRouter,
    /// Send it right away and let the backend reject it.
    Immediate,
}

impl FromStr for RoutePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "await" | "await-router" => Ok(RoutePolicy::AwaitRouter),
            "immediate" => Ok(RoutePolicy::Immediate),
            other => Err(format!("unknown route policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub initial_aircraft: AircraftType,
    pub route_policy: RoutePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainStage {
    Initializing,
    FetchingEdges,
}

#[derive(Debug, Clone, Copy)]
struct RouterChain {
    ticket: Ticket,
    stage: ChainStage,
}

#[derive(Debug, Default)]
struct RouterState {
    /// Initialized for the active aircraft type.
    ready: bool,
    /// At most one initialize/edges chain per aircraft type.
    outstanding: HashMap<AircraftType, RouterChain>,
    status: OperationStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum RouteRequest {
    #[default]
    Idle,
    /// Waiting for the router chain of the active type.
    Parked,
    InFlight(Ticket),
}

/// Snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub aircraft: AircraftType,
    pub nodes: Option<Vec<Node>>,
    /// Edges of the active aircraft type only.
    pub edges: Vec<Edge>,
    pub selection: Selection,
    pub route: Option<Route>,
    pub router_ready: bool,
    pub router_busy: bool,
    pub router_status: OperationStatus,
    pub nearby_status: OperationStatus,
    pub route_status: OperationStatus,
}

/// Single owner of the planner state.
#[derive(Debug)]
pub struct RouteSession {
    policy: RoutePolicy,
    graph: GraphCache,
    selection: SelectionMachine,
    router: RouterState,
    route: Option<Route>,
    route_status: OperationStatus,
    route_request: RouteRequest,
    nearby_pending: Option<Ticket>,
    nearby_status: OperationStatus,
    next_ticket: u64,
}

impl Default for RouteSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl RouteSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            policy: config.route_policy,
            graph: GraphCache::new(),
            selection: SelectionMachine::new(config.initial_aircraft),
            router: RouterState::default(),
            route: None,
            route_status: OperationStatus::Idle,
            route_request: RouteRequest::Idle,
            nearby_pending: None,
            nearby_status: OperationStatus::Idle,
            next_ticket: 1,
        }
    }

    // ========== ACCESSORS ==========

    pub fn aircraft(&self) -> AircraftType {
        self.selection.aircraft()
    }

    pub fn selection(&self) -> &Selection {
        self.selection.selection()
    }

    pub fn graph(&self) -> &GraphCache {
        &self.graph
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn router_ready(&self) -> bool {
        self.router.ready
    }

    /// An initialize/edges chain for the active type is in flight.
    pub fn router_busy(&self) -> bool {
        self.router.outstanding.contains_key(&self.aircraft())
    }

    pub fn router_status(&self) -> &OperationStatus {
        &self.router.status
    }

    pub fn nearby_status(&self) -> &OperationStatus {
        &self.nearby_status
    }

    pub fn route_status(&self) -> &OperationStatus {
        &self.route_status
    }

    pub fn view(&self) -> SessionView {
        let aircraft = self.aircraft();
        SessionView {
            aircraft,
            nodes: self.graph.current_nodes().map(<[Node]>::to_vec),
            edges: self.graph.current_edges(aircraft).to_vec(),
            selection: self.selection().clone(),
            route: self.route.clone(),
            router_ready: self.router.ready,
            router_busy: self.router_busy(),
            router_status: self.router.status.clone(),
            nearby_status: self.nearby_status.clone(),
            route_status: self.route_status.clone(),
        }
    }

    // ========== INTENTS ==========

    /// Select the aircraft type. The router is marked not ready and the
    /// route cleared before any request goes out; the selection is kept.
    pub fn pick_aircraft(&mut self, aircraft: AircraftType) -> Vec<Request> {
        let changed = self.selection.set_aircraft(aircraft);
        self.clear_route();

        if changed || !self.router.outstanding.contains_key(&aircraft) {
            self.router.ready = false;
            self.router.status = if self.router.outstanding.contains_key(&aircraft) {
                OperationStatus::Pending
            } else {
                OperationStatus::Idle
            };
        }
        tracing::info!(aircraft = %aircraft, changed, "Aircraft type picked");

        self.reconcile()
    }

    /// Feed a node click into the selection machine.
    pub fn click_node(&mut self, uid: &str) -> Result<Vec<Request>, IntentError> {
        let node = self
            .graph
            .find_node(uid)
            .cloned()
            .ok_or_else(|| IntentError::UnknownNode(uid.to_string()))?;

        let outcome = self.selection.click(node);
        self.clear_route();
        tracing::debug!(uid, ?outcome, "Node clicked");

        Ok(self.reconcile())
    }

    pub fn request_nearby_nodes(
        &mut self,
        center: Location,
        radius: f64,
        capacity: u32,
    ) -> Result<Vec<Request>, IntentError> {
        self.query_nearby_nodes(center, radius, capacity)
    }

    /// Route between the current selection for the current aircraft type.
    pub fn request_route(&mut self) -> Vec<Request> {
        let aircraft = self.aircraft();
        let src = self.selection().src().cloned();
        let dst = self.selection().dst().cloned();
        self.compute_route(aircraft, src.as_ref(), dst.as_ref())
    }

    // ========== OPERATIONS ==========

    /// Start the initialize/edges chain for `aircraft` unless it is
    /// already ready, already in flight, or there are no nodes yet.
    pub fn ensure_router_ready(&mut self, aircraft: AircraftType) -> Vec<Request> {
        let active = aircraft == self.aircraft();
        if active && self.router.ready {
            return Vec::new();
        }
        if self.router.outstanding.contains_key(&aircraft) {
            tracing::debug!(aircraft = %aircraft, "Router chain already in flight");
            return Vec::new();
        }
        if !self.graph.has_nodes() {
            return Vec::new();
        }

        let ticket = self.issue_ticket();
        self.router.outstanding.insert(
            aircraft,
            RouterChain {
                ticket,
                stage: ChainStage::Initializing,
            },
        );
        if active {
            self.router.status = OperationStatus::Pending;
        }
        tracing::info!(aircraft = %aircraft, ticket = ticket.0, "Initializing router");

        vec![Request::InitializeRouter { ticket, aircraft }]
    }

    /// Ask for the nodes around `center`. A newer query supersedes an
    /// older one still in flight.
    pub fn query_nearby_nodes(
        &mut self,
        center: Location,
        radius: f64,
        capacity: u32,
    ) -> Result<Vec<Request>, IntentError> {
        let query = NearbyQuery {
            location: center,
            radius,
            capacity,
        };
        query.validate().map_err(IntentError::InvalidQuery)?;

        let ticket = self.issue_ticket();
        self.nearby_pending = Some(ticket);
        self.nearby_status = OperationStatus::Pending;
        tracing::info!(ticket = ticket.0, radius, capacity, "Requesting nearby nodes");

        Ok(vec![Request::FetchNearbyNodes { ticket, query }])
    }

    /// Request a route. Does nothing unless both endpoints are present.
    pub fn compute_route(
        &mut self,
        aircraft: AircraftType,
        src: Option<&Node>,
        dst: Option<&Node>,
    ) -> Vec<Request> {
        let (Some(src), Some(dst)) = (src, dst) else {
            return Vec::new();
        };

        if self.policy == RoutePolicy::Immediate || self.router.ready {
            return vec![self.issue_route(aircraft, src.clone(), dst.clone())];
        }

        if let OperationStatus::Failed(err) = &self.router.status {
            tracing::warn!(aircraft = %aircraft, "Route requested but router failed: {}", err);
            self.route_request = RouteRequest::Idle;
            self.route_status = OperationStatus::Failed(err.clone());
            return Vec::new();
        }

        tracing::debug!(aircraft = %aircraft, "Route parked until router is ready");
        self.route_request = RouteRequest::Parked;
        self.route_status = OperationStatus::Pending;
        self.reconcile()
    }

    // ========== COMPLETIONS ==========

    /// Apply a completed remote call. Returns follow-up requests, or
    /// `Err(StaleResponse)` if the completion no longer applies.
    pub fn complete(&mut self, completion: Completion) -> Result<Vec<Request>, RemoteError> {
        let ticket = completion.ticket();
        let applied = match completion {
            Completion::RouterInitialized {
                ticket,
                aircraft,
                result,
            } => self.on_router_initialized(ticket, aircraft, result),
            Completion::EdgesFetched {
                ticket,
                aircraft,
                result,
            } => self.on_edges_fetched(ticket, aircraft, result),
            Completion::NearbyNodesFetched { ticket, result } => {
                self.on_nearby_nodes(ticket, result)
            }
            Completion::RouteFetched { ticket, result } => self.on_route(ticket, result),
        };

        if let Err(RemoteError::StaleResponse) = &applied {
            tracing::debug!(ticket = ticket.0, "Discarded stale response");
        }
        applied
    }

    fn on_router_initialized(
        &mut self,
        ticket: Ticket,
        aircraft: AircraftType,
        result: Result<(), RemoteError>,
    ) -> Result<Vec<Request>, RemoteError> {
        self.take_chain_stage(ticket, aircraft, ChainStage::Initializing)?;

        match result {
            Ok(()) => {
                self.router.outstanding.insert(
                    aircraft,
                    RouterChain {
                        ticket,
                        stage: ChainStage::FetchingEdges,
                    },
                );
                Ok(vec![Request::FetchEdges { ticket, aircraft }])
            }
            Err(err) => {
                self.fail_router(aircraft, err);
                Ok(Vec::new())
            }
        }
    }

    fn on_edges_fetched(
        &mut self,
        ticket: Ticket,
        aircraft: AircraftType,
        result: Result<Vec<Edge>, RemoteError>,
    ) -> Result<Vec<Request>, RemoteError> {
        self.take_chain_stage(ticket, aircraft, ChainStage::FetchingEdges)?;

        match result {
            Ok(edges) => {
                tracing::info!(aircraft = %aircraft, edges = edges.len(), "Router ready");
                self.graph.replace_edges(aircraft, edges);
                self.router.ready = true;
                self.router.status = OperationStatus::Succeeded;

                if self.route_request == RouteRequest::Parked {
                    self.route_request = RouteRequest::Idle;
                    if let Some((src, dst)) = self.selection().pair() {
                        let (src, dst) = (src.clone(), dst.clone());
                        return Ok(vec![self.issue_route(aircraft, src, dst)]);
                    }
                    self.route_status = OperationStatus::Idle;
                }
                Ok(Vec::new())
            }
            Err(err) => {
                self.fail_router(aircraft, err);
                Ok(Vec::new())
            }
        }
    }

    fn on_nearby_nodes(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Node>, RemoteError>,
    ) -> Result<Vec<Request>, RemoteError> {
        if self.nearby_pending != Some(ticket) {
            return Err(RemoteError::StaleResponse);
        }
        self.nearby_pending = None;

        match result {
            Ok(nodes) => {
                tracing::info!(nodes = nodes.len(), "Node set replaced");
                self.graph.replace_nodes(nodes);
                self.nearby_status = OperationStatus::Succeeded;

                // The backend drops every router when it hands out new nodes.
                self.selection.clear();
                self.clear_route();
                self.router.ready = false;
                self.router.outstanding.clear();
                self.router.status = OperationStatus::Idle;

                Ok(self.reconcile())
            }
            Err(err) => {
                tracing::warn!("Nearby nodes request failed: {}", err);
                self.nearby_status = OperationStatus::Failed(err);
                Ok(Vec::new())
            }
        }
    }

    fn on_route(
        &mut self,
        ticket: Ticket,
        result: Result<Route, RemoteError>,
    ) -> Result<Vec<Request>, RemoteError> {
        if self.route_request != RouteRequest::InFlight(ticket) {
            return Err(RemoteError::StaleResponse);
        }
        self.route_request = RouteRequest::Idle;

        match result {
            Ok(route) => {
                tracing::info!(points = route.len(), "Route received");
                self.route = Some(route);
                self.route_status = OperationStatus::Succeeded;
            }
            Err(err) => {
                tracing::warn!("Route request failed: {}", err);
                self.route_status = OperationStatus::Failed(err);
            }
        }
        Ok(Vec::new())
    }

    // ========== HELPERS ==========

    /// Check that `ticket` is the chain awaited for `aircraft` at `stage`,
    /// and drop it. Chains for an inactive type are dropped as stale.
    fn take_chain_stage(
        &mut self,
        ticket: Ticket,
        aircraft: AircraftType,
        stage: ChainStage,
    ) -> Result<(), RemoteError> {
        match self.router.outstanding.get(&aircraft) {
            Some(chain) if chain.ticket == ticket && chain.stage == stage => {
                self.router.outstanding.remove(&aircraft);
            }
            _ => return Err(RemoteError::StaleResponse),
        }
        if aircraft != self.aircraft() {
            return Err(RemoteError::StaleResponse);
        }
        Ok(())
    }

    fn fail_router(&mut self, aircraft: AircraftType, err: RemoteError) {
        tracing::warn!(aircraft = %aircraft, "Router initialization failed: {}", err);
        self.router.status = OperationStatus::Failed(err.clone());
        if self.route_request == RouteRequest::Parked {
            self.route_request = RouteRequest::Idle;
            self.route_status = OperationStatus::Failed(err);
        }
    }

    fn issue_route(&mut self, aircraft: AircraftType, from: Node, to: Node) -> Request {
        let ticket = self.issue_ticket();
        self.route_request = RouteRequest::InFlight(ticket);
        self.route_status = OperationStatus::Pending;
        tracing::info!(
            aircraft = %aircraft,
            from = %from.uid,
            to = %to.uid,
            ticket = ticket.0,
            "Requesting route"
        );
        Request::FetchRoute {
            ticket,
            query: RouteQuery { aircraft, from, to },
        }
    }

    /// Forget the route and any request producing one.
    fn clear_route(&mut self) {
        self.route = None;
        self.route_status = OperationStatus::Idle;
        self.route_request = RouteRequest::Idle;
    }

    /// Start the router chain whenever nodes are loaded and the router is
    /// neither ready nor failed for the active type.
    fn reconcile(&mut self) -> Vec<Request> {
        let failed = matches!(self.router.status, OperationStatus::Failed(_));
        if self.graph.has_nodes() && !self.router.ready && !failed {
            return self.ensure_router_ready(self.aircraft());
        }
        Vec::new()
    }

    fn issue_ticket(&mut self) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }
}
