//! Planner core: data model, graph cache, node selection and the route
//! session controller. Pure state, no I/O.

pub mod error;
pub mod graph;
pub mod models;
pub mod selection;
pub mod session;

pub use error::{IntentError, RemoteError};
pub use graph::GraphCache;
pub use models::{
    route_length_m, AircraftType, Edge, Location, NearbyQuery, Node, Route, RouteQuery,
};
pub use selection::{ClickOutcome, Selection, SelectionMachine};
pub use session::{
    Completion, OperationStatus, Request, RoutePolicy, RouteSession, SessionConfig, SessionView,
    Ticket,
};
