//! Backend seam used by the session runner.

use std::future::Future;

use planner_core::{AircraftType, Edge, NearbyQuery, Node, RemoteError, Route, RouteQuery};

/// The four remote operations the planner consumes.
///
/// [`RouterClient`](crate::RouterClient) implements this over HTTP; tests
/// plug in scripted backends.
pub trait RouterBackend: Send + Sync + 'static {
    fn initialize_router(
        &self,
        aircraft: AircraftType,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn get_edges(
        &self,
        aircraft: AircraftType,
    ) -> impl Future<Output = Result<Vec<Edge>, RemoteError>> + Send;

    fn get_nearby_nodes(
        &self,
        query: &NearbyQuery,
    ) -> impl Future<Output = Result<Vec<Node>, RemoteError>> + Send;

    fn get_route(
        &self,
        query: &RouteQuery,
    ) -> impl Future<Output = Result<Route, RemoteError>> + Send;
}
