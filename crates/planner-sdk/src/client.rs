//! HTTP client for the routing backend.

use std::time::Duration;

use planner_core::{AircraftType, Edge, NearbyQuery, Node, RemoteError, Route, RouteQuery};
use serde::Serialize;

use crate::backend::RouterBackend;
use crate::wire;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the routing backend's JSON endpoints.
pub struct RouterClient {
    pub(crate) base_url: String,
    pub(crate) client: reqwest::Client,
}

impl RouterClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - Backend root, e.g. "http://localhost:8000"
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the backend whether the router for `aircraft` exists.
    pub async fn is_router_initialized(&self, aircraft: AircraftType) -> Result<bool, RemoteError> {
        let (status, body) = self.post("/is-router-initialized", &aircraft).await?;
        wire::decode_flag(status, &body)
    }

    /// POST a JSON body. Returns the status and raw body of a successful
    /// response; error statuses become `BackendRejection`.
    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(u16, Vec<u8>), RemoteError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| RemoteError::NetworkFailure(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteError::NetworkFailure(e.to_string()))?;

        if !status.is_success() {
            let message = String::from_utf8_lossy(&bytes).trim().to_string();
            tracing::warn!(%url, status = status.as_u16(), "Backend rejected request: {}", message);
            return Err(RemoteError::BackendRejection {
                status: status.as_u16(),
                message,
            });
        }

        Ok((status.as_u16(), bytes.to_vec()))
    }
}

impl RouterBackend for RouterClient {
    async fn initialize_router(&self, aircraft: AircraftType) -> Result<(), RemoteError> {
        let (_, body) = self.post("/init-router", &aircraft).await?;
        tracing::debug!(aircraft = %aircraft, "{}", String::from_utf8_lossy(&body));
        Ok(())
    }

    async fn get_edges(&self, aircraft: AircraftType) -> Result<Vec<Edge>, RemoteError> {
        let (status, body) = self.post("/get-edges", &aircraft).await?;
        wire::decode_edges(status, &body)
    }

    async fn get_nearby_nodes(&self, query: &NearbyQuery) -> Result<Vec<Node>, RemoteError> {
        let (status, body) = self.post("/get-nearby-nodes", query).await?;
        wire::decode_nodes(status, &body)
    }

    async fn get_route(&self, query: &RouteQuery) -> Result<Route, RemoteError> {
        let (status, body) = self.post("/get-route", query).await?;
        wire::decode_route(status, &body)
    }
}
