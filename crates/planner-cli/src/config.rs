//! Planner configuration from environment and command line.

use std::env;
use std::time::Duration;

use clap::Args;
use planner_core::{AircraftType, Location, RoutePolicy, SessionConfig};

/// San Francisco, the default search origin.
pub const DEFAULT_ORIGIN: Location = Location {
    latitude: 37.7749,
    longitude: -122.4194,
    altitude_meters: 0.0,
};

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub backend_url: String,
    pub origin: Location,
    pub radius: f64,
    pub capacity: u32,
    pub timeout: Duration,
    pub route_policy: RoutePolicy,
    pub aircraft: AircraftType,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            origin: DEFAULT_ORIGIN,
            radius: 500.0,
            capacity: 50,
            timeout: Duration::from_secs(10),
            route_policy: RoutePolicy::AwaitRouter,
            aircraft: AircraftType::ArrowXl,
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from a key lookup. Missing or unparsable values keep their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<f64>().ok());

        Self {
            backend_url: lookup("PLANNER_BACKEND_URL").unwrap_or(defaults.backend_url),
            origin: Location {
                latitude: parsed("PLANNER_ORIGIN_LAT").unwrap_or(defaults.origin.latitude),
                longitude: parsed("PLANNER_ORIGIN_LON").unwrap_or(defaults.origin.longitude),
                altitude_meters: parsed("PLANNER_ORIGIN_ALT")
                    .unwrap_or(defaults.origin.altitude_meters),
            },
            radius: parsed("PLANNER_RADIUS").unwrap_or(defaults.radius),
            capacity: lookup("PLANNER_CAPACITY")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.capacity),
            timeout: lookup("PLANNER_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            route_policy: lookup("PLANNER_ROUTE_POLICY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.route_policy),
            aircraft: lookup("PLANNER_AIRCRAFT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.aircraft),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            initial_aircraft: self.aircraft,
            route_policy: self.route_policy,
        }
    }
}

/// Flags shared by the planner binaries. Each one overrides its
/// environment counterpart.
#[derive(Args, Debug, Clone, Default)]
pub struct PlannerArgs {
    /// Routing backend URL
    #[arg(long)]
    pub url: Option<String>,

    /// Search radius around the origin
    #[arg(long)]
    pub radius: Option<f64>,

    /// Maximum number of nodes to request
    #[arg(long)]
    pub capacity: Option<u32>,

    /// Aircraft type to start with (xl, cargo, interstate)
    #[arg(long)]
    pub aircraft: Option<AircraftType>,

    /// What to do with a route request while the router is initializing
    /// (await, immediate)
    #[arg(long)]
    pub route_policy: Option<RoutePolicy>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl PlannerArgs {
    pub fn apply(self, mut config: PlannerConfig) -> PlannerConfig {
        if let Some(url) = self.url {
            config.backend_url = url;
        }
        if let Some(radius) = self.radius {
            config.radius = radius;
        }
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(aircraft) = self.aircraft {
            config.aircraft = aircraft;
        }
        if let Some(policy) = self.route_policy {
            config.route_policy = policy;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = PlannerConfig::from_lookup(|_| None);
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert_eq!(config.origin, DEFAULT_ORIGIN);
        assert_eq!(config.radius, 500.0);
        assert_eq!(config.capacity, 50);
        assert_eq!(config.route_policy, RoutePolicy::AwaitRouter);
    }

    #[test]
    fn reads_environment_values() {
        let config = PlannerConfig::from_lookup(lookup(&[
            ("PLANNER_BACKEND_URL", "http://router:9000"),
            ("PLANNER_ORIGIN_LAT", "33.6846"),
            ("PLANNER_CAPACITY", "12"),
            ("PLANNER_ROUTE_POLICY", "immediate"),
            ("PLANNER_AIRCRAFT", "cargo"),
        ]));
        assert_eq!(config.backend_url, "http://router:9000");
        assert_eq!(config.origin.latitude, 33.6846);
        assert_eq!(config.origin.longitude, DEFAULT_ORIGIN.longitude);
        assert_eq!(config.capacity, 12);
        assert_eq!(config.route_policy, RoutePolicy::Immediate);
        assert_eq!(config.aircraft, AircraftType::ArrowCargo);
    }

    #[test]
    fn bad_values_fall_back_to_defaults() {
        let config = PlannerConfig::from_lookup(lookup(&[
            ("PLANNER_RADIUS", "wide"),
            ("PLANNER_TIMEOUT_SECS", "-3"),
        ]));
        assert_eq!(config.radius, 500.0);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn flags_override_environment() {
        let args = PlannerArgs {
            url: Some("http://other:8000".to_string()),
            capacity: Some(5),
            ..PlannerArgs::default()
        };
        let config = args.apply(PlannerConfig::from_lookup(lookup(&[(
            "PLANNER_CAPACITY",
            "12",
        )])));
        assert_eq!(config.backend_url, "http://other:8000");
        assert_eq!(config.capacity, 5);
    }
}
