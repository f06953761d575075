//! Core data models for the route planner.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A geographic position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_meters: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, altitude_meters: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude_meters,
        }
    }

    /// Check that every coordinate is finite and lat/lon are in range.
    pub fn validate(&self) -> Result<(), String> {
        if !self.latitude.is_finite()
            || !self.longitude.is_finite()
            || !self.altitude_meters.is_finite()
        {
            return Err("location has non-finite coordinates".to_string());
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(format!("latitude {} out of range", self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(format!("longitude {} out of range", self.longitude));
        }
        Ok(())
    }

    /// Great-circle distance in meters (Haversine formula).
    pub fn distance_to(&self, other: &Location) -> f64 {
        const R: f64 = 6_371_000.0;

        let phi1 = self.latitude.to_radians();
        let phi2 = other.latitude.to_radians();
        let dphi = (other.latitude - self.latitude).to_radians();
        let dlambda = (other.longitude - self.longitude).to_radians();

        let a = (dphi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);

        2.0 * R * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// Total horizontal length of a route in meters.
pub fn route_length_m(route: &[Location]) -> f64 {
    route.windows(2).map(|leg| leg[0].distance_to(&leg[1])).sum()
}

/// A routable point with a stable identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub uid: String,
    pub location: Location,
    /// Backend attributes the planner does not interpret (status,
    /// forwarding, schedule). Kept so the node can be sent back verbatim.
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Node {
    pub fn new(uid: impl Into<String>, location: Location) -> Self {
        Self {
            uid: uid.into(),
            location,
            attributes: serde_json::Map::new(),
        }
    }
}

/// A directed connection between two nodes for one aircraft type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: Node,
    pub to: Node,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

/// Ordered path returned by the route query. Empty means no path exists.
pub type Route = Vec<Location>;

/// Aircraft types the backend knows how to route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AircraftType {
    #[default]
    ArrowXl,
    ArrowCargo,
    ArrowInterstate,
}

impl AircraftType {
    pub const ALL: [AircraftType; 3] = [
        AircraftType::ArrowXl,
        AircraftType::ArrowCargo,
        AircraftType::ArrowInterstate,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            AircraftType::ArrowXl => "Arrow XL",
            AircraftType::ArrowCargo => "Arrow Cargo",
            AircraftType::ArrowInterstate => "Arrow Interstate",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AircraftType::ArrowXl => "Good for short range flights",
            AircraftType::ArrowCargo => "Good for mid range flights with heavy payloads",
            AircraftType::ArrowInterstate => "Good for long range flights between cities",
        }
    }

    pub fn image(&self) -> &'static str {
        match self {
            AircraftType::ArrowXl => "arrow-xl.png",
            AircraftType::ArrowCargo => "arrow-cargo.png",
            AircraftType::ArrowInterstate => "arrow-interstate.png",
        }
    }
}

impl fmt::Display for AircraftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AircraftType::ArrowXl => "ArrowXl",
            AircraftType::ArrowCargo => "ArrowCargo",
            AircraftType::ArrowInterstate => "ArrowInterstate",
        };
        f.write_str(name)
    }
}

impl FromStr for AircraftType {
    type Err = String;

    /// Accepts the wire name (`ArrowCargo`) or a short alias (`cargo`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arrowxl" | "xl" | "arrow-xl" => Ok(AircraftType::ArrowXl),
            "arrowcargo" | "cargo" | "arrow-cargo" => Ok(AircraftType::ArrowCargo),
            "arrowinterstate" | "interstate" | "arrow-interstate" => {
                Ok(AircraftType::ArrowInterstate)
            }
            other => Err(format!("unknown aircraft type '{}'", other)),
        }
    }
}

/// Body of the nearest-nodes query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub location: Location,
    pub radius: f64,
    pub capacity: u32,
}

impl NearbyQuery {
    pub fn validate(&self) -> Result<(), String> {
        self.location.validate()?;
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(format!("radius must be positive, got {}", self.radius));
        }
        if self.capacity == 0 {
            return Err("capacity must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Body of the route query. Nodes are sent whole; the backend keys on `uid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteQuery {
    pub aircraft: AircraftType,
    pub from: Node,
    pub to: Node,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn aircraft_serializes_as_variant_name() {
        let value = serde_json::to_value(AircraftType::ArrowCargo).unwrap();
        assert_eq!(value, json!("ArrowCargo"));
        let parsed: AircraftType = serde_json::from_value(json!("ArrowInterstate")).unwrap();
        assert_eq!(parsed, AircraftType::ArrowInterstate);
    }

    #[test]
    fn aircraft_parses_aliases() {
        assert_eq!("cargo".parse::<AircraftType>().unwrap(), AircraftType::ArrowCargo);
        assert_eq!("ArrowXl".parse::<AircraftType>().unwrap(), AircraftType::ArrowXl);
        assert!("glider".parse::<AircraftType>().is_err());
    }

    #[test]
    fn node_keeps_backend_attributes() {
        let raw = json!({
            "uid": "n-1",
            "location": {"latitude": 37.7, "longitude": -122.4, "altitude_meters": 0.0},
            "forward_to": null,
            "status": "Ok",
            "schedule": null
        });
        let node: Node = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(node.uid, "n-1");
        assert_eq!(node.attributes.get("status"), Some(&json!("Ok")));
        assert_eq!(serde_json::to_value(&node).unwrap(), raw);
    }

    #[test]
    fn distance_matches_known_value() {
        // One degree of latitude is roughly 111.2 km.
        let a = Location::new(0.0, 0.0, 0.0);
        let b = Location::new(1.0, 0.0, 0.0);
        assert!((a.distance_to(&b) - 111_195.0).abs() < 50.0);
        assert!((route_length_m(&[a, b, a]) - 2.0 * a.distance_to(&b)).abs() < 1e-6);
        assert_eq!(route_length_m(&[a]), 0.0);
    }

    #[test]
    fn nearby_query_rejects_bad_inputs() {
        let origin = Location::new(37.7749, -122.4194, 0.0);
        let ok = NearbyQuery { location: origin, radius: 500.0, capacity: 50 };
        assert!(ok.validate().is_ok());

        let zero_radius = NearbyQuery { radius: 0.0, ..ok.clone() };
        assert!(zero_radius.validate().is_err());

        let zero_capacity = NearbyQuery { capacity: 0, ..ok.clone() };
        assert!(zero_capacity.validate().is_err());

        let bad_lat = NearbyQuery { location: Location::new(91.0, 0.0, 0.0), ..ok };
        assert!(bad_lat.validate().is_err());
    }
}
