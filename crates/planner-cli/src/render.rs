//! Text rendering of the session view.

use planner_core::{route_length_m, AircraftType, Node, OperationStatus, Route, Selection, SessionView};

pub fn status(status: &OperationStatus) -> String {
    match status {
        OperationStatus::Idle => "idle".to_string(),
        OperationStatus::Pending => "pending".to_string(),
        OperationStatus::Succeeded => "ok".to_string(),
        OperationStatus::Failed(err) => format!("failed: {}", err),
    }
}

pub fn selection(selection: &Selection) -> String {
    match selection {
        Selection::Empty => "none".to_string(),
        Selection::HasSrc(src) => format!("{} -> ?", src.uid),
        Selection::HasBoth { src, dst } => format!("{} -> {}", src.uid, dst.uid),
    }
}

pub fn node_line(index: usize, node: &Node, view: &SessionView) -> String {
    let marker = if view.selection.src().is_some_and(|n| n.uid == node.uid) {
        "src"
    } else if view.selection.dst().is_some_and(|n| n.uid == node.uid) {
        "dst"
    } else {
        ""
    };
    format!(
        "#{:<3} {:<38} {:>10.5} {:>11.5} {:>7.1}m {}",
        index,
        node.uid,
        node.location.latitude,
        node.location.longitude,
        node.location.altitude_meters,
        marker
    )
}

pub fn route(route: &Route) -> String {
    if route.is_empty() {
        return "no path between the selected nodes".to_string();
    }
    let mut out = format!(
        "{} points, {:.2} km",
        route.len(),
        route_length_m(route) / 1000.0
    );
    for point in route {
        out.push_str(&format!(
            "\n  {:.5}, {:.5} @ {:.1}m",
            point.latitude, point.longitude, point.altitude_meters
        ));
    }
    out
}

pub fn aircraft_list(active: AircraftType) -> String {
    AircraftType::ALL
        .iter()
        .map(|aircraft| {
            let marker = if *aircraft == active { "*" } else { " " };
            format!(
                "{} {:<16} {}",
                marker,
                aircraft.title(),
                aircraft.description()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn summary(view: &SessionView) -> String {
    let nodes = view
        .nodes
        .as_ref()
        .map(|nodes| nodes.len().to_string())
        .unwrap_or_else(|| "not loaded".to_string());
    let router = if view.router_ready {
        "ready".to_string()
    } else if view.router_busy {
        "initializing".to_string()
    } else {
        status(&view.router_status)
    };
    let route_line = match &view.route {
        Some(r) if r.is_empty() => "no path".to_string(),
        Some(r) => format!("{} points", r.len()),
        None => "none".to_string(),
    };

    format!(
        "aircraft:  {}\nnodes:     {} ({})\nedges:     {}\nrouter:    {}\nselection: {}\nroute:     {} ({})",
        view.aircraft.title(),
        nodes,
        status(&view.nearby_status),
        view.edges.len(),
        router,
        selection(&view.selection),
        route_line,
        status(&view.route_status),
    )
}
