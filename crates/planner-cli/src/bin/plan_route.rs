use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use planner_cli::commands::NodeRef;
use planner_cli::{init_tracing, render, PlannerArgs, PlannerConfig};
use planner_core::{OperationStatus, SessionView};
use planner_sdk::{spawn_session, RouterClient, SessionHandle};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan a single route and print it", long_about = None)]
struct Args {
    #[command(flatten)]
    planner: PlannerArgs,

    /// Source node (uid or #index)
    #[arg(long)]
    from: String,

    /// Destination node (uid or #index)
    #[arg(long)]
    to: String,

    /// Print the route as JSON
    #[arg(long)]
    json: bool,
}

async fn settle(
    handle: &SessionHandle,
    limit: Duration,
    done: impl FnMut(&SessionView) -> bool,
) -> Result<SessionView> {
    let view = tokio::time::timeout(limit, handle.wait_for(done))
        .await
        .context("Timed out waiting for the backend")??;
    Ok(view)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let from = NodeRef::parse(&args.from).map_err(anyhow::Error::msg)?;
    let to = NodeRef::parse(&args.to).map_err(anyhow::Error::msg)?;
    let config = args.planner.apply(PlannerConfig::from_env());
    let limit = config.timeout * 2 + Duration::from_secs(1);

    let client = RouterClient::with_timeout(config.backend_url.clone(), config.timeout);
    let (handle, _session) = spawn_session(client, config.session_config());

    // 1. Nodes
    handle
        .request_nearby_nodes(config.origin, config.radius, config.capacity)
        .await?;
    let view = settle(&handle, limit, |v| !v.nearby_status.is_pending()).await?;
    if let OperationStatus::Failed(e) = &view.nearby_status {
        bail!("Failed to load nodes: {}", e);
    }
    let nodes = view.nodes.unwrap_or_default();
    eprintln!("Loaded {} nodes around {:.4}, {:.4}", nodes.len(), config.origin.latitude, config.origin.longitude);

    // 2. Selection
    let src = from.resolve(&nodes).map_err(anyhow::Error::msg)?;
    let dst = to.resolve(&nodes).map_err(anyhow::Error::msg)?;
    handle.click_node(src).await?;
    handle.click_node(dst).await?;

    // 3. Route (held until the router for the aircraft is ready)
    handle.request_route().await?;
    let view = settle(&handle, limit * 2, |v| !v.route_status.is_pending()).await?;
    let route = match (&view.route_status, view.route) {
        (OperationStatus::Failed(e), _) => bail!("Route failed: {}", e),
        (_, Some(route)) => route,
        _ => bail!("No route produced"),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&route)?);
    } else {
        println!("{} route {}", view.aircraft.title(), render::selection(&view.selection));
        println!("{}", render::route(&route));
    }
    Ok(())
}
