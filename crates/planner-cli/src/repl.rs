//! Interactive terminal front end.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use planner_core::{OperationStatus, SessionView};
use planner_sdk::{RouterClient, SessionHandle};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{parse_command, Command, HELP};
use crate::config::PlannerConfig;
use crate::render;

pub struct Repl {
    handle: SessionHandle,
    probe: RouterClient,
    config: PlannerConfig,
}

impl Repl {
    pub fn new(handle: SessionHandle, config: PlannerConfig) -> Self {
        let probe = RouterClient::with_timeout(config.backend_url.clone(), config.timeout);
        Self {
            handle,
            probe,
            config,
        }
    }

    /// Read commands from stdin until `quit` or end of input.
    pub async fn run(&mut self) -> Result<()> {
        println!("Route planner connected to {}", self.config.backend_url);
        println!("{}", HELP);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            match parse_command(&line) {
                Ok(None) => {}
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => {
                    if let Err(e) = self.execute(command).await {
                        println!("error: {}", e);
                    }
                }
                Err(e) => println!("{}", e),
            }
        }
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Help => println!("{}", HELP),
            Command::Nodes { radius, capacity } => {
                if let Some(radius) = radius {
                    self.config.radius = radius;
                }
                if let Some(capacity) = capacity {
                    self.config.capacity = capacity;
                }
                self.handle
                    .request_nearby_nodes(self.config.origin, self.config.radius, self.config.capacity)
                    .await?;
                let view = self.settle(|v| !v.nearby_status.is_pending()).await?;
                match &view.nearby_status {
                    OperationStatus::Failed(e) => println!("nearby nodes failed: {}", e),
                    _ => println!(
                        "{} nodes loaded, initializing {} router",
                        view.nodes.as_ref().map_or(0, Vec::len),
                        view.aircraft.title()
                    ),
                }
            }
            Command::Aircraft(None) => {
                println!("{}", render::aircraft_list(self.handle.view().aircraft));
            }
            Command::Aircraft(Some(aircraft)) => {
                self.handle.pick_aircraft(aircraft).await?;
                let view = self.handle.view();
                if view.nodes.is_none() {
                    println!("{} selected (load nodes to initialize its router)", aircraft.title());
                } else {
                    println!("{} selected, router: {}", aircraft.title(), router_state(&view));
                }
            }
            Command::Click(target) => {
                let view = self.handle.view();
                let nodes = view.nodes.as_deref().unwrap_or_default();
                let uid = target.resolve(nodes).map_err(anyhow::Error::msg)?;
                self.handle.click_node(uid).await?;
                println!("selection: {}", render::selection(&self.handle.view().selection));
            }
            Command::Route => {
                let before = self.handle.view();
                if before.selection.pair().is_none() {
                    println!("select a source and a destination first");
                    return Ok(());
                }
                self.handle.request_route().await?;
                let view = self.settle(|v| !v.route_status.is_pending()).await?;
                match (&view.route_status, &view.route) {
                    (OperationStatus::Failed(e), _) => println!("route failed: {}", e),
                    (_, Some(route)) => println!("{}", render::route(route)),
                    _ => println!("no route"),
                }
            }
            Command::Show => println!("{}", render::summary(&self.handle.view())),
            Command::List => {
                let view = self.handle.view();
                match &view.nodes {
                    None => println!("no nodes loaded"),
                    Some(nodes) => {
                        for (index, node) in nodes.iter().enumerate() {
                            println!("{}", render::node_line(index, node, &view));
                        }
                    }
                }
            }
            Command::Edges => {
                let view = self.handle.view();
                println!("{} edges for {}", view.edges.len(), view.aircraft.title());
                for edge in &view.edges {
                    match edge.cost {
                        Some(cost) => println!("  {} -> {} ({:.1})", edge.from.uid, edge.to.uid, cost),
                        None => println!("  {} -> {}", edge.from.uid, edge.to.uid),
                    }
                }
            }
            Command::Probe => {
                let aircraft = self.handle.view().aircraft;
                match self.probe.is_router_initialized(aircraft).await {
                    Ok(ready) => println!("backend router for {}: {}", aircraft.title(), ready),
                    Err(e) => println!("probe failed: {}", e),
                }
            }
            Command::Quit => {}
        }
        Ok(())
    }

    /// Wait for the view to settle, bounded by twice the request timeout.
    async fn settle(&self, done: impl FnMut(&SessionView) -> bool) -> Result<SessionView> {
        let limit = self.config.timeout * 2 + Duration::from_secs(1);
        match tokio::time::timeout(limit, self.handle.wait_for(done)).await {
            Ok(view) => Ok(view?),
            Err(_) => anyhow::bail!("timed out waiting for the backend"),
        }
    }
}

fn router_state(view: &SessionView) -> &'static str {
    if view.router_ready {
        "ready"
    } else if view.router_busy {
        "initializing"
    } else if matches!(view.router_status, OperationStatus::Failed(_)) {
        "failed"
    } else {
        "not initialized"
    }
}
