//! Planner CLI - terminal front end for the route planner.
//!
//! Binaries:
//! - route_planner: interactive session
//! - plan_route: one-shot route between two nodes

pub mod commands;
pub mod config;
pub mod render;
pub mod repl;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use config::{PlannerArgs, PlannerConfig};

const DEFAULT_LOG_FILTER: &str = "planner_cli=info,planner_sdk=info,planner_core=info";

/// Install the tracing subscriber. Logs go to stderr so stdout stays
/// readable.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
