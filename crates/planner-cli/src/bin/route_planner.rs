use anyhow::Result;
use clap::Parser;
use planner_cli::repl::Repl;
use planner_cli::{init_tracing, PlannerArgs, PlannerConfig};
use planner_sdk::{spawn_session, RouterClient};

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive flight route planner", long_about = None)]
struct Args {
    #[command(flatten)]
    planner: PlannerArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = args.planner.apply(PlannerConfig::from_env());

    tracing::info!(backend = %config.backend_url, "Starting route planner");
    let client = RouterClient::with_timeout(config.backend_url.clone(), config.timeout);
    let (handle, session) = spawn_session(client, config.session_config());

    let mut repl = Repl::new(handle, config);
    repl.run().await?;

    // Dropping the last handle stops the runner.
    drop(repl);
    session.await?;
    Ok(())
}
