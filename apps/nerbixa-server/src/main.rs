mod app;
mod cli;
mod server;
mod telemetry;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use crate::app::App;
use crate::cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    telemetry::init(&args.log_level, args.json_logs)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %args.env,
        "Starting Nerbixa generation proxy"
    );

    let result = match App::build(args) {
        Ok(app) => app.run().await,
        Err(e) => Err(e),
    };

    match &result {
        Ok(()) => info!("Proxy stopped"),
        Err(e) => error!("Proxy exited with error: {:#}", e),
    }

    result
}
