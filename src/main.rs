use std::process::ExitCode;

use mcp_stdio_host::{
    config::Config,
    logging,
    stdio::transport::{ShutdownReason, StdioTransport},
    AppState,
};
use tokio::io::{stdin, stdout, BufReader};
use tracing::{error, info};

fn main() -> ExitCode {
    logging::init_logging();
    logging::install_panic_hook();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(error = %err, "failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    let outcome = runtime.block_on(run());
    // The blocking stdin reader thread cannot be cancelled, so do not wait for it.
    runtime.shutdown_background();

    match outcome {
        Ok(reason) => {
            info!(reason = ?reason, "server exited");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "server terminated on unrecoverable fault");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ShutdownReason, Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let state = AppState::with_builtins(config.manifest_path.clone())?;

    info!(
        manifest_path = %config.manifest_path.display(),
        "server starting"
    );

    let mut transport = StdioTransport::new(BufReader::new(stdin()), stdout());
    let reason = transport.serve(&state, shutdown_signal()).await?;
    Ok(reason)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install interrupt handler");
        std::future::pending::<()>().await;
    }
}
