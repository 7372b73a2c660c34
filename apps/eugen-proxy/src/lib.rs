pub mod routes;
pub mod session;
pub mod state;
pub mod upstream;

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use tokio::net::TcpListener;

use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(
	version = eugen_cli::VERSION,
	rename_all = "kebab",
	styles = eugen_cli::styles(),
)]
pub struct Args {
	/// Defaults apply when omitted; `EUGEN_API` and `EUGEN_API_PREFIX` still override the backend.
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: Option<PathBuf>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = eugen_config::load_or_default(args.config.as_deref())?;
	eugen_cli::init_tracing(&config.service.log_level);
	let http_addr: SocketAddr = config.service.http_bind.parse()?;
	let state = AppState::new(&config.backend)?;
	let app = routes::router(state);

	let http_listener = TcpListener::bind(http_addr).await?;
	tracing::info!(%http_addr, backend = %config.backend.chat_url(), "HTTP server listening.");
	axum::serve(http_listener, app).with_graceful_shutdown(shutdown_signal()).await?;
	tracing::info!("HTTP server stopped.");
	Ok(())
}

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		tracing::warn!(error = %err, "Failed to listen for Ctrl-C. Serving until killed.");

		std::future::pending::<()>().await;
	}

	tracing::info!("Shutdown signal received. Draining connections.");
}
