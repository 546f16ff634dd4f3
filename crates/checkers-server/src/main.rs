// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Checkers server binary.

use std::path::PathBuf;
use std::sync::Arc;

use checkers_github_app::GithubAppClient;
use checkers_server::{create_router, AppState};
use checkers_server_config::LoggingConfig;
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Checkers - create and update GitHub check runs on behalf of CI clients.
#[derive(Parser, Debug)]
#[command(name = "checkers-server", about = "GitHub check-run gateway", version)]
struct Args {
	/// Path to a TOML config file (defaults to /etc/checkers/server.toml)
	#[arg(long, env = "CHECKERS_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

fn init_tracing(logging: &LoggingConfig) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| logging.level.clone().into());
	let registry = tracing_subscriber::registry().with(filter);

	if logging.json {
		registry
			.with(tracing_subscriber::fmt::layer().json())
			.init();
	} else {
		registry.with(tracing_subscriber::fmt::layer()).init();
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("checkers-server version: {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match args.config {
		Some(path) => checkers_server_config::load_config_with_file(path)?,
		None => checkers_server_config::load_config()?,
	};

	init_tracing(&config.logging);

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		app_id = config.github_app.app_id(),
		"starting checkers-server"
	);

	let webhook_secret = config.github_app.webhook_secret().cloned();
	if webhook_secret.is_none() {
		tracing::warn!("no webhook secret configured; GitHub webhooks will be rejected");
	}

	let github = Arc::new(GithubAppClient::new(config.github_app.clone())?);
	let state = AppState::new(
		github,
		config.clients.registry,
		config.clients.signing_scheme,
		webhook_secret,
	);

	let app = create_router(state).layer(TraceLayer::new_for_http());

	let addr = format!("{}:{}", config.http.host, config.http.port);
	let listener = tokio::net::TcpListener::bind(&addr).await?;
	tracing::info!(addr = %addr, "listening");

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
