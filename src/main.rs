//! `food-relay` binary: loads configuration from the environment and serves the relay.

// crates.io
use color_eyre::Result;
// self
use food_relay::{config::Config, obs, server};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	obs::init_tracing();

	let config = Config::from_env()?;

	tracing::info!(
		client_id = %config.credentials.client_id,
		token_endpoint = %config.token_endpoint,
		api_endpoint = %config.api_endpoint,
		"Starting food relay."
	);

	server::serve(config).await?;

	Ok(())
}
