#![deny(warnings)]
#![deny(clippy::unwrap_used)]

use std::sync::Arc;

use dotenv::dotenv;
use netops_agent::netops::{NetworkAgent, Settings, SshConnector, ToolRegistry};
use tracing::info;

/// Request used when the CLI is invoked without arguments.
const DEFAULT_REQUEST: &str = "What software version is the router running?";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Initialize logging with proper tracing default
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().expect("valid directive")),
        )
        .init();

    // Credentials and API key are resolved once; a missing value aborts
    // here, before any tool exists.
    let settings = Settings::load()?;
    info!(
        "managing {} ({})",
        settings.device.host, settings.device.device_type
    );

    let connector = Arc::new(SshConnector::new(&settings));
    let registry = ToolRegistry::with_device_tools(connector, settings.device.clone());
    let agent = NetworkAgent::new(&settings, registry)?;

    let joined = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let request = if joined.trim().is_empty() {
        DEFAULT_REQUEST
    } else {
        joined.as_str()
    };
    info!("request: {}", request);

    let answer = agent.run(request).await?;
    println!("{}", answer);

    Ok(())
}
