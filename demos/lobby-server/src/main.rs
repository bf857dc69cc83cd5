//! Runs a lobby server.
//!
//! ```text
//! lobby-server [ADDR]          # or HUDDLE_BIND=ADDR lobby-server
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use huddle::prelude::*;
use tracing_subscriber::EnvFilter;

/// Picks the bind address: first argument, then `HUDDLE_BIND`, then the
/// default port on all interfaces.
fn bind_addr(arg: Option<String>, env: Option<String>) -> String {
    arg.or(env)
        .filter(|addr| !addr.trim().is_empty())
        .unwrap_or_else(|| format!("0.0.0.0:{DEFAULT_PORT}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let addr = bind_addr(std::env::args().nth(1), std::env::var("HUDDLE_BIND").ok());

    let server = HuddleServerBuilder::new().bind(&addr).build().await?;
    tracing::info!(addr = %server.local_addr()?, "lobby server ready");

    server.run().await?;
    Ok(())
}
