//! Runs an Easel hub on `0.0.0.0:<port>`.
//!
//! The port comes from the first argument, then `EASEL_PORT`, then 9090.
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::num::ParseIntError;

use easel::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 9090;

/// Picks the listening port: explicit argument first, then environment.
fn resolve_port(
    arg: Option<String>,
    env: Option<String>,
) -> Result<u16, ParseIntError> {
    match arg.or(env) {
        Some(port) => port.trim().parse(),
        None => Ok(DEFAULT_PORT),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = resolve_port(
        std::env::args().nth(1),
        std::env::var("EASEL_PORT").ok(),
    )?;
    let addr = format!("0.0.0.0:{port}");

    let server = EaselServerBuilder::new().bind(&addr).build().await?;
    tracing::info!(%addr, "listening");

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await?;
    Ok(())
}
