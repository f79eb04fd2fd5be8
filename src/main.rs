// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Turf-session command line client
//!
//! Sends one authenticated request to the booking API, refreshing the
//! session when it has expired.
//!
//! Usage:
//!   turf-session whoami
//!   turf-session refresh-session <client|turfOwner|admin>
//!   turf-session <METHOD> <PATH> [JSON_BODY]

use turf_session::{
    config::Config,
    models::{ApiRequest, Role},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: turf-session whoami | refresh-session <role> | <METHOD> <PATH> [JSON_BODY]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(base_url = %config.api_base_url, "Starting turf-session client");

    let state = AppState::from_config(config)?;

    match args[0].as_str() {
        "whoami" => {
            println!("{}", serde_json::to_string_pretty(&state.store.current())?);
        }
        "refresh-session" => {
            let role = parse_role(args.get(1).map(String::as_str))?;
            let identity = state.clients.get(role).refresh_session().await?;
            println!("{}", serde_json::to_string_pretty(&identity)?);
        }
        method => {
            let path = args.get(1).ok_or(USAGE)?;
            let method: reqwest::Method = method.to_ascii_uppercase().parse()?;
            let mut request = ApiRequest::new(method, path.clone());
            if let Some(body) = args.get(2) {
                let body: serde_json::Value = serde_json::from_str(body)?;
                request = request.json(&body)?;
            }

            let response = state.unified.request(request).await?;
            tracing::info!(status = %response.status, "Request completed");
            println!("{}", response.body);
        }
    }

    Ok(())
}

fn parse_role(raw: Option<&str>) -> Result<Role, String> {
    let raw = raw.ok_or_else(|| USAGE.to_string())?;
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| format!("unknown role: {}", raw))
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("turf_session=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
