//! Documentation of a polling-station voting booth backend.
//!
//!
//!
//! # General Flow
//! - Director (admin) logs in at the booth
//! - Voter presents a registration number and their name
//! - Number is normalized (trimmed, uppercased) and checked against the official roll
//! - Name is compared to the roll entry, case and spacing ignored
//! - First verification creates the voter record, later ones resume it until the voter has voted
//! - Operator fills the ballot on the voter's behalf, one choice per position
//! - Ballot is recorded as a physical vote tagged with the operator's username
//! - Results tally physical and online votes together and refresh every 30 seconds
//!
//!
//!
//! # One Vote Per Voter
//!
//! **Goal**: a registration number can only ever back a single ballot.
//!
//! - Verification rejects anyone already flagged as voted
//! - Verification alone is not enough: two booths can verify the same voter before either submits
//! - With `SUBMISSION_GUARD=atomic` (default) the `has_voted` flip is a single conditional write and happens before the ballot is stored, the loser gets `AlreadyVoted`
//! - With `SUBMISSION_GUARD=unguarded` the ballot is stored first and the flag flipped after, both ballots land
//! - If the second write fails the records disagree, this is logged as `CRITICAL` and needs manual reconciliation
//!
//!
//!
//! # Notes
//!
//! ## Identity
//! The roll stores a student name, so that is what the claimed identity is checked against.
//! Set `VERIFY_IDENTITY=false` to only check the registration number.
//!
//! ## Deadline
//! Read from the `voting_deadline` setting. Submissions after it are refused, an unset or
//! unreadable deadline means the booth stays open.
//!
//!
//!
//! # Setup
//!
//! Seed the store.
//! ```sh
//! cargo run -p import -- election.json
//! ```
//!
//! Start the booth.
//! ```sh
//! RUST_LOG=info cargo run -p ballot
//! ```
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
//!
//!
//!
//! # Environment
//!
//! | Variable | Default |
//! |----------|---------|
//! | `RUST_PORT` | `1111` |
//! | `REDIS_URL` (or `/run/secrets/REDIS_URL`) | `redis://redis:6379` |
//! | `SUBMISSION_GUARD` | `atomic` |
//! | `VERIFY_IDENTITY` | `true` |
//! | `RESULTS_REFRESH_SECS` | `30` |
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod ballot;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod poll;
pub mod results;
pub mod routes;
pub mod service;
pub mod session;
pub mod state;
pub mod submission;
pub mod utils;
pub mod verification;

use config::Config;
use database::Store;
use routes::{
    booth_handler, health_handler, login_handler, results_handler, verify_handler, votes_handler,
};
use state::AppState;

pub fn router<S: Store>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health_handler))
        .route("/login", post(login_handler::<S>))
        .route("/voters/verify", post(verify_handler::<S>))
        .route("/booth", get(booth_handler::<S>))
        .route("/votes", post(votes_handler::<S>))
        .route("/results", get(results_handler::<S>))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config).await?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
