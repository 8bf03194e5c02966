mod backend;
mod config;
mod controller;
mod error;
mod model;
mod palette;
mod render;
mod seed;
mod session;
mod store;
mod ui;
mod web;

use crate::backend::SimulatedServer;
use crate::config::AppConfig;
use crate::render::BoardView;
use crate::session::Session;
use crate::web::AppState;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = Arc::new(AppConfig::from_env());

    tracing::info!(
        "Starting beacon board on {} (viewing as user {})",
        config.http_bind,
        config.local_user_id
    );

    let mut session = Session::new(
        config.local_user_id,
        config.char_limits(),
        BoardView::new(),
        SimulatedServer::new(),
    );
    if config.demo_seed {
        seed::load_demo(&mut session)?;
    }

    let (pulse_tx, _) = broadcast::channel(64);
    let state = AppState {
        config,
        session: Arc::new(Mutex::new(session)),
        pulse_tx,
    };

    web::serve(state).await
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    let _ = fmt().with_env_filter(env_filter).try_init();
}
