use crate::backend::{Inbound, SimulatedServer, unix_now};
use crate::config::AppConfig;
use crate::controller::PulseFrame;
use crate::error::BoardError;
use crate::render::BoardView;
use crate::session::{BoardSnapshot, Session, UiEvent};
use crate::ui;
use anyhow::Result;
use axum::extract::ws::{Message, WebSocket};
use axum::{
    Json, Router,
    extract::{State, WebSocketUpgrade},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, broadcast};
use tokio::time;
use tower_http::trace::TraceLayer;

pub type BoardSession = Session<BoardView, SimulatedServer>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub session: Arc<Mutex<BoardSession>>,
    pub pulse_tx: broadcast::Sender<PulseFrame>,
}

pub async fn serve(state: AppState) -> Result<()> {
    let frames = tokio::spawn(drive_frames(state.clone()));

    let router = Router::new()
        .route("/", get(index))
        .route("/api/board", get(board))
        .route("/api/ui", post(ui_event))
        .route("/api/inbound", post(inbound))
        .route("/ws/pulse", get(ws_pulse))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let addr: SocketAddr = state.config.http_bind.parse()?;
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Beacon board listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(graceful_shutdown())
        .await?;

    frames.abort();
    Ok(())
}

async fn graceful_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutting down http server");
}

/// Runs the pending pulse frame every tick and fans it out to viewers.
async fn drive_frames(state: AppState) {
    let mut interval = time::interval(state.config.frame_interval);
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let frame = state.session.lock().await.pump_frame(unix_now());
        if let Some(frame) = frame {
            // No subscribers is fine; nobody is watching the pulse.
            let _ = state.pulse_tx.send(frame);
        }
    }
}

async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.session.lock().await.snapshot();
    Html(ui::render_html(&snapshot))
}

async fn board(State(state): State<AppState>) -> Json<BoardSnapshot> {
    Json(state.session.lock().await.snapshot())
}

async fn ui_event(
    State(state): State<AppState>,
    Json(event): Json<UiEvent>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut session = state.session.lock().await;
    session
        .handle_ui(event)
        .map_err(|err| (status_for(&err), err.to_string()))?;
    Ok(Json(session.snapshot()))
}

#[derive(Serialize)]
struct InboundResponse {
    applied: bool,
    snapshot: BoardSnapshot,
}

async fn inbound(
    State(state): State<AppState>,
    Json(push): Json<Inbound>,
) -> Json<InboundResponse> {
    let mut session = state.session.lock().await;
    let before = session.store().recorded();
    session.handle_inbound(push);
    session.pump_inbound();
    Json(InboundResponse {
        applied: session.store().recorded() == before,
        snapshot: session.snapshot(),
    })
}

async fn ws_pulse(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_pulse(socket, state))
}

async fn handle_ws_pulse(mut socket: WebSocket, state: AppState) {
    let mut rx = state.pulse_tx.subscribe();
    loop {
        let frame = match rx.recv().await {
            Ok(frame) => frame,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "pulse viewer lagging");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        let payload = match serde_json::to_string(&frame) {
            Ok(s) => s,
            Err(_) => continue,
        };
        if socket.send(Message::Text(payload)).await.is_err() {
            break;
        }
    }
}

fn status_for(err: &BoardError) -> StatusCode {
    match err {
        BoardError::BeaconNotFound(_) | BoardError::NodeNotFound(_) => StatusCode::NOT_FOUND,
        BoardError::InvalidColor(_) => StatusCode::BAD_REQUEST,
        BoardError::InvalidState { .. } => StatusCode::CONFLICT,
    }
}
