//! HTTP + WebSocket API for FairFlip
//!
//! Endpoints:
//! - POST /session/new - Create and start a session
//! - GET /session/{id} - Public status (never the armed mode)
//! - DELETE /session/{id} - Stop and drop a session
//! - POST /session/{id}/tilt - Deliver one tilt sample
//! - POST /session/{id}/flip - Request a flip
//! - POST /session/{id}/stealth - Toggle stealth mode
//! - WS /ws/{id} - Live updates
//! - GET /health - Health check

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info};

use crate::config::FlipConfig;
use crate::core::haptics::RemoteHaptics;
use crate::core::session::{SessionHandle, SessionUpdate};
use crate::error::FlipError;
use crate::types::{HapticPattern, Offset, TiltSample};

/// Session state
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub handle: SessionHandle,
}

/// App state
#[derive(Debug, Default)]
pub struct AppState {
    pub sessions: RwLock<HashMap<String, Session>>,
    /// Applied to sessions created without an explicit config
    pub default_config: FlipConfig,
}

/// API error with a JSON body
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<FlipError> for ApiError {
    fn from(err: FlipError) -> Self {
        match err {
            FlipError::SessionNotFound(id) => ApiError::NotFound(id),
            other => ApiError::InvalidInput(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        };
        let body = Json(json!({
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Create new session request
#[derive(Debug, Default, Deserialize)]
pub struct NewSessionRequest {
    pub config: Option<FlipConfig>,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
}

/// Session status response
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub status: String,
    pub flipping: bool,
    pub heads: bool,
    pub rotation: f32,
    pub offset: Offset,
    pub background: Offset,
    pub listening: bool,
}

/// Tilt response: what the device should render and play
#[derive(Debug, Serialize)]
pub struct TiltResponse {
    pub accepted: bool,
    pub offset: Offset,
    pub background: Offset,
    pub haptic: Option<HapticPattern>,
    /// Waveform timings for `haptic`
    pub haptic_timings_ms: Option<&'static [u64]>,
}

/// Flip response
#[derive(Debug, Serialize)]
pub struct FlipResponse {
    pub accepted: bool,
    pub status: String,
    /// Rotation the animation should run to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_rotation: Option<f32>,
    pub settle_ms: u64,
}

/// Stealth response
#[derive(Debug, Serialize)]
pub struct StealthResponse {
    pub message: String,
    pub status: String,
    pub message_ms: u64,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Create the API router
pub fn create_router(default_config: FlipConfig) -> Router {
    let state = Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
        default_config,
    });

    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session).delete(delete_session))
        .route("/session/:id/tilt", post(post_tilt))
        .route("/session/:id/flip", post(post_flip))
        .route("/session/:id/stealth", post(post_stealth))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create and start a new session
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSessionRequest>,
) -> ApiResult<Json<NewSessionResponse>> {
    let config = req.config.unwrap_or_else(|| state.default_config.clone());
    config.validate()?;

    let session_id = generate_session_id();
    let handle = SessionHandle::new(config, Box::new(RemoteHaptics));
    handle.start();

    let mut sessions = state.sessions.write().await;
    sessions.insert(
        session_id.clone(),
        Session {
            id: session_id.clone(),
            handle,
        },
    );
    info!(session = %session_id, "session created");

    Ok(Json(NewSessionResponse {
        session_id: session_id.clone(),
        websocket_url: format!("/ws/{}", session_id),
    }))
}

async fn find_handle(state: &AppState, id: &str) -> ApiResult<SessionHandle> {
    let sessions = state.sessions.read().await;
    sessions
        .get(id)
        .map(|s| s.handle.clone())
        .ok_or_else(|| FlipError::SessionNotFound(id.to_string()).into())
}

/// Get session status
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionStatusResponse>> {
    let handle = find_handle(&state, &id).await?;
    let update = handle.snapshot();

    Ok(Json(SessionStatusResponse {
        session_id: id,
        status: update.status,
        flipping: update.flipping,
        heads: update.heads,
        rotation: update.rotation,
        offset: update.offset,
        background: update.background,
        listening: update.listening,
    }))
}

/// Stop and remove a session
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .remove(&id)
        .ok_or_else(|| ApiError::NotFound(id.clone()))?;
    session.handle.stop();
    let haptics = session.handle.lock().haptic_count();
    info!(session = %session.id, haptics, "session removed");
    Ok(StatusCode::NO_CONTENT)
}

/// Deliver one tilt sample
async fn post_tilt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(sample): Json<TiltSample>,
) -> ApiResult<Json<TiltResponse>> {
    let handle = find_handle(&state, &id).await?;

    let response = match handle.ingest(sample) {
        Some(output) => TiltResponse {
            accepted: true,
            offset: output.offset,
            background: output.background,
            haptic: output.haptic,
            haptic_timings_ms: output.haptic.map(|p| p.timings_ms()),
        },
        None => {
            let update = handle.snapshot();
            TiltResponse {
                accepted: false,
                offset: update.offset,
                background: update.background,
                haptic: None,
                haptic_timings_ms: None,
            }
        }
    };

    Ok(Json(response))
}

/// Request a flip; a flip while flipping is accepted = false
async fn post_flip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<FlipResponse>> {
    let handle = find_handle(&state, &id).await?;
    let settle_ms = handle.lock().config().settle_ms;

    // Dropping the pending flip detaches its timer, which still settles
    let target_rotation = handle.request_flip().map(|pending| pending.ticket.spin.to);

    Ok(Json(FlipResponse {
        accepted: target_rotation.is_some(),
        status: handle.snapshot().status,
        target_rotation,
        settle_ms,
    }))
}

/// Toggle stealth mode
async fn post_stealth(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<StealthResponse>> {
    let handle = find_handle(&state, &id).await?;
    let message_ms = handle.lock().config().stealth_message_ms;
    let notice = handle.toggle_stealth();

    Ok(Json(StealthResponse {
        message: notice.text.to_string(),
        status: handle.snapshot().status,
        message_ms,
    }))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> ApiResult<impl IntoResponse> {
    let handle = find_handle(&state, &id).await?;
    let rx = handle.subscribe();

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Forward updates until either side goes away
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<SessionUpdate>) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            update = rx.recv() => {
                let update = match update {
                    Ok(update) => update,
                    // Slow client: skip what was missed
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let json = match serde_json::to_string(&update) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("update serialization failed: {}", e);
                        break;
                    }
                };
                if sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

/// Generate session ID
fn generate_session_id() -> String {
    use rand::Rng;
    let n: u64 = rand::thread_rng().gen();
    format!("session_{:016x}", n)
}

/// Run the API server
pub async fn run_server(addr: &str, default_config: FlipConfig) -> crate::Result<()> {
    let router = create_router(default_config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "FairFlip API running");
    println!("🪙 FairFlip API running on {}", addr);
    println!("  POST   /session/new         - Create session");
    println!("  GET    /session/:id         - Get status");
    println!("  DELETE /session/:id         - Stop session");
    println!("  POST   /session/:id/tilt    - Deliver tilt sample");
    println!("  POST   /session/:id/flip    - Request flip");
    println!("  POST   /session/:id/stealth - Toggle stealth");
    println!("  WS     /ws/:id              - Live updates");
    println!("  GET    /health              - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
