#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    grade::grade_to_text,
    tutor::{Conversation, Tutor},
};

/// The tutoring page, embedded at compile time.
const INDEX_HTML: &str = include_str!("assets/index.html");

/// The page's script, embedded at compile time.
const APP_JS: &str = include_str!("assets/app.js");

/// Shared state behind the HTTP surface. The grader itself is stateless and
/// reentrant; only tutoring conversations need coordination.
///
/// Each session's conversation sits behind its own lock, so a hint in flight
/// serializes concurrent requests for that session without removing it from
/// the map.
#[derive(Clone)]
pub struct AppState {
    /// The hint service.
    tutor:    Arc<Tutor>,
    /// Open tutoring conversations, keyed by session id.
    sessions: Arc<Mutex<HashMap<Uuid, Arc<Mutex<Conversation>>>>>,
}

impl AppState {
    /// Creates state around a tutor.
    pub fn new(tutor: Tutor) -> Self {
        Self {
            tutor:    Arc::new(tutor),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Starts a session with an empty conversation and returns its id.
    pub async fn open_session(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .lock()
            .await
            .insert(id, Arc::new(Mutex::new(Conversation::new())));
        tracing::info!(%id, "session opened");
        id
    }

    /// Looks up a session's conversation handle.
    pub async fn conversation(&self, id: &Uuid) -> Option<Arc<Mutex<Conversation>>> {
        self.sessions.lock().await.get(id).cloned()
    }

    /// Ends a session, dropping its conversation. Returns whether the
    /// session existed.
    pub async fn close_session(&self, id: &Uuid) -> bool {
        let existed = self.sessions.lock().await.remove(id).is_some();
        if existed {
            tracing::info!(%id, "session closed");
        }
        existed
    }

    /// Number of open sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Request body for `/api/run` and `/api/help`.
#[derive(Deserialize)]
struct CodeRequest {
    /// The student's current code.
    code:    String,
    /// Optional session id; hints accumulate per session when present.
    #[serde(default)]
    session: Option<Uuid>,
}

/// Response body for `/api/run`.
#[derive(Serialize)]
struct RunResponse {
    /// The rendered grade report (or setup-error text).
    result: String,
}

/// Response body for `/api/help`.
#[derive(Serialize)]
struct HelpResponse {
    /// The tutor's hint.
    response: String,
    /// Echo of the session id the hint was recorded under, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    session:  Option<Uuid>,
}

/// Request body for `/api/reflect`.
#[derive(Deserialize)]
struct ReflectRequest {
    /// The student's solution.
    code:        String,
    /// The student's prose explanation of how it works.
    explanation: String,
}

/// Response body for `/api/reflect`.
#[derive(Serialize)]
struct ReflectResponse {
    /// The tutor's evaluation of the explanation.
    feedback: String,
}

/// Response body for `/api/session`.
#[derive(Serialize)]
struct SessionResponse {
    /// The freshly opened session id.
    session: Uuid,
}

/// Error shape returned by fallible handlers.
struct AppError {
    /// HTTP status to return.
    status:  StatusCode,
    /// Message shown to the client.
    message: String,
}

impl AppError {
    /// A 400 with a message.
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status:  StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("handler error: {err:#}");
        Self {
            status:  StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/static/app.js", get(app_js))
        .route("/api/run", post(run))
        .route("/api/help", post(help))
        .route("/api/reflect", post(reflect))
        .route("/api/session", post(open_session))
        .route("/api/session/{id}", delete(close_session))
        .with_state(state)
}

/// Binds the listener and serves until the process exits.
pub async fn serve(tutor: Tutor, port: u16) -> Result<()> {
    let state = AppState::new(tutor);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Could not bind {addr}"))?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// Serves the tutoring page.
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Serves the page's script.
async fn app_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript")], APP_JS)
}

/// Student manually runs their code to see test results.
async fn run(Json(request): Json<CodeRequest>) -> Json<RunResponse> {
    Json(RunResponse {
        result: grade_to_text(&request.code),
    })
}

/// Student asks for help; the tutor grades the code and responds with a hint.
async fn help(
    State(state): State<AppState>,
    Json(request): Json<CodeRequest>,
) -> Result<Json<HelpResponse>, AppError> {
    match request.session {
        Some(id) => {
            // Only the session's own lock is held across the completion
            // request; the map stays free and the session stays visible.
            let conversation = state
                .conversation(&id)
                .await
                .ok_or_else(|| AppError::bad_request(format!("unknown session {id}")))?;
            let mut conversation = conversation.lock().await;

            let response = state.tutor.advise(&mut conversation, &request.code).await?;
            Ok(Json(HelpResponse {
                response,
                session: Some(id),
            }))
        }
        None => {
            // One-shot help: the conversation is discarded after the reply.
            let mut conversation = Conversation::new();
            let response = state.tutor.advise(&mut conversation, &request.code).await?;
            Ok(Json(HelpResponse {
                response,
                session: None,
            }))
        }
    }
}

/// Student explains their solution; the tutor evaluates the explanation.
async fn reflect(
    State(state): State<AppState>,
    Json(request): Json<ReflectRequest>,
) -> Result<Json<ReflectResponse>, AppError> {
    let feedback = state
        .tutor
        .reflect(&request.code, &request.explanation)
        .await?;
    Ok(Json(ReflectResponse { feedback }))
}

/// Opens a tutoring session.
async fn open_session(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(SessionResponse {
        session: state.open_session().await,
    })
}

/// Closes a tutoring session, clearing its conversation.
async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.close_session(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::bad_request(format!("unknown session {id}")))
    }
}
