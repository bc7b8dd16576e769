//! # HTTP Transport
//!
//! Maps HTTP onto the two [`NoteService`] operations and renders responses.
//!
//! | Route | Behaviour |
//! |-------|-----------|
//! | `GET /` | Note form |
//! | `POST /` | Create from `application/x-www-form-urlencoded` (`message`, `ttl`) |
//! | `GET /{id}` | Deliver the payload, burning read-once notes |
//! | anything else | `404 Not Found` |
//!
//! Pages are rendered from templates by [`Pages`].
//!
//! ## Body limit
//!
//! Request bodies are capped at three times the note size limit plus a small
//! allowance for the rest of the form, the worst case for a percent-encoded
//! note. A larger body is refused with `413`.
//!
//! `HEAD` is served by the `GET` handlers, so a `HEAD /{id}` consumes a
//! read-once note just like a `GET`.
//!
//! ## Store calls
//!
//! The store is synchronous, so every call runs on the blocking pool and is
//! bounded by the configured request timeout. On timeout the client gets a
//! `503`; the blocking call itself is detached, not aborted, and finishes or
//! fails on its own so a consumption is never cut off halfway.

use crate::api::{note_url, NoteService};
use crate::error::NoteError;
use crate::pages::Pages;
use crate::store::NoteStore;
use axum::extract::rejection::FormRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

/// Form value selecting a read-once note.
const UNTIL_READ: &str = "untilRead";

/// Room for the field names, `ttl` and separators around the note.
const FORM_OVERHEAD_BYTES: usize = 16 * 1024;

pub type SharedService = NoteService<Arc<dyn NoteStore>>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SharedService>,
    pub pages: Arc<Pages>,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl AppState {
    /// Fails only if a bundled template does not compile.
    pub fn new(
        service: SharedService,
        base_url: String,
        request_timeout: Duration,
    ) -> Result<Self, minijinja::Error> {
        Ok(Self {
            service: Arc::new(service),
            pages: Arc::new(Pages::new()?),
            base_url,
            request_timeout,
        })
    }
}

/// HTTP-facing error. Messages are what the client sees.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("Not Found")]
    NotFound,

    #[error("Note with ID {0} does not exist.")]
    NoteNotFound(String),

    #[error("Invalid media type posted.")]
    UnsupportedMediaType,

    #[error("Invalid form data posted.")]
    InvalidForm,

    #[error("Note is too large.")]
    PayloadTooLarge,

    #[error("{0}")]
    InvalidInput(String),

    #[error("The note store is not responding. Please try again later.")]
    Timeout,

    #[error("Ops something went wrong. Please check the server logs.")]
    Internal(String),
}

impl WebError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound | Self::NoteNotFound(_) => StatusCode::NOT_FOUND,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::InvalidForm | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<NoteError> for WebError {
    fn from(err: NoteError) -> Self {
        match err {
            NoteError::NotFound => Self::NotFound,
            NoteError::InvalidInput(msg) => Self::InvalidInput(msg),
            NoteError::Timeout => Self::Timeout,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<FormRejection> for WebError {
    fn from(rejection: FormRejection) -> Self {
        match rejection {
            FormRejection::InvalidFormContentType(_) => Self::UnsupportedMediaType,
            r if r.status() == StatusCode::PAYLOAD_TOO_LARGE => Self::PayloadTooLarge,
            _ => Self::InvalidForm,
        }
    }
}

impl From<minijinja::Error> for WebError {
    fn from(err: minijinja::Error) -> Self {
        Self::Internal(format!("Template rendering failed: {}", err))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(detail) => tracing::error!(error = %detail, "Request failed"),
            Self::Timeout => tracing::warn!("Store call timed out"),
            _ => {}
        }
        (
            self.status_code(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateForm {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub ttl: String,
}

/// Create the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = form_body_limit(state.service.policy().max_payload_bytes);
    Router::new()
        .route("/", get(index).post(create_note).fallback(not_found))
        .route("/{id}", get(read_note).fallback(not_found))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Largest urlencoded body that can carry a note of `max_payload_bytes`.
fn form_body_limit(max_payload_bytes: usize) -> usize {
    max_payload_bytes
        .saturating_mul(3)
        .saturating_add(FORM_OVERHEAD_BYTES)
}

/// Serve until Ctrl-C, sweeping the store every `sweep_interval` if set.
pub async fn serve(
    state: AppState,
    addr: SocketAddr,
    sweep_interval: Option<Duration>,
) -> std::io::Result<()> {
    if let Some(period) = sweep_interval {
        tokio::spawn(sweep_loop(state.service.clone(), period));
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, base_url = %state.base_url, "Listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn sweep_loop(service: Arc<SharedService>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    // The first tick completes immediately; skip it so startup stays quick.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let service = service.clone();
        match tokio::task::spawn_blocking(move || service.sweep()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Background sweep failed"),
            Err(e) => tracing::error!(error = %e, "Background sweep panicked"),
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// Run a store operation off the async runtime, bounded by the request timeout.
async fn with_store<T, F>(state: &AppState, op: F) -> Result<T, WebError>
where
    T: Send + 'static,
    F: FnOnce(&SharedService) -> crate::error::Result<T> + Send + 'static,
{
    let service = state.service.clone();
    let task = tokio::task::spawn_blocking(move || op(&service));

    match tokio::time::timeout(state.request_timeout, task).await {
        Ok(Ok(result)) => result.map_err(WebError::from),
        Ok(Err(join_err)) => Err(WebError::Internal(join_err.to_string())),
        Err(_) => Err(WebError::Timeout),
    }
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    Ok(Html(state.pages.index()?))
}

async fn create_note(
    State(state): State<AppState>,
    form: Result<Form<CreateForm>, FormRejection>,
) -> Result<Html<String>, WebError> {
    let Form(form) = form?;
    let read_once = form.ttl == UNTIL_READ;
    let payload = form.message.into_bytes();

    let id = with_store(&state, move |svc| svc.create_note(payload, read_once)).await?;

    let url = note_url(&state.base_url, &id);
    let notice: &[&str] = if read_once {
        &["This note will be deleted after it is read."]
    } else {
        &[]
    };
    Ok(Html(state.pages.message(
        "Note was successfully created",
        Some(url.as_str()),
        notice,
    )?))
}

async fn read_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let lookup = id.clone();
    match with_store(&state, move |svc| svc.consume_note(&lookup)).await? {
        Some(payload) => Ok((
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::CACHE_CONTROL, "no-store"),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            payload,
        )
            .into_response()),
        None => Err(WebError::NoteNotFound(id)),
    }
}

async fn not_found() -> WebError {
    WebError::NotFound
}
