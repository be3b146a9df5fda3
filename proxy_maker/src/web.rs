//! JSON API for interactive deck building
//!
//! Holds a single deck session. A browser front end submits the decklist,
//! changes the set or language of individual slots and triggers the export.

use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::error::{ProxyError, SelectionError};
use crate::export::{ExportClient, FileType};
use crate::session::{load_all, DeckSession, DeckView, LanguageOption};
use crate::source::CardSource;

/// Shared application state
struct AppState<S> {
    session: Arc<Mutex<DeckSession>>,
    source: Arc<S>,
    export: Option<Arc<ExportClient>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            source: Arc::clone(&self.source),
            export: self.export.clone(),
        }
    }
}

/// API response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

type ApiResult<T> = (StatusCode, Json<ApiResponse<T>>);

fn ok<T>(data: T) -> ApiResult<T> {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }),
    )
}

fn fail<T>(status: StatusCode, error: impl ToString) -> ApiResult<T> {
    (
        status,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }),
    )
}

#[derive(Deserialize)]
struct SubmitRequest {
    decklist: String,
    #[serde(default = "default_language")]
    language: String,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Deserialize)]
struct SetChange {
    set: String,
}

#[derive(Deserialize)]
struct LanguageChange {
    language: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportRequest {
    #[serde(default)]
    filetype: FileType,
    #[serde(default)]
    paper_size: Option<String>,
}

#[derive(Serialize)]
struct ExportTicket {
    token: String,
}

fn lock_session<S>(state: &AppState<S>) -> std::sync::MutexGuard<'_, DeckSession> {
    state.session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// GET /api/languages
async fn languages_handler() -> ApiResult<Vec<LanguageOption>> {
    ok(mtg_common::LANGUAGES
        .iter()
        .map(|(code, name)| LanguageOption {
            code: code.to_string(),
            name: name.to_string(),
        })
        .collect())
}

/// POST /api/deck - replaces the current deck and loads every card
async fn submit_handler<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<SubmitRequest>,
) -> ApiResult<DeckView>
where
    S: CardSource + Send + Sync + 'static,
{
    let generation = lock_session(&state).submit(&request.decklist, &request.language);
    let summary = load_all(&state.session, generation, state.source.as_ref()).await;
    if summary.superseded {
        log::info!("Deck submission {} was replaced while loading", summary.generation);
    }
    let view = lock_session(&state).view();
    ok(view)
}

/// GET /api/deck
async fn deck_handler<S>(State(state): State<AppState<S>>) -> ApiResult<DeckView> {
    let view = lock_session(&state).view();
    ok(view)
}

fn selection_status(err: &SelectionError) -> StatusCode {
    match err {
        SelectionError::SlotOutOfRange(_) => StatusCode::NOT_FOUND,
        SelectionError::NotReady(_) => StatusCode::CONFLICT,
        SelectionError::UnknownSet(_) => StatusCode::BAD_REQUEST,
    }
}

/// POST /api/deck/slots/{index}/set
async fn set_handler<S>(
    State(state): State<AppState<S>>,
    Path(index): Path<usize>,
    Json(change): Json<SetChange>,
) -> ApiResult<DeckView> {
    let mut session = lock_session(&state);
    match session.change_set(index, &change.set) {
        Ok(()) => ok(session.view()),
        Err(e) => fail(selection_status(&e), e),
    }
}

/// POST /api/deck/slots/{index}/language
async fn language_handler<S>(
    State(state): State<AppState<S>>,
    Path(index): Path<usize>,
    Json(change): Json<LanguageChange>,
) -> ApiResult<DeckView> {
    let mut session = lock_session(&state);
    match session.change_language(index, &change.language) {
        Ok(()) => ok(session.view()),
        Err(e) => fail(selection_status(&e), e),
    }
}

/// POST /api/export - forwards the selected printings to the render backend
async fn export_handler<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<ExportRequest>,
) -> ApiResult<ExportTicket> {
    let Some(export) = state.export.clone() else {
        return fail(StatusCode::SERVICE_UNAVAILABLE, "No export backend configured");
    };

    let entries = lock_session(&state).snapshot_for_export();
    if entries.is_empty() {
        return fail(StatusCode::BAD_REQUEST, crate::error::ExportError::NothingToExport);
    }

    let result = export
        .request_render(&entries, request.filetype, request.paper_size.as_deref())
        .await;
    lock_session(&state).record_export_outcome(result.is_ok());

    match result {
        Ok(token) => ok(ExportTicket { token }),
        Err(e) => {
            log::error!("Export failed: {}", e);
            fail(StatusCode::BAD_GATEWAY, e)
        }
    }
}

/// Build the web server router
pub fn create_router<S>(source: Arc<S>, export: Option<Arc<ExportClient>>) -> Router
where
    S: CardSource + Send + Sync + 'static,
{
    let state = AppState {
        session: Arc::new(Mutex::new(DeckSession::new())),
        source,
        export,
    };

    Router::new()
        .route("/api/languages", get(languages_handler))
        .route("/api/deck", get(deck_handler::<S>).post(submit_handler::<S>))
        .route("/api/deck/slots/{index}/set", post(set_handler::<S>))
        .route("/api/deck/slots/{index}/language", post(language_handler::<S>))
        .route("/api/export", post(export_handler::<S>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the web server (async)
///
/// Binds to 0.0.0.0 (all interfaces) to work with Docker port mapping.
pub async fn serve<S>(
    source: Arc<S>,
    export: Option<Arc<ExportClient>>,
    port: u16,
) -> Result<(), ProxyError>
where
    S: CardSource + Send + Sync + 'static,
{
    let app = create_router(source, export);
    let addr = format!("0.0.0.0:{}", port);

    log::info!("Web API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
#[path = "web_tests.rs"]
mod tests;
