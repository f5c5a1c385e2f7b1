use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::lookup::BookLookup;

#[derive(Clone)]
pub struct AppState {
    pub lookup: BookLookup,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok\n" }))
        .route("/api/book-info", post(book_info))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn book_info(State(state): State<AppState>, body: Bytes) -> Response {
    // Malformed requests are rejected before any catalog call.
    let Some(query) = parse_query(&body) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Query é obrigatória" })),
        )
            .into_response();
    };

    match state.lookup.resolve(&query).await {
        Ok(Some(info)) => (StatusCode::OK, Json(info)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Livro não encontrado",
                "message": "Não foi possível encontrar informações para este livro.",
            })),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = format!("{err:#}"), "book lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "FETCH_FAILED",
                    "details": format!("{err:#}"),
                })),
            )
                .into_response()
        }
    }
}

fn parse_query(body: &[u8]) -> Option<String> {
    let payload: serde_json::Value = serde_json::from_slice(body).ok()?;
    let query = payload.get("query")?.as_str()?.trim();
    if query.is_empty() {
        return None;
    }
    Some(query.to_string())
}
