//! Request handlers
//!
//! The search handler is a thin boundary: a malformed or absent body is
//! treated as an empty request (no field is required), and any failure
//! inside the pipeline is logged and surfaced as a generic 500 with
//! `{ code: "SERVER_ERROR", message }`. Store work runs on the blocking
//! pool; each request opens one connection and drops it on every exit
//! path.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use risk_ranking::{SearchRequest, SearchResult};

use crate::AppState;

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// Generic 500 wrapper for any unhandled failure.
#[derive(Debug)]
pub struct ServerError(pub String);

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                code: "SERVER_ERROR",
                message: self.0,
            }),
        )
            .into_response()
    }
}

fn server_error(context: &str, err: impl std::fmt::Display) -> ServerError {
    tracing::error!("{context}: {err}");
    ServerError(err.to_string())
}

pub async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Ranked county search. Zero matches is a 200 with an empty array.
pub async fn search(
    State(state): State<AppState>,
    body: Option<Json<SearchRequest>>,
) -> Result<Json<Vec<SearchResult>>, ServerError> {
    let request = body.map(|Json(body)| body).unwrap_or_default();

    let db = state.db.clone();
    let lookup = state.lookup.clone();
    let results = tokio::task::spawn_blocking(move || -> risk_ranking::Result<_> {
        let conn = db.connect()?;
        risk_ranking::search(&conn, &lookup, &request)
    })
    .await
    .map_err(|err| server_error("search task failed", err))?
    .map_err(|err| server_error("search failed", err))?;

    Ok(Json(results))
}

#[derive(Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

const SUGGEST_LIMIT: usize = 5;

/// County-name typeahead; queries shorter than 2 characters short-circuit.
pub async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<Vec<String>>, ServerError> {
    if query.q.chars().count() < 2 {
        return Ok(Json(Vec::new()));
    }

    let db = state.db.clone();
    let names = tokio::task::spawn_blocking(move || -> risk_ranking::Result<_> {
        let conn = db.connect()?;
        risk_ranking::select::suggest_counties(&conn, &query.q, SUGGEST_LIMIT)
    })
    .await
    .map_err(|err| server_error("suggest task failed", err))?
    .map_err(|err| server_error("suggest failed", err))?;

    Ok(Json(names))
}
