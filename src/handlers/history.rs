use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    models::QuizSession,
    names,
    rejections::{AppError, ResultExt, StoreResultExt},
};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/history",
        get(list_history).post(record_session).delete(delete_history),
    )
}

#[derive(Deserialize)]
struct HistoryQuery {
    user: Option<String>,
    limit: Option<usize>,
    id: Option<String>,
}

async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.unwrap_or(names::DEFAULT_HISTORY_LIMIT);

    let sessions = match query.user.as_deref().filter(|user| !user.is_empty()) {
        Some(user) => state.store.history_for_user(user, limit),
        None => state
            .store
            .all_history(limit)
            .reject_store("failed to read history")?,
    };

    Ok(Json(sessions))
}

async fn record_session(
    State(state): State<AppState>,
    body: Result<Json<QuizSession>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(session) = body.reject_input("invalid history body")?;

    if session.id.is_empty() || session.user.is_empty() {
        return Err(AppError::Input("history entry needs an id and a user"));
    }

    state
        .store
        .append_session(&session)
        .reject_store("failed to record session")?;

    Ok(Json(json!({ "success": true, "id": session.id })))
}

async fn delete_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user = query.user.as_deref().filter(|user| !user.is_empty());
    let id = query.id.as_deref().filter(|id| !id.is_empty());

    match (user, id) {
        (Some(user), Some(id)) => state.store.delete_session(user, id),
        (Some(user), None) => state.store.delete_user_history(user),
        (None, None) => state.store.clear_history(),
        (None, Some(_)) => return Err(AppError::Input("id requires a user")),
    }
    .reject_store("failed to delete history")?;

    Ok(Json(json!({ "success": true })))
}
