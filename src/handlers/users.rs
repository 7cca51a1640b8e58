use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    rejections::{AppError, ResultExt, StoreResultExt},
};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/users",
        get(list_users).post(login_user).delete(remove_user),
    )
}

async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.users())
}

#[derive(Deserialize)]
struct UserBody {
    name: String,
}

async fn login_user(
    State(state): State<AppState>,
    body: Result<Json<UserBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body.reject_input("invalid users body")?;

    let user = state
        .store
        .upsert_user(&body.name)
        .reject_store("failed to sign in user")?;

    Ok(Json(json!({ "success": true, "user": user })))
}

async fn remove_user(
    State(state): State<AppState>,
    body: Result<Json<UserBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body.reject_input("invalid users body")?;

    if body.name.is_empty() {
        return Err(AppError::Input("missing user name"));
    }

    state
        .store
        .remove_user(&body.name)
        .reject_store("failed to remove user")?;

    Ok(Json(json!({ "success": true })))
}
