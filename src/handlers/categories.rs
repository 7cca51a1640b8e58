use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    rejections::{AppError, ResultExt, StoreResultExt},
};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/categories",
        post(create).put(rename).delete(delete),
    )
}

/// Whether a rename or delete targets a category or one of its
/// subcategories.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TargetKind {
    Category,
    Subcategory,
}

#[derive(Deserialize)]
struct CreateBody {
    category: String,
    subcategory: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body.reject_input("invalid categories body")?;

    if body.category.is_empty() {
        return Err(AppError::Input("missing category"));
    }

    match body.subcategory.as_deref().filter(|name| !name.is_empty()) {
        Some(subcategory) => state.store.create_subcategory(&body.category, subcategory),
        None => state.store.create_category(&body.category),
    }
    .reject_store("failed to create category")?;

    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenameBody {
    old_name: String,
    new_name: String,
    #[serde(rename = "type")]
    kind: TargetKind,
    category: Option<String>,
}

async fn rename(
    State(state): State<AppState>,
    body: Result<Json<RenameBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body.reject_input("invalid categories body")?;

    if body.old_name.is_empty() || body.new_name.is_empty() {
        return Err(AppError::Input("missing old or new name"));
    }

    match body.kind {
        TargetKind::Category => state.store.rename_category(&body.old_name, &body.new_name),
        TargetKind::Subcategory => {
            let category = body
                .category
                .as_deref()
                .filter(|name| !name.is_empty())
                .ok_or(AppError::Input("missing parent category"))?;
            state
                .store
                .rename_subcategory(category, &body.old_name, &body.new_name)
        }
    }
    .reject_store("failed to rename category")?;

    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteBody {
    name: String,
    #[serde(rename = "type")]
    kind: TargetKind,
    category: Option<String>,
}

async fn delete(
    State(state): State<AppState>,
    body: Result<Json<DeleteBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body.reject_input("invalid categories body")?;

    if body.name.is_empty() {
        return Err(AppError::Input("missing name"));
    }

    match body.kind {
        TargetKind::Category => state.store.delete_category(&body.name),
        TargetKind::Subcategory => {
            let category = body
                .category
                .as_deref()
                .filter(|name| !name.is_empty())
                .ok_or(AppError::Input("missing parent category"))?;
            state.store.delete_subcategory(category, &body.name)
        }
    }
    .reject_store("failed to delete category")?;

    Ok(Json(json!({ "success": true })))
}
