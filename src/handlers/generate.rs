use axum::{
    Json, Router,
    extract::{Multipart, State, rejection::JsonRejection},
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    generate::{GenerateError, GenerationConfig},
    rejections::{AppError, ResultExt},
    scrape::{self, ScrapeError},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/generate-quiz", post(generate_quiz))
        .route("/api/scrape", post(scrape_page))
}

async fn generate_quiz(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut config: Option<GenerationConfig> = None;
    let mut text_content: Option<String> = None;
    let mut file_content: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("failed to read multipart field: {e}");
        AppError::Input("failed to read multipart field")
    })? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file"
            && field
                .content_type()
                .is_some_and(|ct| ct == "application/pdf")
        {
            return Err(AppError::Input(
                "PDF files are not supported yet, use text or a URL",
            ));
        }

        let text = field.text().await.map_err(|e| {
            tracing::error!("failed to read field data: {e}");
            AppError::Input("failed to read field data")
        })?;

        match name.as_str() {
            "config" => {
                config =
                    Some(serde_json::from_str(&text).reject_input("invalid generation config")?);
            }
            "content" if !text.trim().is_empty() => text_content = Some(text),
            "file" if !text.trim().is_empty() => file_content = Some(text),
            _ => {}
        }
    }

    let config = config.ok_or(AppError::Input("missing generation config"))?;
    // Uploaded files win over pasted text when both are present.
    let content = file_content
        .or(text_content)
        .ok_or(AppError::Input("no content provided"))?;

    let quiz = state
        .generator
        .generate(&config, &content)
        .await
        .map_err(|e| match e {
            GenerateError::MissingInput => AppError::Input("no content provided"),
            GenerateError::Upstream(msg) => {
                tracing::error!("quiz generation failed: {msg}");
                AppError::Upstream("quiz generation failed")
            }
        })?;

    Ok(Json(quiz))
}

#[derive(Deserialize)]
struct ScrapeBody {
    url: String,
}

async fn scrape_page(
    State(state): State<AppState>,
    body: Result<Json<ScrapeBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body.reject_input("invalid scrape body")?;

    let content = scrape::page_text(&state.http, &body.url)
        .await
        .map_err(|e| match e {
            ScrapeError::InvalidUrl => AppError::Input("invalid URL"),
            other => {
                tracing::error!("failed to fetch the page: {other}");
                AppError::Upstream("failed to fetch the page")
            }
        })?;

    Ok(Json(json!({ "content": content })))
}
