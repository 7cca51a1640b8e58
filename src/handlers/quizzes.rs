use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    models::{QuizDocument, QuizLocation},
    rejections::{AppError, ResultExt, StoreResultExt},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/quizzes", get(structure))
        .route(
            "/api/quiz/{category}/{subcategory}/{filename}",
            get(read_quiz),
        )
        .route("/api/save-quiz", post(save_quiz))
        .route("/api/quiz-management", put(update_quiz).delete(delete_quiz))
}

async fn structure(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let structure = state.store.structure().reject("failed to list quizzes")?;
    Ok(Json(structure))
}

async fn read_quiz(
    State(state): State<AppState>,
    Path(location): Path<QuizLocation>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = state
        .store
        .read_quiz(&location)
        .reject_store("failed to read quiz file")?;
    Ok(Json(quiz))
}

#[derive(Deserialize)]
struct SaveQuizBody {
    quiz: QuizDocument,
    category: String,
    subcategory: String,
    filename: String,
}

async fn save_quiz(
    State(state): State<AppState>,
    body: Result<Json<SaveQuizBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body.reject_input("invalid save-quiz body")?;

    if body.category.is_empty() || body.subcategory.is_empty() || body.filename.is_empty() {
        return Err(AppError::Input("incomplete save-quiz body"));
    }
    if body.quiz.topic.is_empty() || body.quiz.questions.is_empty() {
        return Err(AppError::Input("quiz needs a topic and questions"));
    }

    let filename = state
        .store
        .write_quiz(&body.category, &body.subcategory, &body.filename, &body.quiz)
        .reject_store("failed to save quiz")?;

    Ok(Json(json!({
        "success": true,
        "filename": filename,
        "path": format!("{}/{}/{}", body.category, body.subcategory, filename),
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateQuizBody {
    category: String,
    subcategory: String,
    old_name: String,
    new_name: Option<String>,
    quiz_data: Option<QuizDocument>,
}

async fn update_quiz(
    State(state): State<AppState>,
    body: Result<Json<UpdateQuizBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body.reject_input("invalid quiz-management body")?;

    if body.category.is_empty() || body.subcategory.is_empty() || body.old_name.is_empty() {
        return Err(AppError::Input("incomplete quiz-management body"));
    }

    let new_name = body.new_name.as_deref().filter(|name| !name.is_empty());
    state
        .store
        .update_quiz(
            &body.category,
            &body.subcategory,
            &body.old_name,
            new_name,
            body.quiz_data.as_ref(),
        )
        .reject_store("failed to update quiz")?;

    Ok(Json(json!({ "success": true })))
}

async fn delete_quiz(
    State(state): State<AppState>,
    body: Result<Json<QuizLocation>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(location) = body.reject_input("invalid quiz-management body")?;

    state
        .store
        .delete_quiz(&location)
        .reject_store("failed to delete quiz")?;

    Ok(Json(json!({ "success": true })))
}
