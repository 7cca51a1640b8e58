mod common;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use quizforge::generate::Generator;
use quizforge::models::{QuizDocument, QuizLocation, QuizMode};
use quizforge::session::PlaySession;
use quizforge::{AppState, router};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> (Router, common::TestStore) {
    let t = common::create_test_store();
    let http = reqwest::Client::new();
    let generator = Generator::new(http.clone(), "test-key".to_string(), "gpt-4o".to_string());
    let router = router(AppState {
        store: t.store.clone(),
        generator,
        http,
    });
    (router, t)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let req = builder.body(body).expect("request build should succeed");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("router should respond");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, value)
}

fn quiz_body() -> Value {
    json!({
        "topic": "Linear equations",
        "questions": [{
            "text": "2x = 4, so x = ?",
            "type": "SingleAnswer",
            "answers": [
                {"text": "2", "correct": true, "comment": "Divide both sides by two."},
                {"text": "4", "correct": false, "comment": ""}
            ]
        }]
    })
}

fn session_body(id: &str, user: &str) -> Value {
    json!({
        "id": id,
        "user": user,
        "startedAt": "2026-01-01T10:00:00Z",
        "quizLocation": {"category": "math", "subcategory": "algebra", "filename": "linear.json"},
        "mode": "summary",
        "durationSeconds": 42,
        "answeredQuestions": [],
        "score": {"correct": 2, "total": 3, "percentage": 67}
    })
}

#[tokio::test]
async fn quiz_crud_roundtrip() {
    let (app, _t) = app();

    let (status, body) = send(&app, Method::GET, "/api/quizzes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/save-quiz",
        Some(json!({
            "quiz": quiz_body(),
            "category": "Math",
            "subcategory": "Algebra",
            "filename": "Linear Equations",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "save failed: {body}");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["filename"], json!("linear-equations.json"));
    assert_eq!(body["path"], json!("Math/Algebra/linear-equations.json"));

    let (status, body) = send(&app, Method::GET, "/api/quizzes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Math"]["Algebra"], json!(["linear-equations.json"]));

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/quiz/Math/Algebra/linear-equations.json",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topic"], json!("Linear equations"));

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/quiz-management",
        Some(json!({
            "category": "Math",
            "subcategory": "Algebra",
            "oldName": "linear-equations.json",
            "newName": "basics.json",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/quiz/Math/Algebra/linear-equations.json",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) = send(&app, Method::GET, "/api/quiz/Math/Algebra/basics.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topic"], json!("Linear equations"));

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/quiz-management",
        Some(json!({
            "category": "Math",
            "subcategory": "Algebra",
            "filename": "basics.json",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, "/api/quiz/Math/Algebra/basics.json", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn saving_twice_appends_a_counter() {
    let (app, _t) = app();

    let save = json!({
        "quiz": quiz_body(),
        "category": "Math",
        "subcategory": "Algebra",
        "filename": "Algebra",
    });
    let (_, body) = send(&app, Method::POST, "/api/save-quiz", Some(save.clone())).await;
    assert_eq!(body["filename"], json!("algebra.json"));

    let (_, body) = send(&app, Method::POST, "/api/save-quiz", Some(save)).await;
    assert_eq!(body["filename"], json!("algebra-1.json"));
}

#[tokio::test]
async fn save_quiz_rejects_incomplete_bodies() {
    let (app, _t) = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/save-quiz",
        Some(json!({
            "quiz": quiz_body(),
            "category": "Math",
            "subcategory": "Algebra",
            "filename": "",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/save-quiz",
        Some(json!({
            "quiz": {"topic": "", "questions": []},
            "category": "Math",
            "subcategory": "Algebra",
            "filename": "Empty",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_bodies_are_client_errors() {
    let (app, _t) = app();

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/save-quiz")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request build should succeed");
    let resp = app.clone().oneshot(req).await.expect("router should respond");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reading_a_missing_quiz_is_a_server_error() {
    let (app, _t) = app();

    let (status, body) = send(&app, Method::GET, "/api/quiz/Math/Algebra/missing.json", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn path_traversal_in_quiz_paths_is_rejected() {
    let (app, _t) = app();

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/quiz/Math/Algebra/..%2F..%2Fusers.json",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn category_lifecycle_via_api() {
    let (app, _t) = app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some(json!({"category": "Science"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Idempotent.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some(json!({"category": "Science"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some(json!({"category": "Science", "subcategory": "Biology"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/quizzes", None).await;
    assert_eq!(body, json!({"Science": {"Biology": []}}));

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/categories",
        Some(json!({
            "oldName": "Biology",
            "newName": "Chemistry",
            "type": "subcategory",
            "category": "Science",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/categories",
        Some(json!({"oldName": "Science", "newName": "Nature", "type": "category"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/quizzes", None).await;
    assert_eq!(body, json!({"Nature": {"Chemistry": []}}));

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/categories",
        Some(json!({"name": "Chemistry", "type": "subcategory", "category": "Nature"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/categories",
        Some(json!({"name": "Nature", "type": "category"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/quizzes", None).await;
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn category_requests_are_validated() {
    let (app, _t) = app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some(json!({"category": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Renaming a subcategory needs its parent.
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/categories",
        Some(json!({"oldName": "Biology", "newName": "Chemistry", "type": "subcategory"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/categories",
        Some(json!({"name": "", "type": "category"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A missing source directory is a storage failure, not a client error.
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/categories",
        Some(json!({"oldName": "Ghost", "newName": "Real", "type": "category"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn history_flow() {
    let (app, _t) = app();

    let (status, body) = send(&app, Method::GET, "/api/history?user=anna", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/history",
        Some(session_body("s1", "anna")),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "record failed: {body}");
    assert_eq!(body["id"], json!("s1"));

    send(&app, Method::POST, "/api/history", Some(session_body("s2", "anna"))).await;
    send(&app, Method::POST, "/api/history", Some(session_body("b1", "ben"))).await;

    let (_, body) = send(&app, Method::GET, "/api/history?user=anna", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (_, body) = send(&app, Method::GET, "/api/history", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(3));

    let (_, body) = send(&app, Method::GET, "/api/history?user=anna&limit=1", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, Method::DELETE, "/api/history?user=anna&id=s1", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, Method::GET, "/api/history?user=anna", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, Method::DELETE, "/api/history?user=anna", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, Method::GET, "/api/history?user=anna", None).await;
    assert_eq!(body, json!([]));
    let (_, body) = send(&app, Method::GET, "/api/history?user=ben", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, Method::DELETE, "/api/history", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, Method::GET, "/api/history", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn history_requests_are_validated() {
    let (app, _t) = app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/history",
        Some(session_body("", "anna")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/history",
        Some(session_body("s1", "")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Deleting by id only would not know whose file to touch.
    let (status, _) = send(&app, Method::DELETE, "/api/history?id=s1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn users_flow() {
    let (app, _t) = app();

    let (status, body) = send(&app, Method::GET, "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({"name": "  Anna  "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], json!("Anna"));

    send(&app, Method::POST, "/api/users", Some(json!({"name": "Ben"}))).await;
    send(&app, Method::POST, "/api/users", Some(json!({"name": "Anna"}))).await;

    let (_, body) = send(&app, Method::GET, "/api/users", None).await;
    let names: Vec<&str> = body
        .as_array()
        .expect("users should be a list")
        .iter()
        .map(|u| u["name"].as_str().expect("name should be a string"))
        .collect();
    assert_eq!(names, vec!["Anna", "Ben"]);

    let (status, _) = send(&app, Method::POST, "/api/users", Some(json!({"name": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, "/api/users", Some(json!({"name": "Ben"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/users", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn scrape_rejects_bad_urls() {
    let (app, _t) = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/scrape",
        Some(json!({"url": "not a url"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("invalid URL"));

    let (status, _) = send(&app, Method::POST, "/api/scrape", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

fn multipart_part(name: &str, filename: Option<&str>, content_type: Option<&str>, value: &str) -> String {
    let mut part = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"");
    if let Some(filename) = filename {
        part.push_str(&format!("; filename=\"{filename}\""));
    }
    part.push_str("\r\n");
    if let Some(content_type) = content_type {
        part.push_str(&format!("Content-Type: {content_type}\r\n"));
    }
    part.push_str("\r\n");
    part.push_str(value);
    part.push_str("\r\n");
    part
}

async fn send_multipart(app: &Router, parts: &[String]) -> (StatusCode, Value) {
    let mut body = parts.concat();
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/generate-quiz")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request build should succeed");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("router should respond");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let value = serde_json::from_slice(&bytes).expect("body should be JSON");
    (status, value)
}

#[tokio::test]
async fn generate_quiz_requires_a_config() {
    let (app, _t) = app();

    let parts = [multipart_part("content", None, None, "Some source text.")];
    let (status, body) = send_multipart(&app, &parts).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("missing generation config"));
}

#[tokio::test]
async fn generate_quiz_requires_content() {
    let (app, _t) = app();

    let config = json!({
        "targetAudience": "adults",
        "questionCount": 5,
        "answersPerQuestion": 4,
        "allowMultipleAnswers": false,
        "quizTitle": "Rivers",
    });
    let parts = [multipart_part("config", None, None, &config.to_string())];
    let (status, body) = send_multipart(&app, &parts).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("no content provided"));
}

#[tokio::test]
async fn generate_quiz_rejects_invalid_config() {
    let (app, _t) = app();

    let parts = [multipart_part("config", None, None, "{not json")];
    let (status, body) = send_multipart(&app, &parts).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("invalid generation config"));
}

#[tokio::test]
async fn generate_quiz_rejects_pdf_uploads() {
    let (app, _t) = app();

    let parts = [multipart_part(
        "file",
        Some("notes.pdf"),
        Some("application/pdf"),
        "%PDF-1.4 fake",
    )];
    let (status, body) = send_multipart(&app, &parts).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        json!("PDF files are not supported yet, use text or a URL")
    );
}

#[tokio::test]
async fn played_session_lands_in_history() {
    let (app, _t) = app();

    send(
        &app,
        Method::POST,
        "/api/save-quiz",
        Some(json!({
            "quiz": quiz_body(),
            "category": "Math",
            "subcategory": "Algebra",
            "filename": "Linear Equations",
        })),
    )
    .await;

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/quiz/Math/Algebra/linear-equations.json",
        None,
    )
    .await;
    let doc: QuizDocument = serde_json::from_value(body).expect("quiz should deserialize");

    let location = QuizLocation {
        category: "Math".to_string(),
        subcategory: "Algebra".to_string(),
        filename: "linear-equations.json".to_string(),
    };
    let mut play = PlaySession::new(&doc, location, "anna", QuizMode::Summary, 3);

    while let Some(current) = play.current() {
        // The factory quiz marks the first stored answer correct.
        let pick = current
            .answers
            .iter()
            .position(|a| a.original_index == 0)
            .expect("answer should be dealt");
        play.submit(&[pick]);
    }
    let record = play.finish().expect("complete attempt should record");
    assert_eq!(record.score.percentage, 100);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/history",
        Some(serde_json::to_value(&record).expect("record should serialize")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/history?user=anna", None).await;
    assert_eq!(body[0]["id"], json!(record.id));
    assert_eq!(body[0]["score"]["percentage"], json!(100));
    assert_eq!(body[0]["quizLocation"]["filename"], json!("linear-equations.json"));
}
