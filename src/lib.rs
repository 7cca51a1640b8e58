pub mod generate;
pub mod handlers;
pub mod models;
pub mod names;
pub mod rejections;
pub mod scrape;
pub mod session;
pub mod store;
pub mod utils;

use axum::Router;

#[derive(Clone)]
pub struct AppState {
    pub store: store::Store,
    pub generator: generate::Generator,
    pub http: reqwest::Client,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::quizzes::routes())
        .merge(handlers::categories::routes())
        .merge(handlers::generate::routes())
        .merge(handlers::history::routes())
        .merge(handlers::users::routes())
        .with_state(state)
}
