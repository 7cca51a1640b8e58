pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn user_agent() -> String {
    format!("Mozilla/5.0 (compatible; quizforge/{VERSION})")
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
