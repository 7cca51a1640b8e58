use std::time::Duration;

// Store layout under the data root.
pub const QUIZZES_DIR: &str = "quizzes";
pub const HISTORY_DIR: &str = "history";
pub const USERS_FILE: &str = "users.json";

// Session history.
pub const HISTORY_CAP: usize = 1000;
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

// Quiz-taking pacing: summary mode moves on quickly, immediate mode holds
// the feedback on screen before advancing.
pub const SUMMARY_ADVANCE_DELAY: Duration = Duration::from_millis(300);
pub const IMMEDIATE_FEEDBACK_DELAY: Duration = Duration::from_millis(3000);

// Quiz generation.
pub const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const GENERATION_TEMPERATURE: f32 = 0.7;
pub const GENERATION_MAX_TOKENS: u32 = 4000;
pub const CORRECT_ANSWER_PLACEHOLDER: &str = "This is the correct answer.";

// Content extraction.
pub const SCRAPE_MAX_CHARS: usize = 10_000;
