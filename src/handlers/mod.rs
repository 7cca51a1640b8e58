pub mod categories;
pub mod generate;
pub mod history;
pub mod quizzes;
pub mod users;
