// File-backed storage. Quizzes, session history and the user directory
// live in a plain directory tree of pretty-printed JSON files.

use std::path::PathBuf;

use thiserror::Error;

use crate::names;

mod history;
mod quiz;
mod user;

pub use quiz::Structure;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("invalid format: {0}")]
    InvalidFormat(&'static str),
    #[error("invalid name: {0}")]
    InvalidName(&'static str),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main storage handle. Cheap to clone, safe to share across handlers.
#[derive(Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open a store rooted at `root`, creating the layout if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(root.join(names::QUIZZES_DIR))?;
        std::fs::create_dir_all(root.join(names::HISTORY_DIR))?;

        tracing::info!("store opened at {}", root.display());

        Ok(Self { root })
    }

    fn quizzes_dir(&self) -> PathBuf {
        self.root.join(names::QUIZZES_DIR)
    }

    fn history_dir(&self) -> PathBuf {
        self.root.join(names::HISTORY_DIR)
    }

    fn users_file(&self) -> PathBuf {
        self.root.join(names::USERS_FILE)
    }
}

/// Reject path segments that could escape the store root. Category,
/// subcategory and file names all pass through here before being joined
/// onto a path.
fn check_segment(name: &str) -> Result<&str, StoreError> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(StoreError::InvalidName("empty or reserved name"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(StoreError::InvalidName("path separators are not allowed"));
    }
    Ok(name)
}

/// Reduce a free-form name to a safe file stem: lowercased, umlauts kept,
/// anything else dropped, whitespace collapsed into single dashes.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        match c {
            'a'..='z' | '0'..='9' | 'ä' | 'ö' | 'ü' | 'ß' | '-' => slug.push(c),
            c if c.is_whitespace() => slug.push('-'),
            _ => {}
        }
    }

    let mut collapsed = String::with_capacity(slug.len());
    for c in slug.chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }

    collapsed.trim_matches('-').to_string()
}
