use std::path::{Path, PathBuf};

use crate::models::QuizSession;
use crate::names;

use super::{Store, StoreError, slugify};

impl Store {
    /// Record a finished attempt at the head of the user's history file,
    /// dropping the oldest entries beyond the cap.
    pub fn append_session(&self, session: &QuizSession) -> Result<(), StoreError> {
        let dir = self.history_dir();
        std::fs::create_dir_all(&dir)?;
        let path = self.user_history_file(&session.user);

        let mut sessions = read_sessions(&path);
        sessions.insert(0, session.clone());
        sessions.truncate(names::HISTORY_CAP);

        let json = serde_json::to_string_pretty(&sessions)?;
        std::fs::write(&path, json)?;

        tracing::info!(
            "session {} recorded for user '{}' ({}%)",
            session.id,
            session.user,
            session.score.percentage
        );
        Ok(())
    }

    /// Newest first. A user with no history file (or an unreadable one)
    /// simply has no history.
    pub fn history_for_user(&self, user: &str, limit: usize) -> Vec<QuizSession> {
        let mut sessions = read_sessions(&self.user_history_file(user));
        // Distinct names can share a file stem, so filter on the real name.
        sessions.retain(|session| session.user == user);
        sessions.truncate(limit);
        sessions
    }

    /// Merge every user's history, newest first.
    pub fn all_history(&self, limit: usize) -> Result<Vec<QuizSession>, StoreError> {
        let mut sessions = Vec::new();

        let entries = match std::fs::read_dir(self.history_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(sessions),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            if entry.path().extension().is_some_and(|ext| ext == "json") {
                sessions.extend(read_sessions(&entry.path()));
            }
        }

        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        sessions.truncate(limit);
        Ok(sessions)
    }

    pub fn delete_session(&self, user: &str, id: &str) -> Result<(), StoreError> {
        let path = self.user_history_file(user);

        let mut sessions = read_sessions(&path);
        sessions.retain(|session| session.id != id);

        let json = serde_json::to_string_pretty(&sessions)?;
        std::fs::write(&path, json)?;

        tracing::info!("session {id} deleted for user '{user}'");
        Ok(())
    }

    pub fn delete_user_history(&self, user: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.user_history_file(user)) {
            Ok(()) => {
                tracing::info!("history cleared for user '{user}'");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn clear_history(&self) -> Result<(), StoreError> {
        let entries = match std::fs::read_dir(self.history_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            if entry.path().extension().is_some_and(|ext| ext == "json") {
                std::fs::remove_file(entry.path())?;
            }
        }

        tracing::info!("history cleared for all users");
        Ok(())
    }

    fn user_history_file(&self, user: &str) -> PathBuf {
        self.history_dir().join(format!("{}.json", user_file_stem(user)))
    }
}

/// User names become file stems via the usual slug. Names that clean away
/// entirely fall back to a hex encoding so every user still maps to a
/// stable file.
fn user_file_stem(user: &str) -> String {
    let slug = slugify(user);
    if slug.is_empty() {
        user.bytes().map(|b| format!("{b:02x}")).collect()
    } else {
        slug
    }
}

fn read_sessions(path: &Path) -> Vec<QuizSession> {
    match std::fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("history file {} is unreadable: {e}", path.display());
            Vec::new()
        }),
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("history file {} is unreadable: {e}", path.display());
            }
            Vec::new()
        }
    }
}
