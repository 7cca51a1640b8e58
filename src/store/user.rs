use chrono::Utc;

use crate::models::User;

use super::{Store, StoreError};

impl Store {
    /// Most recently used first. No directory file means no users yet.
    pub fn users(&self) -> Vec<User> {
        match std::fs::read_to_string(self.users_file()) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("user directory is unreadable: {e}");
                Vec::new()
            }),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("user directory is unreadable: {e}");
                }
                Vec::new()
            }
        }
    }

    /// Register a login: bump the timestamp of a known name or add a new
    /// one, keeping the directory sorted by recency.
    pub fn upsert_user(&self, name: &str) -> Result<User, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidName("user name is empty"));
        }

        let mut users = self.users();
        let now = Utc::now();

        let user = match users.iter_mut().find(|user| user.name == name) {
            Some(user) => {
                user.last_used = now;
                user.clone()
            }
            None => {
                let user = User {
                    name: name.to_string(),
                    last_used: now,
                };
                users.push(user.clone());
                user
            }
        };

        users.sort_by(|a, b| b.last_used.cmp(&a.last_used));
        self.write_users(&users)?;

        tracing::info!("user '{name}' signed in");
        Ok(user)
    }

    /// Removing an unknown name is a no-op. History is kept; it belongs to
    /// the name, not the directory entry.
    pub fn remove_user(&self, name: &str) -> Result<(), StoreError> {
        let mut users = self.users();
        users.retain(|user| user.name != name);
        self.write_users(&users)?;

        tracing::info!("user '{name}' removed");
        Ok(())
    }

    fn write_users(&self, users: &[User]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(users)?;
        std::fs::write(self.users_file(), json)?;
        Ok(())
    }
}
