use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::models::{QuizDocument, QuizLocation};
use crate::utils;

use super::{Store, StoreError, check_segment, slugify};

/// Category -> subcategory -> quiz file names.
pub type Structure = BTreeMap<String, BTreeMap<String, Vec<String>>>;

impl Store {
    /// Walk the two-level category tree. A missing root means no quizzes
    /// have been created yet and lists as empty rather than failing.
    pub fn structure(&self) -> Result<Structure, StoreError> {
        let root = self.quizzes_dir();
        let mut structure = Structure::new();

        let categories = match std::fs::read_dir(&root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("quiz root {} missing, listing empty", root.display());
                return Ok(structure);
            }
            Err(e) => return Err(e.into()),
        };

        for category in categories {
            let category = category?;
            if !category.file_type()?.is_dir() {
                continue;
            }

            let mut subcategories = BTreeMap::new();
            for subcategory in std::fs::read_dir(category.path())? {
                let subcategory = subcategory?;
                if !subcategory.file_type()?.is_dir() {
                    continue;
                }

                let mut quizzes: Vec<String> = std::fs::read_dir(subcategory.path())?
                    .filter_map(|entry| entry.ok())
                    .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
                    .map(|entry| entry.file_name().to_string_lossy().into_owned())
                    .filter(|name| name.ends_with(".json"))
                    .collect();
                quizzes.sort();

                subcategories.insert(
                    subcategory.file_name().to_string_lossy().into_owned(),
                    quizzes,
                );
            }

            structure.insert(category.file_name().to_string_lossy().into_owned(), subcategories);
        }

        Ok(structure)
    }

    pub fn read_quiz(&self, location: &QuizLocation) -> Result<QuizDocument, StoreError> {
        let path = self.quiz_path(location)?;

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound);
            }
            Err(e) => return Err(e.into()),
        };

        let doc: QuizDocument = serde_json::from_str(&raw).map_err(|e| {
            tracing::error!("quiz {} is not a valid document: {e}", path.display());
            StoreError::InvalidFormat("quiz file is not a valid document")
        })?;

        if doc.topic.is_empty() {
            return Err(StoreError::InvalidFormat("quiz file has no topic"));
        }

        Ok(doc)
    }

    /// Write a new quiz document. `desired_name` is reduced to a slug, a
    /// timestamp stem stands in when nothing survives the cleanup, and name
    /// collisions get a `-1`, `-2`, ... suffix. Returns the final file name.
    pub fn write_quiz(
        &self,
        category: &str,
        subcategory: &str,
        desired_name: &str,
        doc: &QuizDocument,
    ) -> Result<String, StoreError> {
        let category = check_segment(category)?;
        let subcategory = check_segment(subcategory)?;

        let mut stem = slugify(desired_name);
        if stem.is_empty() {
            stem = format!("quiz-{}", utils::now_millis());
        }

        let dir = self.quizzes_dir().join(category).join(subcategory);
        std::fs::create_dir_all(&dir)?;

        let mut filename = format!("{stem}.json");
        let mut counter = 1;
        while dir.join(&filename).exists() {
            filename = format!("{stem}-{counter}.json");
            counter += 1;
        }

        let json = serde_json::to_string_pretty(doc)?;
        std::fs::write(dir.join(&filename), json)?;

        tracing::info!("quiz saved: {category}/{subcategory}/{filename}");
        Ok(filename)
    }

    /// Rename a quiz file, update its content, or both. The rename happens
    /// first; when content is also given it is written under the final name.
    pub fn update_quiz(
        &self,
        category: &str,
        subcategory: &str,
        old_name: &str,
        new_name: Option<&str>,
        doc: Option<&QuizDocument>,
    ) -> Result<(), StoreError> {
        let category = check_segment(category)?;
        let subcategory = check_segment(subcategory)?;
        let old_name = check_segment(old_name)?;

        let dir = self.quizzes_dir().join(category).join(subcategory);

        let final_name = match new_name {
            Some(new_name) if new_name != old_name => {
                let new_name = check_segment(new_name)?;
                let old_path = dir.join(old_name);
                if !old_path.exists() {
                    return Err(StoreError::NotFound);
                }
                std::fs::rename(old_path, dir.join(new_name))?;
                tracing::info!(
                    "quiz renamed: {category}/{subcategory}/{old_name} -> {new_name}"
                );
                new_name
            }
            _ => old_name,
        };

        if let Some(doc) = doc {
            let json = serde_json::to_string_pretty(doc)?;
            std::fs::write(dir.join(final_name), json)?;
            tracing::info!("quiz updated: {category}/{subcategory}/{final_name}");
        }

        Ok(())
    }

    pub fn delete_quiz(&self, location: &QuizLocation) -> Result<(), StoreError> {
        let path = self.quiz_path(location)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(
                    "quiz deleted: {}/{}/{}",
                    location.category,
                    location.subcategory,
                    location.filename
                );
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Idempotent: creating a category that already exists succeeds.
    pub fn create_category(&self, name: &str) -> Result<(), StoreError> {
        let name = check_segment(name)?;
        std::fs::create_dir_all(self.quizzes_dir().join(name))?;
        tracing::info!("category created: {name}");
        Ok(())
    }

    /// Idempotent, and creates the parent category as needed.
    pub fn create_subcategory(&self, category: &str, name: &str) -> Result<(), StoreError> {
        let category = check_segment(category)?;
        let name = check_segment(name)?;
        std::fs::create_dir_all(self.quizzes_dir().join(category).join(name))?;
        tracing::info!("subcategory created: {category}/{name}");
        Ok(())
    }

    pub fn rename_category(&self, old_name: &str, new_name: &str) -> Result<(), StoreError> {
        let old_name = check_segment(old_name)?;
        let new_name = check_segment(new_name)?;

        let old_path = self.quizzes_dir().join(old_name);
        if !old_path.exists() {
            return Err(StoreError::NotFound);
        }
        std::fs::rename(old_path, self.quizzes_dir().join(new_name))?;

        tracing::info!("category renamed: {old_name} -> {new_name}");
        Ok(())
    }

    pub fn rename_subcategory(
        &self,
        category: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), StoreError> {
        let category = check_segment(category)?;
        let old_name = check_segment(old_name)?;
        let new_name = check_segment(new_name)?;

        let dir = self.quizzes_dir().join(category);
        let old_path = dir.join(old_name);
        if !old_path.exists() {
            return Err(StoreError::NotFound);
        }
        std::fs::rename(old_path, dir.join(new_name))?;

        tracing::info!("subcategory renamed: {category}/{old_name} -> {new_name}");
        Ok(())
    }

    /// Removes the category and every quiz under it.
    pub fn delete_category(&self, name: &str) -> Result<(), StoreError> {
        let name = check_segment(name)?;
        match std::fs::remove_dir_all(self.quizzes_dir().join(name)) {
            Ok(()) => {
                tracing::info!("category deleted: {name}");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete_subcategory(&self, category: &str, name: &str) -> Result<(), StoreError> {
        let category = check_segment(category)?;
        let name = check_segment(name)?;
        match std::fs::remove_dir_all(self.quizzes_dir().join(category).join(name)) {
            Ok(()) => {
                tracing::info!("subcategory deleted: {category}/{name}");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    fn quiz_path(&self, location: &QuizLocation) -> Result<PathBuf, StoreError> {
        let category = check_segment(&location.category)?;
        let subcategory = check_segment(&location.subcategory)?;
        let filename = check_segment(&location.filename)?;
        Ok(self
            .quizzes_dir()
            .join(category)
            .join(subcategory)
            .join(filename))
    }
}
