//! Project persistence: documents keyed by id plus a slug index table.
//!
//! Slug uniqueness is the index table's key constraint; every slug change
//! touches both tables inside one write transaction.

use anyhow::{Result, bail};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::sync::Arc;

use crate::models::Project;

pub const PROJECT_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("projects");
pub const PROJECT_SLUG_TABLE: TableDefinition<&str, &str> = TableDefinition::new("project_slugs");

pub struct ProjectStorage {
    db: Arc<Database>,
}

impl ProjectStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(PROJECT_TABLE)?;
        write_txn.open_table(PROJECT_SLUG_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub fn create(&self, project: &Project) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut projects = write_txn.open_table(PROJECT_TABLE)?;
            let mut slugs = write_txn.open_table(PROJECT_SLUG_TABLE)?;

            if slugs.get(project.slug.as_str())?.is_some() {
                bail!("slug {} already taken", project.slug);
            }

            let bytes = serde_json::to_vec(project)?;
            projects.insert(project.id.as_str(), bytes.as_slice())?;
            slugs.insert(project.slug.as_str(), project.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_by_slug(&self, slug: &str) -> Result<Option<Project>> {
        let read_txn = self.db.begin_read()?;
        let slugs = read_txn.open_table(PROJECT_SLUG_TABLE)?;

        let id = match slugs.get(slug)? {
            Some(value) => value.value().to_string(),
            None => return Ok(None),
        };

        let projects = read_txn.open_table(PROJECT_TABLE)?;
        if let Some(value) = projects.get(id.as_str())? {
            Ok(Some(serde_json::from_slice(value.value())?))
        } else {
            Ok(None)
        }
    }

    pub fn slug_exists(&self, slug: &str) -> Result<bool> {
        let read_txn = self.db.begin_read()?;
        let slugs = read_txn.open_table(PROJECT_SLUG_TABLE)?;
        Ok(slugs.get(slug)?.is_some())
    }

    /// Persist a mutated project, moving the slug index entry when the
    /// slug changed.
    pub fn update(&self, project: &Project, previous_slug: &str) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut projects = write_txn.open_table(PROJECT_TABLE)?;
            let mut slugs = write_txn.open_table(PROJECT_SLUG_TABLE)?;

            if project.slug != previous_slug {
                let taken = match slugs.get(project.slug.as_str())? {
                    Some(value) => value.value() != project.id,
                    None => false,
                };
                if taken {
                    bail!("slug {} already taken", project.slug);
                }
                slugs.remove(previous_slug)?;
                slugs.insert(project.slug.as_str(), project.id.as_str())?;
            }

            let bytes = serde_json::to_vec(project)?;
            projects.insert(project.id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccessMode, ExpiresIn};
    use tempfile::tempdir;

    fn storage() -> (ProjectStorage, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::create(db_path).unwrap());
        (ProjectStorage::new(db).unwrap(), temp_dir)
    }

    fn sample(slug: &str) -> Project {
        Project::new(
            "Demo".to_string(),
            AccessMode::Editable,
            ExpiresIn::OneHour,
            slug.to_string(),
        )
    }

    #[test]
    fn test_create_and_lookup_by_slug() {
        let (storage, _tmp) = storage();
        let project = sample("demo1234");
        storage.create(&project).unwrap();

        let found = storage.get_by_slug("demo1234").unwrap().unwrap();
        assert_eq!(found.id, project.id);
        assert!(storage.get_by_slug("missing").unwrap().is_none());
    }

    #[test]
    fn test_create_rejects_duplicate_slug() {
        let (storage, _tmp) = storage();
        storage.create(&sample("demo1234")).unwrap();
        assert!(storage.create(&sample("demo1234")).is_err());
    }

    #[test]
    fn test_update_moves_slug_index() {
        let (storage, _tmp) = storage();
        let mut project = sample("demo1234");
        storage.create(&project).unwrap();

        project.slug = "renamed1".to_string();
        storage.update(&project, "demo1234").unwrap();

        assert!(storage.get_by_slug("demo1234").unwrap().is_none());
        let found = storage.get_by_slug("renamed1").unwrap().unwrap();
        assert_eq!(found.id, project.id);
    }

    #[test]
    fn test_update_rejects_taken_slug() {
        let (storage, _tmp) = storage();
        storage.create(&sample("first123")).unwrap();
        let mut second = sample("second12");
        storage.create(&second).unwrap();

        second.slug = "first123".to_string();
        assert!(storage.update(&second, "second12").is_err());
    }
}
