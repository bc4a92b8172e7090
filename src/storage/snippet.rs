//! Snippet persistence, keyed by share-id.

use anyhow::Result;
use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::sync::Arc;

use crate::models::Snippet;

pub const SNIPPET_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("snippets");

pub struct SnippetStorage {
    db: Arc<Database>,
}

/// Outcome of moving a snippet to a new share-id. The occupied-target
/// case is distinct from the missing-source case so callers can map them
/// to conflict and not-found respectively.
#[derive(Debug)]
pub enum RenameOutcome {
    Renamed(Snippet),
    SourceMissing,
    AliasTaken,
}

impl SnippetStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(SNIPPET_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Insert or overwrite a snippet under its share-id.
    pub fn put(&self, snippet: &Snippet) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SNIPPET_TABLE)?;
            let bytes = serde_json::to_vec(snippet)?;
            table.insert(snippet.share_id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get(&self, share_id: &str) -> Result<Option<Snippet>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNIPPET_TABLE)?;

        if let Some(value) = table.get(share_id)? {
            Ok(Some(serde_json::from_slice(value.value())?))
        } else {
            Ok(None)
        }
    }

    pub fn exists(&self, share_id: &str) -> Result<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNIPPET_TABLE)?;
        Ok(table.get(share_id)?.is_some())
    }

    /// Move a snippet to a new share-id (custom alias assignment).
    ///
    /// The alias-uniqueness check, the removal of the old key, and the
    /// re-insert under the alias all happen in one write transaction.
    /// redb serializes writers, so two renames onto the same alias cannot
    /// both pass the check; the loser gets [`RenameOutcome::AliasTaken`]
    /// and the occupant's document is untouched.
    pub fn rename_share_id(&self, share_id: &str, alias: &str) -> Result<RenameOutcome> {
        let write_txn = self.db.begin_write()?;
        let renamed = {
            let mut table = write_txn.open_table(SNIPPET_TABLE)?;
            if table.get(alias)?.is_some() {
                return Ok(RenameOutcome::AliasTaken);
            }
            let bytes = match table.remove(share_id)? {
                Some(value) => value.value().to_vec(),
                None => return Ok(RenameOutcome::SourceMissing),
            };
            let mut snippet: Snippet = serde_json::from_slice(&bytes)?;
            snippet.share_id = alias.to_string();
            snippet.updated_at = Utc::now();
            table.insert(alias, serde_json::to_vec(&snippet)?.as_slice())?;
            snippet
        };
        write_txn.commit()?;
        Ok(RenameOutcome::Renamed(renamed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccessMode, ExpiresIn};
    use tempfile::tempdir;

    fn storage() -> (SnippetStorage, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::create(db_path).unwrap());
        (SnippetStorage::new(db).unwrap(), temp_dir)
    }

    fn sample(share_id: &str) -> Snippet {
        Snippet::new(
            "main.rs".to_string(),
            "rust".to_string(),
            "fn main() {}".to_string(),
            AccessMode::Editable,
            ExpiresIn::OneHour,
            share_id.to_string(),
        )
    }

    #[test]
    fn test_put_and_get() {
        let (storage, _tmp) = storage();
        storage.put(&sample("abc12345")).unwrap();

        let found = storage.get("abc12345").unwrap().unwrap();
        assert_eq!(found.filename, "main.rs");
        assert!(storage.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_rename_share_id_moves_document() {
        let (storage, _tmp) = storage();
        storage.put(&sample("abc12345")).unwrap();

        let outcome = storage.rename_share_id("abc12345", "my-alias").unwrap();
        let RenameOutcome::Renamed(renamed) = outcome else {
            panic!("expected rename, got {outcome:?}");
        };
        assert_eq!(renamed.share_id, "my-alias");

        // Old slug no longer resolvable, alias resolves to the same document.
        assert!(storage.get("abc12345").unwrap().is_none());
        let found = storage.get("my-alias").unwrap().unwrap();
        assert_eq!(found.id, renamed.id);
    }

    #[test]
    fn test_rename_unknown_share_id() {
        let (storage, _tmp) = storage();
        let outcome = storage.rename_share_id("nope", "alias").unwrap();
        assert!(matches!(outcome, RenameOutcome::SourceMissing));
    }

    #[test]
    fn test_rename_refuses_occupied_alias() {
        let (storage, _tmp) = storage();
        let mut occupant = sample("coolname");
        occupant.filename = "victim.rs".to_string();
        storage.put(&occupant).unwrap();
        storage.put(&sample("abc12345")).unwrap();

        let outcome = storage.rename_share_id("abc12345", "coolname").unwrap();
        assert!(matches!(outcome, RenameOutcome::AliasTaken));

        // Occupant untouched, source still reachable by its old id.
        let kept = storage.get("coolname").unwrap().unwrap();
        assert_eq!(kept.filename, "victim.rs");
        assert_eq!(kept.id, occupant.id);
        assert!(storage.get("abc12345").unwrap().is_some());
    }
}
