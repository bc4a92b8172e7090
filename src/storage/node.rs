//! Project node persistence and the tree reconciler.
//!
//! Nodes live in a flat table keyed by id; tree edges are `parent_id`
//! references. The nested view is materialized on read by
//! [`crate::models::build_tree`].

use anyhow::{Result, anyhow, bail};
use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::models::{NodeKind, ProjectNode, StructureChanges, is_temp_id};

pub const NODE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("project_nodes");

pub struct NodeStorage {
    db: Arc<Database>,
}

impl NodeStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(NODE_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub fn create(&self, node: &ProjectNode) -> Result<()> {
        self.put(node)
    }

    pub fn put(&self, node: &ProjectNode) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(NODE_TABLE)?;
            let bytes = serde_json::to_vec(node)?;
            table.insert(node.id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<ProjectNode>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(NODE_TABLE)?;

        if let Some(value) = table.get(id)? {
            Ok(Some(serde_json::from_slice(value.value())?))
        } else {
            Ok(None)
        }
    }

    pub fn list_by_project(&self, project_id: &str) -> Result<Vec<ProjectNode>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(NODE_TABLE)?;

        let mut nodes = Vec::new();
        for item in table.iter()? {
            let (_, value) = item?;
            let node: ProjectNode = serde_json::from_slice(value.value())?;
            if node.project_id == project_id {
                nodes.push(node);
            }
        }

        Ok(nodes)
    }

    /// Delete a node and its entire subtree. Returns the number of nodes
    /// removed (zero when the id is unknown).
    pub fn delete_recursive(&self, id: &str) -> Result<u64> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(NODE_TABLE)?;

            let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
            let mut known = HashSet::new();
            for item in table.iter()? {
                let (key, value) = item?;
                let node: ProjectNode = serde_json::from_slice(value.value())?;
                known.insert(key.value().to_string());
                if let Some(parent) = node.parent_id {
                    children_of.entry(parent).or_default().push(node.id);
                }
            }

            if !known.contains(id) {
                return Ok(0);
            }

            let mut doomed = vec![id.to_string()];
            let mut queue = vec![id.to_string()];
            while let Some(current) = queue.pop() {
                if let Some(children) = children_of.remove(&current) {
                    doomed.extend(children.iter().cloned());
                    queue.extend(children);
                }
            }

            for node_id in &doomed {
                table.remove(node_id.as_str())?;
            }
            doomed.len() as u64
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// The tree reconciler: apply a batch of client-side edits atomically.
    ///
    /// Phases run in a fixed order inside one write transaction —
    /// deletions, then updates, then creations in two passes (insert with
    /// temp parents nulled, then patch parents from the id mapping once
    /// durable ids exist). Any failure drops the uncommitted transaction,
    /// so no partial mutation is ever visible.
    ///
    /// Returns the temp-id → durable-id mapping for every created node
    /// that carried a client temporary id.
    pub fn apply_structure(
        &self,
        project_id: &str,
        changes: &StructureChanges,
    ) -> Result<HashMap<String, String>> {
        let write_txn = self.db.begin_write()?;
        let mapping = {
            let mut table = write_txn.open_table(NODE_TABLE)?;

            // Deletions first, so freed slots cannot collide with
            // incoming creations. Non-recursive: the client lists every
            // removed id. Temp ids and foreign-project ids are skipped.
            for id in &changes.deleted {
                if is_temp_id(id) {
                    continue;
                }
                let belongs = match table.get(id.as_str())? {
                    Some(value) => {
                        let node: ProjectNode = serde_json::from_slice(value.value())?;
                        node.project_id == project_id
                    }
                    None => {
                        tracing::debug!(node = %id, "delete target not found, skipping");
                        false
                    }
                };
                if belongs {
                    table.remove(id.as_str())?;
                }
            }

            // Updates: pure field mutation, no structural effect.
            for update in &changes.updated {
                if is_temp_id(&update.id) {
                    continue;
                }
                let existing = match table.get(update.id.as_str())? {
                    Some(value) => {
                        let node: ProjectNode = serde_json::from_slice(value.value())?;
                        (node.project_id == project_id).then_some(node)
                    }
                    None => None,
                };
                let Some(mut node) = existing else {
                    tracing::debug!(node = %update.id, "update target not found, skipping");
                    continue;
                };

                if let Some(name) = &update.name {
                    node.name = name.trim().to_string();
                }
                if let Some(content) = &update.content
                    && node.kind == NodeKind::File
                {
                    node.content = content.clone();
                }
                node.updated_at = Utc::now();
                table.insert(node.id.as_str(), serde_json::to_vec(&node)?.as_slice())?;
            }

            // Creations, pass one: insert every new node, nulling the
            // parent whenever it is itself a not-yet-persisted temp id.
            let mut mapping = HashMap::new();
            let mut inserted: Vec<(ProjectNode, Option<String>)> = Vec::new();
            for created in &changes.created {
                let kind = NodeKind::parse(&created.kind)
                    .ok_or_else(|| anyhow!("invalid node type: {}", created.kind))?;
                let name = created.name.trim();
                if name.is_empty() {
                    bail!("node name cannot be empty");
                }

                let (parent_id, temp_parent) = match created.parent_id.as_deref() {
                    Some(p) if is_temp_id(p) => (None, Some(p.to_string())),
                    Some(p) => (Some(p.to_string()), None),
                    None => (None, None),
                };

                let node = ProjectNode::new(
                    project_id.to_string(),
                    parent_id,
                    name.to_string(),
                    kind,
                    created.content.clone().unwrap_or_default(),
                );
                if let Some(temp_id) = created.temp_id.as_deref().filter(|t| is_temp_id(t)) {
                    mapping.insert(temp_id.to_string(), node.id.clone());
                }
                table.insert(node.id.as_str(), serde_json::to_vec(&node)?.as_slice())?;
                inserted.push((node, temp_parent));
            }

            // Pass two: durable ids are known, patch parent references for
            // children whose parent was created in the same batch. A temp
            // parent absent from the mapping leaves the node at root.
            for (mut node, temp_parent) in inserted {
                let Some(temp) = temp_parent else { continue };
                let Some(durable) = mapping.get(&temp) else {
                    continue;
                };
                node.parent_id = Some(durable.clone());
                table.insert(node.id.as_str(), serde_json::to_vec(&node)?.as_slice())?;
            }

            mapping
        };
        write_txn.commit()?;
        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreatedNode, UpdatedNode};
    use tempfile::tempdir;

    fn storage() -> (NodeStorage, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::create(db_path).unwrap());
        (NodeStorage::new(db).unwrap(), temp_dir)
    }

    fn file_node(project_id: &str, parent: Option<&str>, name: &str) -> ProjectNode {
        ProjectNode::new(
            project_id.to_string(),
            parent.map(|p| p.to_string()),
            name.to_string(),
            NodeKind::File,
            String::new(),
        )
    }

    fn created(temp_id: &str, name: &str, kind: &str, parent: Option<&str>) -> CreatedNode {
        CreatedNode {
            temp_id: Some(temp_id.to_string()),
            name: name.to_string(),
            kind: kind.to_string(),
            parent_id: parent.map(|p| p.to_string()),
            content: None,
        }
    }

    #[test]
    fn test_delete_recursive_removes_subtree() {
        let (storage, _tmp) = storage();
        let root = ProjectNode::new(
            "p1".to_string(),
            None,
            "src".to_string(),
            NodeKind::Folder,
            String::new(),
        );
        let child = file_node("p1", Some(&root.id), "main.rs");
        let grandchild = file_node("p1", Some(&child.id), "nested.rs");
        let sibling = file_node("p1", None, "README.md");
        for node in [&root, &child, &grandchild, &sibling] {
            storage.create(node).unwrap();
        }

        let removed = storage.delete_recursive(&root.id).unwrap();
        assert_eq!(removed, 3);
        assert!(storage.get(&root.id).unwrap().is_none());
        assert!(storage.get(&grandchild.id).unwrap().is_none());
        assert!(storage.get(&sibling.id).unwrap().is_some());
    }

    #[test]
    fn test_apply_structure_maps_temp_ids() {
        let (storage, _tmp) = storage();
        let changes = StructureChanges {
            created: vec![created("temp-1", "a.js", "file", None)],
            ..Default::default()
        };

        let mapping = storage.apply_structure("p1", &changes).unwrap();
        let durable = mapping.get("temp-1").unwrap();

        let node = storage.get(durable).unwrap().unwrap();
        assert_eq!(node.name, "a.js");
        assert_eq!(node.parent_id, None);
    }

    #[test]
    fn test_apply_structure_resolves_temp_parent() {
        let (storage, _tmp) = storage();
        let changes = StructureChanges {
            created: vec![
                created("temp-dir", "src", "folder", None),
                created("temp-file", "main.rs", "file", Some("temp-dir")),
            ],
            ..Default::default()
        };

        let mapping = storage.apply_structure("p1", &changes).unwrap();
        let parent_id = mapping.get("temp-dir").unwrap();
        let child_id = mapping.get("temp-file").unwrap();

        let child = storage.get(child_id).unwrap().unwrap();
        // The persisted parent is the durable id, never the temp id.
        assert_eq!(child.parent_id.as_deref(), Some(parent_id.as_str()));
    }

    #[test]
    fn test_apply_structure_unresolvable_temp_parent_goes_to_root() {
        let (storage, _tmp) = storage();
        let changes = StructureChanges {
            created: vec![created("temp-1", "stray.rs", "file", Some("temp-absent"))],
            ..Default::default()
        };

        let mapping = storage.apply_structure("p1", &changes).unwrap();
        let node = storage.get(mapping.get("temp-1").unwrap()).unwrap().unwrap();
        assert_eq!(node.parent_id, None);
    }

    #[test]
    fn test_apply_structure_set_algebra() {
        let (storage, _tmp) = storage();
        let keep = file_node("p1", None, "keep.rs");
        let doomed = file_node("p1", None, "doomed.rs");
        let renamed = file_node("p1", None, "old-name.rs");
        for node in [&keep, &doomed, &renamed] {
            storage.create(node).unwrap();
        }

        let changes = StructureChanges {
            created: vec![created("temp-1", "new.rs", "file", None)],
            updated: vec![UpdatedNode {
                id: renamed.id.clone(),
                name: Some("new-name.rs".to_string()),
                content: Some("body".to_string()),
            }],
            deleted: vec![doomed.id.clone()],
        };
        storage.apply_structure("p1", &changes).unwrap();

        let nodes = storage.list_by_project("p1").unwrap();
        let names: HashSet<String> = nodes.iter().map(|n| n.name.clone()).collect();
        assert_eq!(
            names,
            HashSet::from([
                "keep.rs".to_string(),
                "new-name.rs".to_string(),
                "new.rs".to_string()
            ])
        );
        let patched = storage.get(&renamed.id).unwrap().unwrap();
        assert_eq!(patched.content, "body");
    }

    #[test]
    fn test_apply_structure_ignores_temp_and_foreign_targets() {
        let (storage, _tmp) = storage();
        let foreign = file_node("other-project", None, "theirs.rs");
        storage.create(&foreign).unwrap();

        let changes = StructureChanges {
            updated: vec![UpdatedNode {
                id: "temp-9".to_string(),
                name: Some("x".to_string()),
                content: None,
            }],
            deleted: vec!["temp-7".to_string(), foreign.id.clone(), "ghost".to_string()],
            ..Default::default()
        };
        storage.apply_structure("p1", &changes).unwrap();

        // Another project's node is never touched.
        assert!(storage.get(&foreign.id).unwrap().is_some());
    }

    #[test]
    fn test_apply_structure_rolls_back_on_failure() {
        let (storage, _tmp) = storage();
        let existing = file_node("p1", None, "survivor.rs");
        storage.create(&existing).unwrap();

        // Deletion is applied first inside the transaction; the invalid
        // created node then aborts the batch, which must undo it.
        let changes = StructureChanges {
            created: vec![created("temp-1", "bad", "symlink", None)],
            deleted: vec![existing.id.clone()],
            ..Default::default()
        };
        assert!(storage.apply_structure("p1", &changes).is_err());

        let nodes = storage.list_by_project("p1").unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, existing.id);
    }

    #[test]
    fn test_apply_structure_empty_batch() {
        let (storage, _tmp) = storage();
        let mapping = storage
            .apply_structure("p1", &StructureChanges::default())
            .unwrap();
        assert!(mapping.is_empty());
    }
}
