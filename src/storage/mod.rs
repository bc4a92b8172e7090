//! Persistence layer over redb.
//!
//! One embedded database file, separate tables per entity type, documents
//! stored as JSON bytes. Multi-entity operations (project cascade delete,
//! the expiry sweep) open every table they touch from a single write
//! transaction so they commit or roll back as one unit.
//!
//! # Tables
//!
//! - `snippets` - single shared files, keyed by share-id
//! - `projects` - project documents, keyed by id
//! - `project_slugs` - slug → project id index
//! - `project_nodes` - file/folder nodes, keyed by id

pub mod node;
pub mod project;
pub mod snippet;

use anyhow::Result;
use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

pub use node::NodeStorage;
pub use project::ProjectStorage;
pub use snippet::{RenameOutcome, SnippetStorage};

use crate::models::{Project, ProjectNode, Snippet};

/// Central storage manager that initializes all storage subsystems.
pub struct Storage {
    db: Arc<Database>,
    pub snippets: SnippetStorage,
    pub projects: ProjectStorage,
    pub nodes: NodeStorage,
}

/// Counts reported by one cleanup pass.
#[derive(Debug, Default, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub deleted_projects: u64,
    pub orphaned_nodes_deleted: u64,
    pub deleted_snippets: u64,
}

impl Storage {
    /// Create a new storage instance at the given path.
    ///
    /// This will create the database file if it doesn't exist and
    /// initialize all required tables.
    pub fn new(path: &str) -> Result<Self> {
        let db = Arc::new(Database::create(path)?);

        let snippets = SnippetStorage::new(db.clone())?;
        let projects = ProjectStorage::new(db.clone())?;
        let nodes = NodeStorage::new(db.clone())?;

        Ok(Self {
            db,
            snippets,
            projects,
            nodes,
        })
    }

    /// Delete a project and every node it owns in one transaction.
    ///
    /// Returns the number of nodes removed, or `None` when the slug is
    /// unknown.
    pub fn delete_project(&self, slug: &str) -> Result<Option<u64>> {
        let write_txn = self.db.begin_write()?;
        let removed_nodes = {
            let mut slugs = write_txn.open_table(project::PROJECT_SLUG_TABLE)?;
            let project_id = match slugs.remove(slug)? {
                Some(value) => value.value().to_string(),
                None => return Ok(None),
            };

            let mut projects = write_txn.open_table(project::PROJECT_TABLE)?;
            projects.remove(project_id.as_str())?;

            let mut nodes = write_txn.open_table(node::NODE_TABLE)?;
            let mut doomed = Vec::new();
            for item in nodes.iter()? {
                let (key, value) = item?;
                let node: ProjectNode = serde_json::from_slice(value.value())?;
                if node.project_id == project_id {
                    doomed.push(key.value().to_string());
                }
            }
            for id in &doomed {
                nodes.remove(id.as_str())?;
            }
            doomed.len() as u64
        };
        write_txn.commit()?;
        Ok(Some(removed_nodes))
    }

    /// The cleanup pass: expired projects cascade to their nodes, then an
    /// independent orphan sweep removes nodes whose owning project no
    /// longer exists, then expired snippets are dropped.
    pub fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let write_txn = self.db.begin_write()?;
        let report = {
            let mut projects = write_txn.open_table(project::PROJECT_TABLE)?;
            let mut slugs = write_txn.open_table(project::PROJECT_SLUG_TABLE)?;
            let mut nodes = write_txn.open_table(node::NODE_TABLE)?;
            let mut snippets = write_txn.open_table(snippet::SNIPPET_TABLE)?;

            let mut all_projects = Vec::new();
            for item in projects.iter()? {
                let (_, value) = item?;
                let project: Project = serde_json::from_slice(value.value())?;
                all_projects.push(project);
            }

            let mut expired_ids = HashSet::new();
            let mut live_ids = HashSet::new();
            for project in &all_projects {
                if project.is_expired(now) {
                    expired_ids.insert(project.id.clone());
                } else {
                    live_ids.insert(project.id.clone());
                }
            }
            for project in &all_projects {
                if expired_ids.contains(&project.id) {
                    projects.remove(project.id.as_str())?;
                    slugs.remove(project.slug.as_str())?;
                    tracing::info!(slug = %project.slug, "removed expired project");
                }
            }

            let mut node_owners = Vec::new();
            for item in nodes.iter()? {
                let (key, value) = item?;
                let node: ProjectNode = serde_json::from_slice(value.value())?;
                node_owners.push((key.value().to_string(), node.project_id));
            }
            let mut orphaned = 0u64;
            for (node_id, owner) in node_owners {
                if expired_ids.contains(&owner) {
                    nodes.remove(node_id.as_str())?;
                } else if !live_ids.contains(&owner) {
                    nodes.remove(node_id.as_str())?;
                    orphaned += 1;
                }
            }

            let mut expired_snippets = Vec::new();
            for item in snippets.iter()? {
                let (key, value) = item?;
                let snippet: Snippet = serde_json::from_slice(value.value())?;
                if snippet.expires_at < now {
                    expired_snippets.push(key.value().to_string());
                }
            }
            for share_id in &expired_snippets {
                snippets.remove(share_id.as_str())?;
            }

            SweepReport {
                deleted_projects: expired_ids.len() as u64,
                orphaned_nodes_deleted: orphaned,
                deleted_snippets: expired_snippets.len() as u64,
            }
        };
        write_txn.commit()?;
        Ok(report)
    }
}
