use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// File or folder discriminator for project nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "folder")]
    Folder,
}

impl NodeKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "file" => Some(Self::File),
            "folder" => Some(Self::Folder),
            _ => None,
        }
    }
}

/// One file or folder belonging to a project, linked to its parent by id.
///
/// Nodes form a forest per project: `parent_id` of `None` means root-level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNode {
    pub id: String,
    pub project_id: String,
    pub parent_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectNode {
    pub fn new(
        project_id: String,
        parent_id: Option<String>,
        name: String,
        kind: NodeKind,
        content: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            project_id,
            parent_id,
            name,
            kind,
            // Folders never carry content.
            content: match kind {
                NodeKind::File => content,
                NodeKind::Folder => String::new(),
            },
            created_at: now,
            updated_at: now,
        }
    }
}

/// A node with its children materialized, as returned by project retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    #[serde(flatten)]
    pub node: ProjectNode,
    pub children: Vec<FileNode>,
}

/// Materialize the flat node list into a nested tree in one linear pass.
///
/// Roots are nodes with no parent; a node whose parent is not in the list
/// is promoted to root. Children are ordered folders-first, then by name.
pub fn build_tree(nodes: Vec<ProjectNode>) -> Vec<FileNode> {
    let ids: HashSet<String> = nodes.iter().map(|n| n.id.clone()).collect();

    let mut children_of: HashMap<String, Vec<ProjectNode>> = HashMap::new();
    let mut roots = Vec::new();
    for node in nodes {
        match node.parent_id.clone().filter(|p| ids.contains(p)) {
            Some(parent) => children_of.entry(parent).or_default().push(node),
            None => roots.push(node),
        }
    }

    fn attach(
        mut level: Vec<ProjectNode>,
        children_of: &mut HashMap<String, Vec<ProjectNode>>,
    ) -> Vec<FileNode> {
        level.sort_by(|a, b| {
            (a.kind != NodeKind::Folder, a.name.to_lowercase())
                .cmp(&(b.kind != NodeKind::Folder, b.name.to_lowercase()))
        });
        level
            .into_iter()
            .map(|node| {
                let kids = children_of.remove(&node.id).unwrap_or_default();
                FileNode {
                    children: attach(kids, children_of),
                    node,
                }
            })
            .collect()
    }

    attach(roots, &mut children_of)
}

/// Client-minted placeholder identifiers carry a fixed prefix.
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with("temp-")
}

/// One batch of client-side tree edits for the reconciliation endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureChanges {
    #[serde(default)]
    pub created: Vec<CreatedNode>,
    #[serde(default)]
    pub updated: Vec<UpdatedNode>,
    #[serde(default)]
    pub deleted: Vec<String>,
}

impl StructureChanges {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }
}

/// A node the client added since the last save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedNode {
    #[serde(default)]
    pub temp_id: Option<String>,
    pub name: String,
    /// Validated against [`NodeKind`] inside the reconciliation transaction.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// An existing node whose name and/or content changed, addressed by
/// durable id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedNode {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}
