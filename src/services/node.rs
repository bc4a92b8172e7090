//! Single-node operations: create, rename/edit, recursive delete.

use crate::AppCore;
use crate::error::ServiceError;
use crate::models::{NodeKind, Project, ProjectNode};
use chrono::Utc;

fn project_by_slug(core: &AppCore, slug: &str) -> Result<Project, ServiceError> {
    core.storage
        .projects
        .get_by_slug(slug)?
        .ok_or_else(|| ServiceError::not_found("Project not found"))
}

pub fn create_node(
    core: &AppCore,
    slug: &str,
    name: Option<String>,
    kind: Option<String>,
    parent_id: Option<String>,
    content: Option<String>,
) -> Result<ProjectNode, ServiceError> {
    let (Some(name), Some(kind)) = (
        name.filter(|n| !n.trim().is_empty()),
        kind.filter(|k| !k.is_empty()),
    ) else {
        return Err(ServiceError::validation("name and type are required"));
    };
    let kind =
        NodeKind::parse(&kind).ok_or_else(|| ServiceError::validation("Invalid node type"))?;

    let project = project_by_slug(core, slug)?;

    if let Some(parent_id) = &parent_id {
        let parent = core
            .storage
            .nodes
            .get(parent_id)?
            .filter(|p| p.project_id == project.id)
            .ok_or_else(|| {
                ServiceError::validation("Parent node not found in this project")
            })?;
        if parent.kind != NodeKind::Folder {
            return Err(ServiceError::validation("Parent must be a folder"));
        }
    }

    let node = ProjectNode::new(
        project.id,
        parent_id,
        name.trim().to_string(),
        kind,
        content.unwrap_or_default(),
    );
    core.storage.nodes.create(&node)?;
    Ok(node)
}

pub fn update_node(
    core: &AppCore,
    slug: &str,
    node_id: &str,
    content: Option<String>,
    name: Option<String>,
) -> Result<ProjectNode, ServiceError> {
    let mut node = core
        .storage
        .nodes
        .get(node_id)?
        .ok_or_else(|| ServiceError::not_found("File/Folder not found"))?;

    let project = project_by_slug(core, slug)?;
    if node.project_id != project.id {
        return Err(ServiceError::not_found("File/Folder not found"));
    }

    if content.is_some() && node.kind != NodeKind::File {
        return Err(ServiceError::validation("Cannot add content to a folder"));
    }
    if let Some(name) = &name
        && name.trim().is_empty()
    {
        return Err(ServiceError::validation("Name cannot be empty"));
    }

    if let Some(content) = content {
        node.content = content;
    }
    if let Some(name) = name {
        node.name = name.trim().to_string();
    }
    node.updated_at = Utc::now();

    core.storage.nodes.put(&node)?;
    Ok(node)
}

/// Delete a node and its entire subtree. Returns the number removed.
pub fn delete_node(core: &AppCore, slug: &str, node_id: &str) -> Result<u64, ServiceError> {
    let node = core
        .storage
        .nodes
        .get(node_id)?
        .ok_or_else(|| ServiceError::not_found("File/Folder not found"))?;

    let project = project_by_slug(core, slug)?;
    if node.project_id != project.id {
        return Err(ServiceError::not_found("File/Folder not found"));
    }

    Ok(core.storage.nodes.delete_recursive(node_id)?)
}
