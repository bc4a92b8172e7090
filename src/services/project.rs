//! Project lifecycle: creation, retrieval with the materialized tree,
//! settings updates (name, access, expiry, slug), and cascade deletion.

use crate::AppCore;
use crate::error::ServiceError;
use crate::models::{AccessMode, ExpiresIn, FileNode, Project, build_tree, generate_share_id};

fn fresh_slug(core: &AppCore) -> Result<String, ServiceError> {
    loop {
        let slug = generate_share_id();
        if !core.storage.projects.slug_exists(&slug)? {
            return Ok(slug);
        }
    }
}

pub fn create_project(
    core: &AppCore,
    name: Option<String>,
    access: Option<String>,
    expires_in: Option<String>,
) -> Result<Project, ServiceError> {
    let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
        return Err(ServiceError::validation("name is required!"));
    };
    let access = match access.as_deref() {
        Some(raw) => {
            AccessMode::parse(raw).ok_or_else(|| ServiceError::validation("Invalid type value"))?
        }
        None => AccessMode::default(),
    };
    let expires_in = match expires_in.as_deref() {
        Some(raw) => ExpiresIn::parse(raw)
            .ok_or_else(|| ServiceError::validation("Invalid expiresIn value!"))?,
        None => ExpiresIn::default(),
    };

    let project = Project::new(
        name.trim().to_string(),
        access,
        expires_in,
        fresh_slug(core)?,
    );
    core.storage.projects.create(&project)?;
    Ok(project)
}

/// Fetch a project and its file structure as a nested tree.
pub fn get_project(core: &AppCore, slug: &str) -> Result<(Project, Vec<FileNode>), ServiceError> {
    let project = core
        .storage
        .projects
        .get_by_slug(slug)?
        .ok_or_else(|| ServiceError::not_found("Project not found"))?;

    let nodes = core.storage.nodes.list_by_project(&project.id)?;
    let tree = build_tree(nodes);
    Ok((project, tree))
}

pub fn update_project(
    core: &AppCore,
    slug: &str,
    name: Option<String>,
    access: Option<String>,
    expires_in: Option<String>,
    new_slug: Option<String>,
) -> Result<Project, ServiceError> {
    let mut project = core
        .storage
        .projects
        .get_by_slug(slug)?
        .ok_or_else(|| ServiceError::not_found("Project not found"))?;

    if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
        project.name = name.trim().to_string();
    }
    if let Some(raw) = access.as_deref() {
        project.access =
            AccessMode::parse(raw).ok_or_else(|| ServiceError::validation("Invalid type value"))?;
    }
    if let Some(new_slug) = new_slug {
        let new_slug = new_slug.trim().to_string();
        if new_slug != project.slug {
            if new_slug.len() < 5 {
                return Err(ServiceError::validation(
                    "Slug must be at least 5 characters long",
                ));
            }
            if new_slug.len() > 20 {
                return Err(ServiceError::validation("Slug must not exceed 20 characters"));
            }
            if core.storage.projects.slug_exists(&new_slug)? {
                return Err(ServiceError::conflict("Slug already taken"));
            }
            project.slug = new_slug;
        }
    }
    if let Some(raw) = expires_in.as_deref() {
        let expires_in = ExpiresIn::parse(raw)
            .ok_or_else(|| ServiceError::validation("Invalid expiresIn value!"))?;
        // Recomputed from "now", not from the original creation time.
        project.set_expires_in(expires_in);
    }

    core.storage.projects.update(&project, slug)?;
    Ok(project)
}

/// Delete a project and all of its nodes. Returns the node count removed.
pub fn delete_project(core: &AppCore, slug: &str) -> Result<u64, ServiceError> {
    core.storage
        .delete_project(slug)?
        .ok_or_else(|| ServiceError::not_found("Project not found"))
}
