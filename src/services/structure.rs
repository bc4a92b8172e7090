//! The bulk structure save: validate a batch of client tree edits and
//! hand it to the storage-level reconciler.

use crate::AppCore;
use crate::error::ServiceError;
use crate::models::{NodeKind, StructureChanges};
use std::collections::HashMap;

/// Apply a `{created, updated, deleted}` batch to a project's tree.
///
/// Returns the temp-id → durable-id mapping the client needs to rewrite
/// its in-memory tree and selection state. The whole batch is applied
/// atomically; on error nothing was changed.
pub fn apply_structure(
    core: &AppCore,
    slug: &str,
    changes: StructureChanges,
) -> Result<HashMap<String, String>, ServiceError> {
    let project = core
        .storage
        .projects
        .get_by_slug(slug)?
        .ok_or_else(|| ServiceError::not_found("Project not found"))?;

    for created in &changes.created {
        if created.name.trim().is_empty() {
            return Err(ServiceError::validation("Node name cannot be empty"));
        }
        if NodeKind::parse(&created.kind).is_none() {
            return Err(ServiceError::validation("Invalid node type"));
        }
    }

    let mapping = core.storage.nodes.apply_structure(&project.id, &changes)?;
    tracing::info!(
        slug = %slug,
        created = changes.created.len(),
        updated = changes.updated.len(),
        deleted = changes.deleted.len(),
        "applied structure batch"
    );
    Ok(mapping)
}
