//! Snippet lifecycle: create on share, save, retrieval, custom aliases,
//! and ephemeral live-session snippets.

use crate::AppCore;
use crate::error::ServiceError;
use crate::models::{AccessMode, ExpiresIn, Snippet, generate_share_id};
use crate::storage::RenameOutcome;
use chrono::Utc;

fn parse_access(value: Option<&str>) -> Result<AccessMode, ServiceError> {
    match value {
        Some(raw) => {
            AccessMode::parse(raw).ok_or_else(|| ServiceError::validation("Invalid type value"))
        }
        None => Ok(AccessMode::default()),
    }
}

fn parse_expires_in(value: Option<&str>) -> Result<ExpiresIn, ServiceError> {
    match value {
        Some(raw) => ExpiresIn::parse(raw)
            .ok_or_else(|| ServiceError::validation("Invalid expiresIn value!")),
        None => Ok(ExpiresIn::default()),
    }
}

fn fresh_share_id(core: &AppCore) -> Result<String, ServiceError> {
    // Re-roll on the (unlikely) collision with an existing share.
    loop {
        let share_id = generate_share_id();
        if !core.storage.snippets.exists(&share_id)? {
            return Ok(share_id);
        }
    }
}

pub fn create_snippet(
    core: &AppCore,
    filename: Option<String>,
    language: Option<String>,
    content: Option<String>,
    access: Option<String>,
) -> Result<Snippet, ServiceError> {
    let (Some(filename), Some(language)) = (
        filename.filter(|f| !f.trim().is_empty()),
        language.filter(|l| !l.trim().is_empty()),
    ) else {
        return Err(ServiceError::validation(
            "filename and language are required!",
        ));
    };
    let access = parse_access(access.as_deref())?;

    let snippet = Snippet::new(
        filename.trim().to_string(),
        language.trim().to_string(),
        content.unwrap_or_default(),
        access,
        ExpiresIn::default(),
        fresh_share_id(core)?,
    );
    core.storage.snippets.put(&snippet)?;
    Ok(snippet)
}

#[allow(clippy::too_many_arguments)]
pub fn update_snippet(
    core: &AppCore,
    share_id: &str,
    filename: Option<String>,
    language: Option<String>,
    content: Option<String>,
    access: Option<String>,
    expiry_time: Option<String>,
) -> Result<Snippet, ServiceError> {
    let (Some(filename), Some(language)) = (
        filename.filter(|f| !f.trim().is_empty()),
        language.filter(|l| !l.trim().is_empty()),
    ) else {
        return Err(ServiceError::validation(
            "filename and language are required!",
        ));
    };
    let access = parse_access(access.as_deref())?;
    let expires_in = parse_expires_in(expiry_time.as_deref())?;

    let mut snippet = core
        .storage
        .snippets
        .get(share_id)?
        .ok_or_else(|| ServiceError::not_found("File not found"))?;

    snippet.filename = filename.trim().to_string();
    snippet.language = language.trim().to_string();
    snippet.content = content.unwrap_or_default();
    snippet.access = access;
    snippet.set_expires_in(expires_in);
    snippet.updated_at = Utc::now();

    core.storage.snippets.put(&snippet)?;
    Ok(snippet)
}

pub fn get_snippet(core: &AppCore, share_id: &str) -> Result<Snippet, ServiceError> {
    core.storage
        .snippets
        .get(share_id)?
        .ok_or_else(|| ServiceError::not_found("File not found"))
}

/// Turn a random share-id into a human-chosen alias.
///
/// The alias must be 5-20 characters, previously unused, and different
/// from the current share-id. On success the snippet is reachable by the
/// alias only.
pub fn assign_alias(
    core: &AppCore,
    share_id: &str,
    alias: Option<String>,
) -> Result<Snippet, ServiceError> {
    let Some(alias) = alias.filter(|a| !a.trim().is_empty()) else {
        return Err(ServiceError::validation("Alias and shareId are required!"));
    };
    let alias = alias.trim().to_string();

    if alias == share_id {
        return Err(ServiceError::validation(
            "Custom alias cannot be the same as the current alias",
        ));
    }
    if alias.len() < 5 {
        return Err(ServiceError::validation(
            "Alias must be at least 5 characters long",
        ));
    }
    if alias.len() > 20 {
        return Err(ServiceError::validation("Alias must not exceed 20 characters"));
    }

    // Uniqueness is checked inside the rename transaction, so concurrent
    // requests for the same alias cannot both win.
    match core.storage.snippets.rename_share_id(share_id, &alias)? {
        RenameOutcome::Renamed(snippet) => Ok(snippet),
        RenameOutcome::AliasTaken => Err(ServiceError::conflict("Alias already exists")),
        RenameOutcome::SourceMissing => Err(ServiceError::not_found("Original file not found")),
    }
}

/// Create an ephemeral editable snippet backing a live co-editing session.
pub fn live_save(
    core: &AppCore,
    filename: Option<String>,
    content: Option<String>,
    expires_in: Option<String>,
) -> Result<Snippet, ServiceError> {
    let Some(filename) = filename.filter(|f| !f.trim().is_empty()) else {
        return Err(ServiceError::validation("filename is required!"));
    };
    let expires_in = parse_expires_in(expires_in.as_deref())?;

    let snippet = Snippet::new(
        filename.trim().to_string(),
        "plaintext".to_string(),
        content.unwrap_or_default(),
        AccessMode::Editable,
        expires_in,
        fresh_share_id(core)?,
    );
    core.storage.snippets.put(&snippet)?;
    Ok(snippet)
}
