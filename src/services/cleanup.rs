//! Expiry and orphan sweep, callable from the API and the background task.

use crate::AppCore;
use crate::error::ServiceError;
use crate::storage::SweepReport;
use chrono::Utc;

pub fn run_cleanup(core: &AppCore) -> Result<SweepReport, ServiceError> {
    let report = core.storage.sweep(Utc::now())?;
    if report.deleted_projects > 0 || report.orphaned_nodes_deleted > 0 || report.deleted_snippets > 0
    {
        tracing::info!(
            deleted_projects = report.deleted_projects,
            orphaned_nodes = report.orphaned_nodes_deleted,
            deleted_snippets = report.deleted_snippets,
            "cleanup pass finished"
        );
    }
    Ok(report)
}
