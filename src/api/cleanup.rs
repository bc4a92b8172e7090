use crate::api::{ApiResponse, state::AppState};
use crate::services;
use crate::storage::SweepReport;
use axum::extract::State;

// GET /api/cleanup
pub async fn run_cleanup(State(core): State<AppState>) -> ApiResponse<SweepReport> {
    match services::cleanup::run_cleanup(&core) {
        Ok(report) => ApiResponse::ok_with_message(report, "Cleanup completed"),
        Err(e) => e.into(),
    }
}
