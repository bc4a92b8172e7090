use crate::api::{ApiResponse, state::AppState};
use crate::models::StructureChanges;
use crate::services;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureResponse {
    /// Temp-id → durable-id mapping for nodes created in this batch.
    pub id_mapping: HashMap<String, String>,
}

// PUT /api/projects/{slug}/structure
pub async fn apply_structure(
    State(core): State<AppState>,
    Path(slug): Path<String>,
    Json(changes): Json<StructureChanges>,
) -> ApiResponse<StructureResponse> {
    match services::structure::apply_structure(&core, &slug, changes) {
        Ok(id_mapping) => ApiResponse::ok_with_message(
            StructureResponse { id_mapping },
            "Structure saved successfully",
        ),
        Err(e) => e.into(),
    }
}
