use crate::api::{ApiResponse, state::AppState};
use crate::models::ProjectNode;
use crate::services;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodeRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub parent_id: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNodeRequest {
    pub name: Option<String>,
    pub content: Option<String>,
}

// POST /api/projects/{slug}/nodes
pub async fn create_node(
    State(core): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<CreateNodeRequest>,
) -> ApiResponse<ProjectNode> {
    match services::node::create_node(
        &core,
        &slug,
        request.name,
        request.kind,
        request.parent_id,
        request.content,
    ) {
        Ok(node) => ApiResponse::created(node, "Node created successfully"),
        Err(e) => e.into(),
    }
}

// PUT /api/projects/{slug}/nodes/{node_id}
pub async fn update_node(
    State(core): State<AppState>,
    Path((slug, node_id)): Path<(String, String)>,
    Json(request): Json<UpdateNodeRequest>,
) -> ApiResponse<ProjectNode> {
    match services::node::update_node(&core, &slug, &node_id, request.content, request.name) {
        Ok(node) => ApiResponse::ok_with_message(node, "Node updated successfully"),
        Err(e) => e.into(),
    }
}

// DELETE /api/projects/{slug}/nodes/{node_id}
pub async fn delete_node(
    State(core): State<AppState>,
    Path((slug, node_id)): Path<(String, String)>,
) -> ApiResponse<serde_json::Value> {
    match services::node::delete_node(&core, &slug, &node_id) {
        Ok(deleted) => ApiResponse::ok_with_message(
            serde_json::json!({ "deletedCount": deleted }),
            "Node deleted successfully",
        ),
        Err(e) => e.into(),
    }
}
