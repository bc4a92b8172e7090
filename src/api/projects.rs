use crate::api::{ApiResponse, state::AppState};
use crate::config::AppConfig;
use crate::models::{ExpiresIn, FileNode, Project};
use crate::services;
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub access: Option<String>,
    pub expires_in: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub access: Option<String>,
    pub expires_in: Option<String>,
    pub slug: Option<String>,
}

/// Share info returned after creating or updating a project.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectShareInfo {
    pub slug: String,
    pub url: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: ExpiresIn,
}

impl ProjectShareInfo {
    fn new(config: &AppConfig, project: &Project) -> Self {
        Self {
            slug: project.slug.clone(),
            url: config.share_url(&project.slug),
            expires_at: project.expires_at,
            expires_in: project.expires_in,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub project: Project,
    pub file_structure: Vec<FileNode>,
    pub ws_url: String,
}

// POST /api/projects
pub async fn create_project(
    State(core): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> ApiResponse<ProjectShareInfo> {
    match services::project::create_project(&core, request.name, request.access, request.expires_in)
    {
        Ok(project) => ApiResponse::created(
            ProjectShareInfo::new(&core.config, &project),
            "Project created successfully",
        ),
        Err(e) => e.into(),
    }
}

// GET /api/projects/{slug}
pub async fn get_project(
    State(core): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResponse<ProjectView> {
    match services::project::get_project(&core, &slug) {
        Ok((project, file_structure)) => {
            let ws_url = core.config.live_url_for_project(&project.id);
            ApiResponse::ok_with_message(
                ProjectView {
                    project,
                    file_structure,
                    ws_url,
                },
                "Project retrieved successfully",
            )
        }
        Err(e) => e.into(),
    }
}

// PUT /api/projects/{slug}
pub async fn update_project(
    State(core): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<UpdateProjectRequest>,
) -> ApiResponse<ProjectShareInfo> {
    match services::project::update_project(
        &core,
        &slug,
        request.name,
        request.access,
        request.expires_in,
        request.slug,
    ) {
        Ok(project) => ApiResponse::ok_with_message(
            ProjectShareInfo::new(&core.config, &project),
            "Project updated successfully",
        ),
        Err(e) => e.into(),
    }
}

// DELETE /api/projects/{slug}
pub async fn delete_project(
    State(core): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResponse<serde_json::Value> {
    match services::project::delete_project(&core, &slug) {
        Ok(deleted_nodes) => ApiResponse::ok_with_message(
            serde_json::json!({ "deletedNodes": deleted_nodes }),
            "Project deleted successfully",
        ),
        Err(e) => e.into(),
    }
}
