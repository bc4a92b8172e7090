use crate::api::{ApiResponse, state::AppState};
use crate::models::{AccessMode, ExpiresIn, Snippet};
use crate::services;
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSnippetRequest {
    pub filename: Option<String>,
    pub language: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub access: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishSnippetRequest {
    pub filename: Option<String>,
    pub language: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub access: Option<String>,
    #[serde(rename = "expiryTime")]
    pub expiry_time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AliasRequest {
    pub alias: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSaveRequest {
    pub filename: Option<String>,
    pub content: Option<String>,
    pub expires_in: Option<String>,
}

/// Share info returned after creating, finishing, or aliasing a snippet.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetShareInfo {
    pub share_id: String,
    pub url: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: ExpiresIn,
}

impl SnippetShareInfo {
    fn new(core: &AppState, snippet: &Snippet) -> Self {
        Self {
            share_id: snippet.share_id.clone(),
            url: core.config.share_url(&snippet.share_id),
            expires_at: snippet.expires_at,
            expires_in: snippet.expires_in,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSnippetView {
    #[serde(flatten)]
    pub snippet: Snippet,
    pub ws_url: String,
}

// POST /api/folder/save
pub async fn save_snippet(
    State(core): State<AppState>,
    Json(request): Json<SaveSnippetRequest>,
) -> ApiResponse<SnippetShareInfo> {
    match services::snippet::create_snippet(
        &core,
        request.filename,
        request.language,
        request.content,
        request.access,
    ) {
        Ok(snippet) => ApiResponse::created(
            SnippetShareInfo::new(&core, &snippet),
            "File saved successfully",
        ),
        Err(e) => e.into(),
    }
}

// POST /api/folder/done/{share_id}
pub async fn finish_snippet(
    State(core): State<AppState>,
    Path(share_id): Path<String>,
    Json(request): Json<FinishSnippetRequest>,
) -> ApiResponse<SnippetShareInfo> {
    match services::snippet::update_snippet(
        &core,
        &share_id,
        request.filename,
        request.language,
        request.content,
        request.access,
        request.expiry_time,
    ) {
        Ok(snippet) => ApiResponse::ok_with_message(
            SnippetShareInfo::new(&core, &snippet),
            "File updated successfully",
        ),
        Err(e) => e.into(),
    }
}

// GET /api/folder/share/{share_id}
pub async fn get_snippet(
    State(core): State<AppState>,
    Path(share_id): Path<String>,
) -> ApiResponse<Snippet> {
    match services::snippet::get_snippet(&core, &share_id) {
        Ok(snippet) => ApiResponse::ok(snippet),
        Err(e) => e.into(),
    }
}

// POST /api/folder/alias/{share_id}
pub async fn assign_alias(
    State(core): State<AppState>,
    Path(share_id): Path<String>,
    Json(request): Json<AliasRequest>,
) -> ApiResponse<SnippetShareInfo> {
    match services::snippet::assign_alias(&core, &share_id, request.alias) {
        Ok(snippet) => ApiResponse::ok_with_message(
            SnippetShareInfo::new(&core, &snippet),
            "Alias assigned successfully",
        ),
        Err(e) => e.into(),
    }
}

// POST /api/folder/LiveSave
pub async fn live_save(
    State(core): State<AppState>,
    Json(request): Json<LiveSaveRequest>,
) -> ApiResponse<LiveSnippetView> {
    match services::snippet::live_save(&core, request.filename, request.content, request.expires_in)
    {
        Ok(snippet) => {
            let ws_url = core.config.live_url_for_share(&snippet.share_id);
            ApiResponse::created(
                LiveSnippetView { snippet, ws_url },
                "Live session created",
            )
        }
        Err(e) => e.into(),
    }
}

// GET /api/folder/live/{share_id}
pub async fn get_live_snippet(
    State(core): State<AppState>,
    Path(share_id): Path<String>,
) -> ApiResponse<LiveSnippetView> {
    match services::snippet::get_snippet(&core, &share_id) {
        Ok(snippet) => {
            let ws_url = core.config.live_url_for_share(&snippet.share_id);
            ApiResponse::ok(LiveSnippetView { snippet, ws_url })
        }
        Err(e) => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppCore;
    use crate::config::AppConfig;
    use std::sync::Arc;
    use tempfile::{TempDir, tempdir};

    fn create_test_app() -> (Arc<AppCore>, TempDir) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let core = Arc::new(
            AppCore::new(db_path.to_str().unwrap(), AppConfig::default()).unwrap(),
        );
        (core, temp_dir)
    }

    fn save_request() -> SaveSnippetRequest {
        SaveSnippetRequest {
            filename: Some("main.rs".to_string()),
            language: Some("rust".to_string()),
            content: Some("fn main() {}".to_string()),
            access: Some("editable".to_string()),
        }
    }

    #[tokio::test]
    async fn test_save_snippet_returns_share_link() {
        let (app, _tmp_dir) = create_test_app();

        let response = save_snippet(State(app), Json(save_request())).await;

        assert!(response.success);
        assert_eq!(response.status_code, 201);
        let info = response.data.unwrap();
        assert_eq!(info.share_id.len(), 8);
        assert!(info.url.ends_with(&info.share_id));
        assert_eq!(info.expires_in, ExpiresIn::OneHour);
    }

    #[tokio::test]
    async fn test_save_snippet_requires_filename_and_language() {
        let (app, _tmp_dir) = create_test_app();

        let request = SaveSnippetRequest {
            filename: Some("main.rs".to_string()),
            language: None,
            content: None,
            access: None,
        };
        let response = save_snippet(State(app), Json(request)).await;

        assert!(!response.success);
        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.message.unwrap(),
            "filename and language are required!"
        );
    }

    #[tokio::test]
    async fn test_finish_snippet_changes_expiry() {
        let (app, _tmp_dir) = create_test_app();
        let saved = save_snippet(State(app.clone()), Json(save_request())).await;
        let share_id = saved.data.unwrap().share_id;

        let request = FinishSnippetRequest {
            filename: Some("lib.rs".to_string()),
            language: Some("rust".to_string()),
            content: Some("pub fn run() {}".to_string()),
            access: Some("read-only".to_string()),
            expiry_time: Some("2d".to_string()),
        };
        let before = Utc::now();
        let response = finish_snippet(State(app.clone()), Path(share_id.clone()), Json(request)).await;

        assert!(response.success);
        let info = response.data.unwrap();
        assert_eq!(info.expires_in, ExpiresIn::TwoDays);
        let offset = (info.expires_at - before).num_milliseconds();
        assert!((offset - 172_800_000).abs() < 2_000);

        let fetched = get_snippet(State(app), Path(share_id)).await;
        let snippet = fetched.data.unwrap();
        assert_eq!(snippet.filename, "lib.rs");
        assert_eq!(snippet.access, AccessMode::ReadOnly);
    }

    #[tokio::test]
    async fn test_get_unknown_snippet() {
        let (app, _tmp_dir) = create_test_app();

        let response = get_snippet(State(app), Path("nope1234".to_string())).await;
        assert!(!response.success);
        assert_eq!(response.status_code, 404);
        assert_eq!(response.message.unwrap(), "File not found");
    }

    #[tokio::test]
    async fn test_assign_alias_moves_share_id() {
        let (app, _tmp_dir) = create_test_app();
        let saved = save_snippet(State(app.clone()), Json(save_request())).await;
        let share_id = saved.data.unwrap().share_id;

        let request = AliasRequest {
            alias: Some("my-snippet".to_string()),
        };
        let response = assign_alias(State(app.clone()), Path(share_id.clone()), Json(request)).await;

        assert!(response.success);
        assert_eq!(response.data.unwrap().share_id, "my-snippet");

        let stale = get_snippet(State(app.clone()), Path(share_id)).await;
        assert_eq!(stale.status_code, 404);
        let fresh = get_snippet(State(app), Path("my-snippet".to_string())).await;
        assert!(fresh.success);
    }

    #[tokio::test]
    async fn test_assign_alias_conflict() {
        let (app, _tmp_dir) = create_test_app();
        let first = save_snippet(State(app.clone()), Json(save_request())).await;
        let first_id = first.data.unwrap().share_id;
        assign_alias(
            State(app.clone()),
            Path(first_id),
            Json(AliasRequest {
                alias: Some("taken-alias".to_string()),
            }),
        )
        .await;

        let second = save_snippet(State(app.clone()), Json(save_request())).await;
        let second_id = second.data.unwrap().share_id;
        let response = assign_alias(
            State(app),
            Path(second_id),
            Json(AliasRequest {
                alias: Some("taken-alias".to_string()),
            }),
        )
        .await;

        assert!(!response.success);
        assert_eq!(response.status_code, 409);
        assert_eq!(response.message.unwrap(), "Alias already exists");
    }

    #[tokio::test]
    async fn test_assign_alias_length_bounds() {
        let (app, _tmp_dir) = create_test_app();
        let saved = save_snippet(State(app.clone()), Json(save_request())).await;
        let share_id = saved.data.unwrap().share_id;

        let short = assign_alias(
            State(app.clone()),
            Path(share_id.clone()),
            Json(AliasRequest {
                alias: Some("abcd".to_string()),
            }),
        )
        .await;
        assert_eq!(short.status_code, 400);

        let long = assign_alias(
            State(app),
            Path(share_id),
            Json(AliasRequest {
                alias: Some("a".repeat(21)),
            }),
        )
        .await;
        assert_eq!(long.status_code, 400);
    }

    #[tokio::test]
    async fn test_live_save_returns_socket_url() {
        let (app, _tmp_dir) = create_test_app();

        let request = LiveSaveRequest {
            filename: Some("notes.txt".to_string()),
            content: Some("hello".to_string()),
            expires_in: Some("1m".to_string()),
        };
        let response = live_save(State(app.clone()), Json(request)).await;

        assert!(response.success);
        assert_eq!(response.status_code, 201);
        let view = response.data.unwrap();
        assert_eq!(view.snippet.language, "plaintext");
        assert_eq!(view.snippet.access, AccessMode::Editable);
        assert!(view.ws_url.contains(&view.snippet.share_id));

        let fetched = get_live_snippet(State(app), Path(view.snippet.share_id.clone())).await;
        assert!(fetched.success);
        assert_eq!(fetched.data.unwrap().ws_url, view.ws_url);
    }

    #[tokio::test]
    async fn test_live_snippet_view_flattens_snippet() {
        let (app, _tmp_dir) = create_test_app();
        let request = LiveSaveRequest {
            filename: Some("notes.txt".to_string()),
            content: None,
            expires_in: None,
        };
        let response = live_save(State(app), Json(request)).await;

        let value = serde_json::to_value(response.data.unwrap()).unwrap();
        assert!(value["shareId"].is_string());
        assert!(value["wsUrl"].is_string());
    }
}
