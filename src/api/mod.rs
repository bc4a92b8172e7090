pub mod cleanup;
pub mod live;
pub mod nodes;
pub mod projects;
pub mod response;
pub mod snippets;
pub mod state;
pub mod structure;

pub use response::ApiResponse;
pub use state::AppState;

use axum::{
    Json, Router,
    http::{Method, header},
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;

#[derive(serde::Serialize)]
struct Health {
    status: String,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "codeurl is working!".to_string(),
    })
}

/// Build the full application router with CORS applied.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        // Snippet sharing
        .route("/api/folder/save", post(snippets::save_snippet))
        .route("/api/folder/done/{share_id}", post(snippets::finish_snippet))
        .route("/api/folder/share/{share_id}", get(snippets::get_snippet))
        .route("/api/folder/alias/{share_id}", post(snippets::assign_alias))
        .route("/api/folder/LiveSave", post(snippets::live_save))
        .route("/api/folder/live/{share_id}", get(snippets::get_live_snippet))
        // Project management
        .route("/api/projects", post(projects::create_project))
        .route(
            "/api/projects/{slug}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/api/projects/{slug}/nodes", post(nodes::create_node))
        .route(
            "/api/projects/{slug}/nodes/{node_id}",
            put(nodes::update_node).delete(nodes::delete_node),
        )
        .route(
            "/api/projects/{slug}/structure",
            put(structure::apply_structure),
        )
        // Maintenance
        .route("/api/cleanup", get(cleanup::run_cleanup))
        // Live co-editing socket
        .route("/api/live", get(live::live_handler))
        .layer(cors)
        .with_state(state)
}
