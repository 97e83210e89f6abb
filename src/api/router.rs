use crate::api;
use crate::api::middleware::AppState;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Template management (consumed by the dashboard UI)
        .route("/api/templates", post(api::templates::create_template))
        .route("/api/templates", get(api::templates::list_templates))
        .route("/api/templates/sync", post(api::templates::sync_templates))
        .route(
            "/api/templates/repair",
            post(api::templates::repair_templates),
        )
        .route("/api/templates/:name", get(api::templates::get_template))
        .route(
            "/api/templates/:name",
            patch(api::templates::update_template),
        )
        .route(
            "/api/templates/:name",
            delete(api::templates::delete_template),
        )
        // Message sending and audit log
        .route(
            "/api/messages/send",
            post(api::messages::send_template_message),
        )
        .route("/api/messages/text", post(api::messages::send_text_message))
        .route("/api/messages/log", get(api::messages::list_send_log))
        // Trigger surface (consumed by event producers)
        .route("/api/automation", post(api::automation::automation_send))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
