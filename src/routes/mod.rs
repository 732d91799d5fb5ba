pub mod channels;
pub mod contact;
pub mod status;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/", get(root))
        .route("/api/status", get(status::list).post(status::create))
        // Contact form
        .route("/api/contact-form", axum::routing::post(contact::submit))
        .route("/api/contact-submissions", get(contact::list))
        .route(
            "/api/contact-submissions/{id}/deliveries",
            get(contact::deliveries),
        )
        .route("/api/export-submissions-csv", get(contact::export))
        // Notification channels
        .route("/api/channels", get(channels::list_channels))
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Hello World" }))
}
