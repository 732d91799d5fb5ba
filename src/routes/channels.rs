use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::state::SharedState;

pub async fn list_channels(State(state): State<SharedState>) -> Json<serde_json::Value> {
    let channels: Vec<&str> = state
        .pipeline
        .channel_kinds()
        .iter()
        .map(|kind| kind.as_str())
        .collect();

    Json(json!({
        "channels": channels,
        "in_flight": state.pipeline.in_flight(),
    }))
}
