use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::StatusCheck;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateStatusCheck {
    pub client_name: String,
}

pub async fn create(
    State(state): State<SharedState>,
    Json(input): Json<CreateStatusCheck>,
) -> Result<Json<StatusCheck>, AppError> {
    let check = StatusCheck::new(input.client_name);
    state.store.insert_status_check(&check).await?;
    Ok(Json(check))
}

pub async fn list(State(state): State<SharedState>) -> Result<Json<Vec<StatusCheck>>, AppError> {
    let checks = state.store.list_status_checks(1000).await?;
    Ok(Json(checks))
}
