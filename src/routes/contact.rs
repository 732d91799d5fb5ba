use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::submissions::{ListParams, SortColumn, SortOrder};
use crate::error::AppError;
use crate::models::{ContactSubmission, DeliveryAttempt};
use crate::state::SharedState;
use crate::submission::fields::{self, ContactForm};

const MAX_LIST_LIMIT: i64 = 1000;

#[derive(Deserialize)]
pub struct ListQuery {
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub limit: Option<i64>,
}

pub async fn submit(
    State(state): State<SharedState>,
    Json(form): Json<ContactForm>,
) -> Result<Json<ContactSubmission>, AppError> {
    let validated = fields::validate(form).map_err(AppError::Validation)?;
    let submission = state.pipeline.submit(validated).await?;
    Ok(Json(submission))
}

pub async fn list(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ContactSubmission>>, AppError> {
    let limit = query.limit.unwrap_or(MAX_LIST_LIMIT);
    if !(1..=MAX_LIST_LIMIT).contains(&limit) {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIST_LIMIT}"
        )));
    }

    let params = ListParams {
        sort_by: SortColumn::parse(query.sort_by.as_deref().unwrap_or("created_at")),
        sort_order: SortOrder::parse(query.sort_order.as_deref().unwrap_or("desc")),
        limit,
    };

    let submissions = state.store.list_submissions(&params).await?;
    Ok(Json(submissions))
}

pub async fn deliveries(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<DeliveryAttempt>>, AppError> {
    let attempts = state.store.list_attempts(id).await?;
    Ok(Json(attempts))
}

pub async fn export(State(state): State<SharedState>) -> Result<impl IntoResponse, AppError> {
    let submissions = state.store.list_submissions(&ListParams::default()).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=contact_submissions.csv",
            ),
        ],
        export_csv(&submissions),
    ))
}

pub fn export_csv(submissions: &[ContactSubmission]) -> String {
    use std::fmt::Write;
    let mut csv = String::new();

    let _ = writeln!(csv, "Name,Email,Phone,Service,Message,Submission Date");

    for sub in submissions {
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{}",
            csv_escape(&sub.name),
            csv_escape(&sub.email),
            csv_escape(&sub.phone),
            csv_escape(&sub.service),
            csv_escape(&sub.message),
            sub.created_at.to_rfc3339()
        );
    }

    csv
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
