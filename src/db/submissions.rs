use sqlx::PgPool;

use crate::models::ContactSubmission;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortColumn {
    CreatedAt,
    Name,
}

impl SortColumn {
    pub fn parse(s: &str) -> Self {
        match s {
            "name" => SortColumn::Name,
            _ => SortColumn::CreatedAt,
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            SortColumn::CreatedAt => "created_at",
            SortColumn::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Self {
        match s {
            "asc" => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListParams {
    pub sort_by: SortColumn,
    pub sort_order: SortOrder,
    pub limit: i64,
}

impl Default for ListParams {
    /// Newest first, capped like the admin dashboard listing.
    fn default() -> Self {
        Self {
            sort_by: SortColumn::CreatedAt,
            sort_order: SortOrder::Desc,
            limit: 1000,
        }
    }
}

pub async fn create(
    pool: &PgPool,
    submission: &ContactSubmission,
) -> Result<ContactSubmission, sqlx::Error> {
    sqlx::query_as::<_, ContactSubmission>(
        "INSERT INTO contact_submissions (id, name, email, phone, service, message, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(submission.id)
    .bind(&submission.name)
    .bind(&submission.email)
    .bind(&submission.phone)
    .bind(&submission.service)
    .bind(&submission.message)
    .bind(submission.created_at)
    .fetch_one(pool)
    .await
}

pub async fn list(pool: &PgPool, params: &ListParams) -> Result<Vec<ContactSubmission>, sqlx::Error> {
    let sort_col = params.sort_by.as_sql();
    let order = params.sort_order.as_sql();

    // id breaks ties so repeated listings come back in the same order
    sqlx::query_as::<_, ContactSubmission>(&format!(
        "SELECT * FROM contact_submissions
         ORDER BY {sort_col} {order}, id {order} LIMIT $1"
    ))
    .bind(params.limit)
    .fetch_all(pool)
    .await
}
