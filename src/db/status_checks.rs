use sqlx::PgPool;

use crate::models::StatusCheck;

pub async fn create(pool: &PgPool, check: &StatusCheck) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO status_checks (id, client_name, timestamp) VALUES ($1, $2, $3)")
        .bind(check.id)
        .bind(&check.client_name)
        .bind(check.timestamp)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list(pool: &PgPool, limit: i64) -> Result<Vec<StatusCheck>, sqlx::Error> {
    sqlx::query_as::<_, StatusCheck>(
        "SELECT * FROM status_checks ORDER BY timestamp ASC, id ASC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
