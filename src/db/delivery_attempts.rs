use sqlx::PgPool;
use uuid::Uuid;

use crate::models::DeliveryAttempt;

pub async fn create(pool: &PgPool, attempt: &DeliveryAttempt) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO delivery_attempts (id, submission_id, channel, status, error, attempted_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(attempt.id)
    .bind(attempt.submission_id)
    .bind(&attempt.channel)
    .bind(&attempt.status)
    .bind(&attempt.error)
    .bind(attempt.attempted_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_by_submission(
    pool: &PgPool,
    submission_id: Uuid,
) -> Result<Vec<DeliveryAttempt>, sqlx::Error> {
    sqlx::query_as::<_, DeliveryAttempt>(
        "SELECT * FROM delivery_attempts WHERE submission_id = $1
         ORDER BY attempted_at ASC, id ASC",
    )
    .bind(submission_id)
    .fetch_all(pool)
    .await
}
