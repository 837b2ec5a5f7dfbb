use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::models::{
    error::ServerError,
    system_log::{LogAction, LogCeverity, SubjectType},
};

pub struct NewSystemLog<'a> {
    pub subject_id: &'a str,
    pub subject_type: SubjectType,
    pub action: LogAction,
    pub ceverity: LogCeverity,
    pub function: &'a str,
    pub description: &'a str,
    pub metadata: Option<&'a serde_json::Value>,
}

pub async fn create_system_log(
    pool: &Pool<Postgres>,
    log: NewSystemLog<'_>,
) -> Result<(), ServerError> {
    let created_at = Utc::now();
    let row = sqlx::query(
        r#"
        INSERT INTO "system_log" (subject_id, subject_type, action, ceverity, function, description, metadata, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(log.subject_id)
    .bind(log.subject_type)
    .bind(log.action)
    .bind(log.ceverity)
    .bind(log.function)
    .bind(log.description)
    .bind(log.metadata)
    .bind(created_at)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        return Err(ServerError::Internal("Failed to create system log".into()));
    }

    Ok(())
}
