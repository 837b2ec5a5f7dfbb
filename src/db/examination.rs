use sqlx::{Pool, Postgres, QueryBuilder};
use tracing::warn;
use uuid::Uuid;

use crate::{
    models::practice::{Examination, NewAnswer},
    service::store::ExaminationStore,
};

#[derive(Clone)]
pub struct PgExaminationStore {
    pool: Pool<Postgres>,
}

impl PgExaminationStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

impl ExaminationStore for PgExaminationStore {
    async fn create(&self, user_id: Uuid, subject_id: i64) -> Result<Examination, sqlx::Error> {
        sqlx::query_as::<_, Examination>(
            r#"
            INSERT INTO "examination" (user_id, subject_id, created_at)
            VALUES ($1, $2, now())
            RETURNING id, user_id, subject_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(subject_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn find(&self, id: i64) -> Result<Option<Examination>, sqlx::Error> {
        sqlx::query_as::<_, Examination>(
            r#"
            SELECT id, user_id, subject_id, created_at
            FROM "examination"
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_answers(
        &self,
        examination_id: i64,
        answers: &[NewAnswer],
    ) -> Result<(), sqlx::Error> {
        if answers.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"INSERT INTO "answer" (examination_id, question_id, option_id, answer) "#,
        );

        builder.push_values(answers, |mut row, answer| {
            row.push_bind(examination_id)
                .push_bind(answer.question_id)
                .push_bind(answer.option_id)
                .push_bind(answer.answer);
        });

        let row = builder.build().execute(&self.pool).await?;

        if row.rows_affected() != answers.len() as u64 {
            warn!(
                "Expected {} answers for examination {}, stored {}",
                answers.len(),
                examination_id,
                row.rows_affected()
            );
        }

        Ok(())
    }

    async fn answered_option_ids(
        &self,
        examination_id: i64,
        question_id: i64,
    ) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT option_id
            FROM "answer"
            WHERE examination_id = $1 AND question_id = $2
            ORDER BY id
            "#,
        )
        .bind(examination_id)
        .bind(question_id)
        .fetch_all(&self.pool)
        .await
    }
}
