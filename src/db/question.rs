use sqlx::{Pool, Postgres};

use crate::{
    models::practice::{Question, QuestionOption, QuestionTemplate, Subject},
    service::store::{DrawFilter, QuestionStore, pick_uniform},
};

#[derive(Clone)]
pub struct PgQuestionStore {
    pool: Pool<Postgres>,
}

impl PgQuestionStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

impl QuestionStore for PgQuestionStore {
    async fn find_template(
        &self,
        subject_id: i64,
        exclude_type_id: i64,
    ) -> Result<Option<QuestionTemplate>, sqlx::Error> {
        sqlx::query_as::<_, QuestionTemplate>(
            r#"
            SELECT
                t.id,
                t.subject_id,
                COUNT(q.id) AS question_count
            FROM "question_template" t
            LEFT JOIN "question" q
            ON q.question_template_id = t.id
                AND q.is_active = true
                AND q.question_type_id <> $2
            WHERE t.subject_id = $1
            GROUP BY t.id, t.subject_id
            ORDER BY t.id
            LIMIT 1
            "#,
        )
        .bind(subject_id)
        .bind(exclude_type_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn draw_random_question(
        &self,
        filter: DrawFilter<'_>,
    ) -> Result<Option<Question>, sqlx::Error> {
        let candidates: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT q.id
            FROM "question" q
            JOIN "question_template" t
            ON t.id = q.question_template_id
            WHERE t.subject_id = $1
                AND NOT (q.id = ANY($2))
                AND q.question_type_id <> $3
                AND ($4 = false OR q.is_active = true)
            "#,
        )
        .bind(filter.subject_id)
        .bind(filter.exclude_ids)
        .bind(filter.exclude_type_id)
        .bind(filter.active_only)
        .fetch_all(&self.pool)
        .await?;

        let Some(id) = pick_uniform(&candidates) else {
            return Ok(None);
        };

        sqlx::query_as::<_, Question>(
            r#"
            SELECT id, question_template_id, question_type_id, title, is_active
            FROM "question"
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_questions_ordered(&self, ids: &[i64]) -> Result<Vec<Question>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Question>(
            r#"
            SELECT id, question_template_id, question_type_id, title, is_active
            FROM "question"
            WHERE id = ANY($1)
            ORDER BY array_position($1, id)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
    }

    async fn find_options(&self, question_id: i64) -> Result<Vec<QuestionOption>, sqlx::Error> {
        sqlx::query_as::<_, QuestionOption>(
            r#"
            SELECT id, question_id, label
            FROM "question_option"
            WHERE question_id = $1
            ORDER BY id
            "#,
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn correct_option_ids(&self, question_id: i64) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT option_id
            FROM "correct_answer"
            WHERE question_id = $1
            "#,
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn find_subject(&self, id: i64) -> Result<Option<Subject>, sqlx::Error> {
        sqlx::query_as::<_, Subject>(
            r#"
            SELECT id, name, code
            FROM "subject"
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, sqlx::Error> {
        sqlx::query_as::<_, Subject>(
            r#"
            SELECT id, name, code
            FROM "subject"
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
