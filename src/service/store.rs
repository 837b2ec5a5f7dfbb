use std::future::Future;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::models::practice::{
    Examination, NewAnswer, Question, QuestionOption, QuestionTemplate, Subject,
};

/// Filters applied when drawing the next question of an attempt.
#[derive(Debug, Clone, Copy)]
pub struct DrawFilter<'a> {
    pub subject_id: i64,
    pub exclude_ids: &'a [i64],
    pub exclude_type_id: i64,
    pub active_only: bool,
}

impl<'a> DrawFilter<'a> {
    pub fn dispensable(subject_id: i64, exclude_ids: &'a [i64], exclude_type_id: i64) -> Self {
        Self {
            subject_id,
            exclude_ids,
            exclude_type_id,
            active_only: true,
        }
    }

    pub fn accepts(&self, subject_id: i64, question: &Question) -> bool {
        subject_id == self.subject_id
            && !self.exclude_ids.contains(&question.id)
            && question.question_type_id != self.exclude_type_id
            && (!self.active_only || question.is_active)
    }
}

pub trait QuestionStore: Send + Sync {
    /// First template of the subject, counting only questions that could be
    /// dispensed (active, not of the excluded type).
    fn find_template(
        &self,
        subject_id: i64,
        exclude_type_id: i64,
    ) -> impl Future<Output = Result<Option<QuestionTemplate>, sqlx::Error>> + Send;

    /// Uniformly random question matching the filter, or none.
    fn draw_random_question(
        &self,
        filter: DrawFilter<'_>,
    ) -> impl Future<Output = Result<Option<Question>, sqlx::Error>> + Send;

    /// Questions for `ids`, returned in the order of `ids`.
    fn find_questions_ordered(
        &self,
        ids: &[i64],
    ) -> impl Future<Output = Result<Vec<Question>, sqlx::Error>> + Send;

    fn find_options(
        &self,
        question_id: i64,
    ) -> impl Future<Output = Result<Vec<QuestionOption>, sqlx::Error>> + Send;

    fn correct_option_ids(
        &self,
        question_id: i64,
    ) -> impl Future<Output = Result<Vec<i64>, sqlx::Error>> + Send;

    fn find_subject(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<Subject>, sqlx::Error>> + Send;

    fn list_subjects(&self) -> impl Future<Output = Result<Vec<Subject>, sqlx::Error>> + Send;
}

pub trait ExaminationStore: Send + Sync {
    fn create(
        &self,
        user_id: Uuid,
        subject_id: i64,
    ) -> impl Future<Output = Result<Examination, sqlx::Error>> + Send;

    fn find(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<Examination>, sqlx::Error>> + Send;

    fn create_answers(
        &self,
        examination_id: i64,
        answers: &[NewAnswer],
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    /// Option ids the student chose for a question, in insertion order.
    fn answered_option_ids(
        &self,
        examination_id: i64,
        question_id: i64,
    ) -> impl Future<Output = Result<Vec<i64>, sqlx::Error>> + Send;
}

/// Picks one candidate with equal probability.
pub fn pick_uniform<T: Copy>(candidates: &[T]) -> Option<T> {
    if candidates.is_empty() {
        return None;
    }

    let mut rng = ChaCha8Rng::from_os_rng();
    let idx = rng.random_range(0..candidates.len());
    candidates.get(idx).copied()
}
