use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperKind {
    Practice,
}

/// Session-scoped state of one practice attempt.
///
/// `served_question_ids` is the authoritative serve history, in order, and
/// never holds the same id twice. Mutation only happens through the methods
/// below so the quota and the history move together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSessionInfo {
    kind: PaperKind,
    examination_id: i64,
    student_id: Uuid,
    subject_id: i64,
    served_question_ids: Vec<i64>,
    remaining_quantity: u32,
}

impl QuizSessionInfo {
    pub fn new(
        examination_id: i64,
        student_id: Uuid,
        subject_id: i64,
        requested_quantity: u32,
        available_count: i64,
    ) -> Self {
        let available = available_count.clamp(0, u32::MAX as i64) as u32;

        Self {
            kind: PaperKind::Practice,
            examination_id,
            student_id,
            subject_id,
            served_question_ids: Vec::new(),
            remaining_quantity: requested_quantity.min(available),
        }
    }

    pub fn kind(&self) -> PaperKind {
        self.kind
    }

    pub fn examination_id(&self) -> i64 {
        self.examination_id
    }

    pub fn subject_id(&self) -> i64 {
        self.subject_id
    }

    pub fn served_question_ids(&self) -> &[i64] {
        &self.served_question_ids
    }

    pub fn remaining_quantity(&self) -> u32 {
        self.remaining_quantity
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_quantity == 0
    }

    pub fn last_served(&self) -> Option<i64> {
        self.served_question_ids.last().copied()
    }

    /// Appends a freshly drawn question and spends one unit of quota.
    /// Returns false and leaves the state untouched if the quota is spent or
    /// the id was already served.
    pub fn record_served(&mut self, question_id: i64) -> bool {
        if self.remaining_quantity == 0 || self.served_question_ids.contains(&question_id) {
            return false;
        }

        self.served_question_ids.push(question_id);
        self.remaining_quantity -= 1;
        true
    }

    pub fn finish(&mut self) {
        self.remaining_quantity = 0;
    }

    /// The ids that take part in scoring: everything served except the final
    /// draw. The last question flips the attempt to exhausted before the
    /// student can answer it, so it is never scored.
    pub fn scored_question_ids(&self) -> &[i64] {
        match self.served_question_ids.split_last() {
            Some((_, scored)) => scored,
            None => &[],
        }
    }
}
