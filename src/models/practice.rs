use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
}

/// A grouping of questions under a subject. Only used to cap the requested
/// quantity, so the row carries a precomputed count.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuestionTemplate {
    pub id: i64,
    pub subject_id: i64,
    pub question_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question_template_id: i64,
    pub question_type_id: i64,
    pub title: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct QuestionOption {
    pub id: i64,
    pub question_id: i64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Examination {
    pub id: i64,
    pub user_id: Uuid,
    pub subject_id: i64,
    pub created_at: DateTime<Utc>,
}

/// One chosen option. `answer` records that the student picked it, not
/// whether it was right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAnswer {
    pub question_id: i64,
    pub option_id: i64,
    pub answer: bool,
}

impl NewAnswer {
    pub fn chosen(question_id: i64, option_id: i64) -> Self {
        Self {
            question_id,
            option_id,
            answer: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SelectSubjectRequest {
    #[validate(required(message = "The subject id field is required."))]
    pub subject_id: Option<i64>,
    #[validate(
        required(message = "The question quantity field is required."),
        range(min = 1, message = "The question quantity must be at least 1.")
    )]
    pub question_quantity: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(required(message = "The question id field is required."))]
    pub question_id: Option<i64>,
    #[validate(
        required(message = "The options field is required."),
        length(min = 1, message = "Choose at least one option.")
    )]
    pub options: Option<Vec<i64>>,
}

/// A question as served during dispensing. The answer lists stay empty until
/// the summary phase.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub question: Question,
    pub question_options: Vec<QuestionOption>,
    pub correct_answers: Vec<i64>,
    pub student_answer: Vec<i64>,
}

impl QuestionView {
    pub fn unanswered(question: Question, question_options: Vec<QuestionOption>) -> Self {
        Self {
            question,
            question_options,
            correct_answers: Vec::new(),
            student_answer: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredQuestion {
    pub question: Question,
    pub question_options: Vec<QuestionOption>,
    pub student_answer: Vec<i64>,
    pub original_answer: Vec<i64>,
    pub is_correct_answer: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Summary {
    Unavailable {
        notice: String,
    },
    Scored {
        subject: Option<Subject>,
        total_questions: Vec<ScoredQuestion>,
        right_answer: u32,
        wrong_answer: u32,
    },
}

#[derive(Debug, Serialize)]
pub struct SubjectListResponse {
    pub subjects: Vec<Subject>,
    pub flash: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub question_id: i64,
    pub recorded: usize,
}
