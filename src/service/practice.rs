use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::app_config::{ExhaustionPolicy, PracticeConfig, SubmissionPolicy},
    models::{
        auth::CurrentUser,
        practice::{NewAnswer, QuestionView, ScoredQuestion, Subject, Summary},
        session::{PaperKind, QuizSessionInfo},
    },
    service::{
        scoring::{ScoreTally, answers_match},
        session_store::SessionStore,
        store::{DrawFilter, ExaminationStore, QuestionStore},
    },
};

pub static NO_SUMMARY_NOTICE: &str = "You have no summary yet.";

#[derive(Debug, Error)]
pub enum PracticeError {
    #[error("Store failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("No qualifying question left for subject {subject_id}")]
    NoQualifyingQuestion { subject_id: i64 },

    #[error("No practice session in progress")]
    NoActiveSession,

    #[error("Examination {0} does not exist")]
    ExaminationMissing(i64),

    #[error("Question {received} is not the last served question ({expected:?})")]
    SubmissionMismatch {
        expected: Option<i64>,
        received: i64,
    },
}

/// Entry page outcome.
#[derive(Debug)]
pub enum SubjectOverview {
    /// A practice attempt is running, continue it.
    Resume,
    Subjects {
        subjects: Vec<Subject>,
        flash: Option<String>,
    },
}

/// Outcome of asking for the next question.
#[derive(Debug)]
pub enum Dispense {
    SelectSubject,
    Summary,
    /// The quota asked for a question the store could not provide. The
    /// attempt was finished early.
    DrawExhausted { subject_id: i64 },
    Question(QuestionView),
}

/// Drives one student's practice attempt: subject selection, question
/// dispensing, answer recording and scoring.
pub struct PracticeService<Q, E> {
    questions: Q,
    examinations: E,
    sessions: SessionStore,
    config: PracticeConfig,
}

impl<Q, E> PracticeService<Q, E>
where
    Q: QuestionStore,
    E: ExaminationStore,
{
    pub fn new(
        questions: Q,
        examinations: E,
        sessions: SessionStore,
        config: PracticeConfig,
    ) -> Self {
        Self {
            questions,
            examinations,
            sessions,
            config,
        }
    }

    #[cfg(test)]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn subject_overview(&self, user_id: Uuid) -> Result<SubjectOverview, PracticeError> {
        let _guard = self.sessions.lock(user_id).await;

        if let Some(info) = self.sessions.get_quiz(user_id).await {
            if info.kind() == PaperKind::Practice {
                return Ok(SubjectOverview::Resume);
            }
        }

        let subjects = self.questions.list_subjects().await?;
        let flash = self.sessions.take_flash(user_id).await;

        Ok(SubjectOverview::Subjects { subjects, flash })
    }

    /// Opens a new examination and replaces whatever session the user had.
    pub async fn select_subject(
        &self,
        user_id: Uuid,
        subject_id: i64,
        requested_quantity: u32,
    ) -> Result<QuizSessionInfo, PracticeError> {
        let _guard = self.sessions.lock(user_id).await;

        let available = match self
            .questions
            .find_template(subject_id, self.config.non_objective_type_id)
            .await?
        {
            Some(template) => template.question_count,
            None => {
                warn!("Subject {} has no question template, quiz will be empty", subject_id);
                0
            }
        };

        let examination = self.examinations.create(user_id, subject_id).await?;
        let info = QuizSessionInfo::new(
            examination.id,
            user_id,
            subject_id,
            requested_quantity,
            available,
        );

        self.sessions.put_quiz(user_id, info.clone()).await;
        info!(
            "User {} started examination {} on subject {} with {} questions",
            user_id,
            examination.id,
            subject_id,
            info.remaining_quantity()
        );

        Ok(info)
    }

    pub async fn dispense(&self, user_id: Uuid) -> Result<Dispense, PracticeError> {
        let _guard = self.sessions.lock(user_id).await;
        let Some(mut info) = self.sessions.get_quiz(user_id).await else {
            return Ok(Dispense::SelectSubject);
        };
        if info.is_exhausted() {
            return Ok(Dispense::Summary);
        }

        let filter = DrawFilter::dispensable(
            info.subject_id(),
            info.served_question_ids(),
            self.config.non_objective_type_id,
        );

        let Some(question) = self.questions.draw_random_question(filter).await? else {
            let subject_id = info.subject_id();
            return match self.config.exhaustion_policy {
                ExhaustionPolicy::Fault => Err(PracticeError::NoQualifyingQuestion { subject_id }),
                ExhaustionPolicy::EarlyFinish => {
                    warn!(
                        "No question left for subject {} with {} remaining, finishing early",
                        subject_id,
                        info.remaining_quantity()
                    );
                    info.finish();
                    self.sessions.put_quiz(user_id, info).await;
                    Ok(Dispense::DrawExhausted { subject_id })
                }
            };
        };

        if !info.record_served(question.id) {
            // The store ignored the exclusion filter.
            return Err(PracticeError::NoQualifyingQuestion {
                subject_id: info.subject_id(),
            });
        }
        self.sessions.put_quiz(user_id, info).await;

        let options = self.questions.find_options(question.id).await?;
        debug!("Dispensed question {} to user {}", question.id, user_id);

        Ok(Dispense::Question(QuestionView::unanswered(question, options)))
    }

    /// Records every chosen option as an answer. Correctness is only judged
    /// in the summary.
    pub async fn submit_answers(
        &self,
        user_id: Uuid,
        question_id: i64,
        option_ids: &[i64],
    ) -> Result<usize, PracticeError> {
        let _guard = self.sessions.lock(user_id).await;

        let Some(info) = self.sessions.get_quiz(user_id).await else {
            return Err(PracticeError::NoActiveSession);
        };

        if self.config.submission_policy == SubmissionPolicy::LastServed
            && info.last_served() != Some(question_id)
        {
            return Err(PracticeError::SubmissionMismatch {
                expected: info.last_served(),
                received: question_id,
            });
        }

        let examination = self
            .examinations
            .find(info.examination_id())
            .await?
            .ok_or(PracticeError::ExaminationMissing(info.examination_id()))?;

        let answers: Vec<NewAnswer> = option_ids
            .iter()
            .map(|option_id| NewAnswer::chosen(question_id, *option_id))
            .collect();

        self.examinations
            .create_answers(examination.id, &answers)
            .await?;

        debug!(
            "Stored {} answers for question {} in examination {}",
            answers.len(),
            question_id,
            examination.id
        );

        Ok(answers.len())
    }

    pub async fn summary(&self, user_id: Uuid) -> Result<Summary, PracticeError> {
        let info = match self.sessions.get_quiz(user_id).await {
            Some(info) if info.is_exhausted() => info,
            _ => {
                return Ok(Summary::Unavailable {
                    notice: NO_SUMMARY_NOTICE.into(),
                });
            }
        };

        let examination_id = self
            .examinations
            .find(info.examination_id())
            .await?
            .map(|examination| examination.id)
            .ok_or(PracticeError::ExaminationMissing(info.examination_id()))?;

        let subject = self.questions.find_subject(info.subject_id()).await?;
        let questions = self
            .questions
            .find_questions_ordered(info.scored_question_ids())
            .await?;

        let mut tally = ScoreTally::default();
        let mut total_questions = Vec::with_capacity(questions.len());

        for question in questions {
            let student_answer = self
                .examinations
                .answered_option_ids(examination_id, question.id)
                .await?;
            let original_answer = self.questions.correct_option_ids(question.id).await?;
            let question_options = self.questions.find_options(question.id).await?;

            let is_correct_answer = answers_match(&student_answer, &original_answer);
            tally.record(is_correct_answer);

            total_questions.push(ScoredQuestion {
                question,
                question_options,
                student_answer,
                original_answer,
                is_correct_answer,
            });
        }

        info!(
            "Scored examination {}: {} right, {} wrong",
            examination_id, tally.right_answer, tally.wrong_answer
        );

        Ok(Summary::Scored {
            subject,
            total_questions,
            right_answer: tally.right_answer,
            wrong_answer: tally.wrong_answer,
        })
    }

    /// Ends the attempt early without drawing further questions.
    pub async fn finish(&self, user_id: Uuid) {
        let _guard = self.sessions.lock(user_id).await;

        if let Some(mut info) = self.sessions.get_quiz(user_id).await {
            info.finish();
            self.sessions.put_quiz(user_id, info).await;
        }
    }

    /// Drops the attempt and leaves a farewell for the entry page.
    pub async fn restart(&self, user: &CurrentUser) -> String {
        let _guard = self.sessions.lock(user.id).await;

        self.sessions.clear_quiz(user.id).await;
        let farewell = user.farewell();
        self.sessions.flash(user.id, farewell.clone()).await;

        farewell
    }
}
