use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    api::validation::ValidatedJson,
    models::{
        app_state::AppState,
        auth::CurrentUser,
        error::ServerError,
        practice::{
            SelectSubjectRequest, SubjectListResponse, SubmitAnswerRequest, SubmitAnswerResponse,
        },
        system_log::{LogAction, LogCeverity},
    },
    service::practice::{Dispense, PracticeError, SubjectOverview},
};

pub static SELECT_SUBJECT_PATH: &str = "/practice/select-subject";
pub static QUESTION_PATH: &str = "/practice/question";
pub static SUMMARY_PATH: &str = "/practice/summary";

pub fn practice_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/select-subject",
            get(show_select_subject).post(select_subject),
        )
        .route("/question", get(question).post(submit_question))
        .route("/summary", get(summary))
        .route("/finish", post(finish))
        .route("/restart", post(restart))
        .with_state(state)
}

async fn show_select_subject(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, ServerError> {
    match state.practice().subject_overview(user.id).await? {
        SubjectOverview::Resume => Ok(Redirect::to(QUESTION_PATH).into_response()),
        SubjectOverview::Subjects { subjects, flash } => {
            let response = SubjectListResponse { subjects, flash };
            Ok((StatusCode::OK, Json(response)).into_response())
        }
    }
}

async fn select_subject(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(request): ValidatedJson<SelectSubjectRequest>,
) -> Result<impl IntoResponse, ServerError> {
    // `required` rules already ran in the extractor.
    let (Some(subject_id), Some(quantity)) = (request.subject_id, request.question_quantity) else {
        return Err(ServerError::Internal(
            "Validated subject selection is missing fields".into(),
        ));
    };

    state
        .practice()
        .select_subject(user.id, subject_id, quantity)
        .await?;

    Ok(Redirect::to(QUESTION_PATH))
}

async fn question(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, ServerError> {
    let response = match state.practice().dispense(user.id).await? {
        Dispense::SelectSubject => Redirect::to(SELECT_SUBJECT_PATH).into_response(),
        Dispense::Summary => Redirect::to(SUMMARY_PATH).into_response(),
        Dispense::DrawExhausted { subject_id } => {
            error!(
                "Quota promised more questions than subject {} provides",
                subject_id
            );
            state
                .syslog()
                .student(user.id)
                .action(LogAction::Read)
                .ceverity(LogCeverity::Critical)
                .function("question")
                .description("Practice attempt ran out of qualifying questions")
                .metadata(json!({ "subject_id": subject_id }))
                .log_async();

            Redirect::to(SUMMARY_PATH).into_response()
        }
        Dispense::Question(view) => (StatusCode::OK, Json(view)).into_response(),
    };

    Ok(response)
}

async fn submit_question(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(request): ValidatedJson<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, ServerError> {
    // `required` rules already ran in the extractor.
    let (Some(question_id), Some(options)) = (request.question_id, request.options) else {
        return Err(ServerError::Internal(
            "Validated answer submission is missing fields".into(),
        ));
    };

    let recorded = state
        .practice()
        .submit_answers(user.id, question_id, &options)
        .await
        .map_err(|e| audit_failure(&state, user.id, "submit_question", e))?;

    let response = SubmitAnswerResponse {
        question_id,
        recorded,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

async fn summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ServerError> {
    let summary = state
        .practice()
        .summary(user.id)
        .await
        .map_err(|e| audit_failure(&state, user.id, "summary", e))?;
    Ok((StatusCode::OK, Json(summary)))
}

async fn finish(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> impl IntoResponse {
    state.practice().finish(user.id).await;
    info!("User {} finished practice early", user.id);

    Redirect::to(SUMMARY_PATH)
}

async fn restart(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> impl IntoResponse {
    state.practice().restart(&user).await;
    info!("User {} restarted practice", user.id);

    Redirect::to(SELECT_SUBJECT_PATH)
}

/// Writes a critical system log for failures that point at broken session
/// state, then hands the error on.
fn audit_failure(
    state: &AppState,
    user_id: Uuid,
    function: &str,
    e: PracticeError,
) -> ServerError {
    if let Some((description, metadata)) = critical_entry(&e) {
        state
            .syslog()
            .student(user_id)
            .action(LogAction::Read)
            .ceverity(LogCeverity::Critical)
            .function(function)
            .description(description)
            .metadata(metadata)
            .log_async();
    }

    e.into()
}

fn critical_entry(e: &PracticeError) -> Option<(&'static str, serde_json::Value)> {
    match e {
        PracticeError::ExaminationMissing(examination_id) => Some((
            "Practice session references a missing examination",
            json!({ "examination_id": examination_id }),
        )),
        _ => None,
    }
}
