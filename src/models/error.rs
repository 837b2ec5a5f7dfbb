use std::collections::BTreeMap;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::service::practice::PracticeError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Sqlx failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Api error: {1}")]
    Api(StatusCode, String),

    #[error("Validation failed")]
    Validation(BTreeMap<String, Vec<String>>),

    #[error("Access denied error")]
    AccessDenied,

    #[error("JWT verification error: {0}")]
    JwtVerification(String),

    #[error("Practice error: {0}")]
    Practice(#[from] PracticeError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ServerError::Sqlx(e) => {
                error!("Sqlx failed with error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, String::new()).into_response()
            }
            ServerError::Internal(e) => {
                error!("Internal server error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, String::new()).into_response()
            }
            ServerError::Api(sc, msg) => {
                error!("Api error: {} - {}", sc, msg);
                (sc, msg).into_response()
            }
            ServerError::Validation(fields) => {
                warn!("Validation failed: {:?}", fields);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "errors": fields })),
                )
                    .into_response()
            }
            ServerError::AccessDenied => {
                warn!("Access denied for requesting entity");
                (StatusCode::FORBIDDEN, String::from("Access denied")).into_response()
            }
            ServerError::JwtVerification(e) => {
                warn!("Failed to verify JWT: {}", e);
                (StatusCode::UNAUTHORIZED, String::new()).into_response()
            }
            ServerError::Practice(e) => practice_response(e),
        }
    }
}

fn practice_response(e: PracticeError) -> axum::response::Response {
    match e {
        PracticeError::Sqlx(e) => {
            error!("Practice store failed: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, String::new()).into_response()
        }
        PracticeError::ExaminationMissing(id) => {
            error!("Examination {} referenced by session does not exist", id);
            (StatusCode::INTERNAL_SERVER_ERROR, String::new()).into_response()
        }
        e @ (PracticeError::NoQualifyingQuestion { .. }
        | PracticeError::NoActiveSession
        | PracticeError::SubmissionMismatch { .. }) => {
            warn!("Practice request rejected: {}", e);
            (StatusCode::CONFLICT, e.to_string()).into_response()
        }
    }
}
