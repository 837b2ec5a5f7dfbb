use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{FromRequest, Request},
    http::{StatusCode, header::CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use validator::{Validate, ValidationErrors};

use crate::models::error::ServerError;

/// JSON body that has passed its `validator` rules. Rejections happen before
/// the handler runs, so no state is touched by invalid input.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send + 'static,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|content_type| content_type.starts_with("application/json"));

        if !is_json {
            return Err(ServerError::Api(
                StatusCode::BAD_REQUEST,
                "Expected JSON".to_string(),
            ));
        }

        let Ok(Json(value)) = Json::<T>::from_request(req, state).await else {
            return Err(ServerError::Api(
                StatusCode::BAD_REQUEST,
                "Invalid JSON".into(),
            ));
        };

        match value.validate() {
            Ok(_) => {
                debug!("Validation passed");
                Ok(ValidatedJson(value))
            }
            Err(e) => {
                let fields = field_messages(&e);
                info!("Validation error: {:?}", fields);
                Err(ServerError::Validation(fields))
            }
        }
    }
}

/// Field name to human readable messages.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, field_errors)| {
            let messages = field_errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} validation failed", field))
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}
