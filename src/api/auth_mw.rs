use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use crate::{
    config::app_config::{AuthConfig, CONFIG},
    models::{
        auth::{Claims, CurrentUser},
        error::ServerError,
    },
};

pub async fn auth_mw(mut req: Request<Body>, next: Next) -> Result<Response, ServerError> {
    let Some(token_header) = extract_header(AUTHORIZATION.as_str(), req.headers()) else {
        tracing::error!("Unauthorized request - no authentication header provided");
        return Err(ServerError::AccessDenied);
    };

    let Some(token) = token_header.strip_prefix("Bearer ") else {
        return Err(ServerError::Api(
            StatusCode::UNAUTHORIZED,
            "Missing auth token".into(),
        ));
    };

    let claims = verify_jwt(token, &CONFIG.auth)?;
    req.extensions_mut().insert(CurrentUser::from(claims));

    Ok(next.run(req).await)
}

pub fn verify_jwt(token: &str, auth: &AuthConfig) -> Result<Claims, ServerError> {
    let decoding_key = DecodingKey::from_secret(auth.secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[&auth.audience]);
    validation.set_issuer(&[&auth.issuer]);

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| ServerError::JwtVerification(format!("Failed to validate token: {}", e)))
}

fn extract_header(key: &str, header_map: &HeaderMap) -> Option<String> {
    header_map
        .get(key)
        .and_then(|header| header.to_str().ok())
        .map(|s| s.to_owned())
}
