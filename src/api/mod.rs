use std::sync::Arc;

use axum::{Router, middleware::from_fn};

use crate::{
    api::{auth_mw::auth_mw, health::health_routes, practice::practice_routes},
    models::app_state::AppState,
};

pub mod auth_mw;
pub mod health;
pub mod practice;
pub mod validation;

pub fn app(state: Arc<AppState>) -> Router {
    let public_routes = Router::new().nest("/health", health_routes(state.clone()));

    let protected_routes = Router::new()
        .nest("/practice", practice_routes(state.clone()))
        .layer(from_fn(auth_mw));

    Router::new().merge(protected_routes).merge(public_routes)
}
