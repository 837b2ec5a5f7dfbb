use dotenvy::dotenv;
use models::app_state::AppState;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{api::app, config::app_config::CONFIG};

mod api;
mod config;
mod db;
mod models;
mod service;
#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() {
    // Initialize .env
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Initialize state
    let state = match AppState::from_connection_string(&CONFIG.database_url).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize app state: {}", e);
            return;
        }
    };

    // Run migrations
    if let Err(e) = sqlx::migrate!().run(state.get_pool()).await {
        error!("Failed to run migrations: {}", e);
        return;
    }

    let app = app(state);

    // Initialize webserver
    let address = format!("{}:{}", CONFIG.server.address, CONFIG.server.port);
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", address, e);
            return;
        }
    };

    info!("Server listening on address: {}", address);
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server stopped with error: {}", e);
    }
}
