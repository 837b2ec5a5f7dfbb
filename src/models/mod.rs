pub mod app_state;
pub mod auth;
pub mod error;
pub mod practice;
pub mod session;
pub mod system_log;
