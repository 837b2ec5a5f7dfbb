pub mod practice;
pub mod scoring;
pub mod session_store;
pub mod store;
pub mod system_log_builder;
