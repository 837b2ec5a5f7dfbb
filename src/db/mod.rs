pub mod examination;
pub mod health;
pub mod question;
pub mod system_log;
