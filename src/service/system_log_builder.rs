use sqlx::{Pool, Postgres};
use tracing::error;
use uuid::Uuid;

use crate::{
    db::system_log::{NewSystemLog, create_system_log},
    models::{
        error::ServerError,
        system_log::{LogAction, LogCeverity, SubjectType},
    },
};

// VARCHAR(512) on the description column
static MAX_DESCRIPTION_LEN: usize = 512;

/// Audit entries for events that should outlive the process log, like a
/// practice attempt that ran out of questions.
pub struct SystemLogBuilder {
    pool: Pool<Postgres>,
    student: Option<Uuid>,
    action: Option<LogAction>,
    ceverity: Option<LogCeverity>,
    function: Option<String>,
    description: Option<String>,
    metadata: Option<serde_json::Value>,
}

impl SystemLogBuilder {
    pub fn new(pool: &Pool<Postgres>) -> Self {
        Self {
            pool: pool.clone(),
            student: None,
            action: None,
            ceverity: None,
            function: None,
            description: None,
            metadata: None,
        }
    }

    pub fn student(mut self, user_id: Uuid) -> Self {
        self.student = Some(user_id);
        self
    }

    pub fn action(mut self, action: LogAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn ceverity(mut self, ceverity: LogCeverity) -> Self {
        self.ceverity = Some(ceverity);
        self
    }

    pub fn function(mut self, function_name: &str) -> Self {
        self.function = Some(function_name.into());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub async fn log(self) -> Result<(), ServerError> {
        let (subject_id, subject_type) = match self.student {
            Some(id) => (id.to_string(), SubjectType::Student),
            None => ("[SYSTEM]".to_string(), SubjectType::System),
        };

        let description = truncate(
            self.description
                .unwrap_or_else(|| "No description".to_string()),
        );
        let function = self.function.unwrap_or_else(|| "Not specified".into());

        create_system_log(
            &self.pool,
            NewSystemLog {
                subject_id: &subject_id,
                subject_type,
                action: self.action.unwrap_or(LogAction::Other),
                ceverity: self.ceverity.unwrap_or(LogCeverity::Info),
                function: &function,
                description: &description,
                metadata: self.metadata.as_ref(),
            },
        )
        .await
    }

    pub fn log_async(self) {
        tokio::spawn(async move {
            if let Err(e) = self.log().await {
                error!("Failed to system log async: {}", e);
            }
        });
    }
}

fn truncate(mut description: String) -> String {
    if description.len() <= MAX_DESCRIPTION_LEN {
        return description;
    }

    let mut cut = MAX_DESCRIPTION_LEN - 3;
    while !description.is_char_boundary(cut) {
        cut -= 1;
    }
    description.truncate(cut);
    description.push_str("...");
    description
}
