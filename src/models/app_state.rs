use std::sync::Arc;

use sqlx::{Pool, Postgres};

use crate::{
    config::app_config::CONFIG,
    db::{examination::PgExaminationStore, question::PgQuestionStore},
    models::error::ServerError,
    service::{
        practice::PracticeService, session_store::SessionStore,
        system_log_builder::SystemLogBuilder,
    },
};

pub type PgPracticeService = PracticeService<PgQuestionStore, PgExaminationStore>;

pub struct AppState {
    pool: Pool<Postgres>,
    practice: PgPracticeService,
}

impl AppState {
    pub async fn from_connection_string(connection_string: &str) -> Result<Arc<Self>, ServerError> {
        let pool = Pool::<Postgres>::connect(connection_string).await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: Pool<Postgres>) -> Arc<Self> {
        let sessions = SessionStore::from_idle_timeout(CONFIG.session.idle_timeout_secs);
        let practice = PracticeService::new(
            PgQuestionStore::new(pool.clone()),
            PgExaminationStore::new(pool.clone()),
            sessions,
            CONFIG.practice.clone(),
        );

        Arc::new(Self { pool, practice })
    }

    pub fn get_pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    pub fn practice(&self) -> &PgPracticeService {
        &self.practice
    }

    pub fn syslog(&self) -> SystemLogBuilder {
        SystemLogBuilder::new(self.get_pool())
    }
}
