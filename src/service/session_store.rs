use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use moka::future::Cache;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

use crate::models::session::QuizSessionInfo;

#[derive(Debug, Clone, Default)]
pub struct SessionData {
    quiz: Option<QuizSessionInfo>,
    flash: Option<String>,
}

/// Per-user session storage. Entries expire after the configured idle time,
/// which is the only way an unfinished attempt disappears besides restart.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<Uuid, SessionData>,
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl SessionStore {
    pub fn from_idle_timeout(idle_secs: u64) -> Self {
        let sessions = Cache::builder()
            .time_to_idle(Duration::from_secs(idle_secs))
            .build();

        Self {
            sessions,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Serializes read-modify-write cycles on one user's session. Hold the
    /// guard for the whole cycle.
    pub async fn lock(&self, user_id: Uuid) -> SessionGuard {
        let mutex = self.locks.entry(user_id).or_default().clone();
        let guard = mutex.lock_owned().await;

        SessionGuard {
            guard: Some(guard),
            locks: self.locks.clone(),
            user_id,
        }
    }

    pub async fn get_quiz(&self, user_id: Uuid) -> Option<QuizSessionInfo> {
        self.sessions.get(&user_id).await.and_then(|data| data.quiz)
    }

    pub async fn put_quiz(&self, user_id: Uuid, info: QuizSessionInfo) {
        let mut data = self.sessions.get(&user_id).await.unwrap_or_default();
        data.quiz = Some(info);
        self.sessions.insert(user_id, data).await;
    }

    pub async fn clear_quiz(&self, user_id: Uuid) {
        if let Some(mut data) = self.sessions.get(&user_id).await {
            data.quiz = None;
            self.sessions.insert(user_id, data).await;
        }
        debug!("Cleared practice session for user {}", user_id);
    }

    /// Stores a one-shot notice, replacing any unread one.
    pub async fn flash(&self, user_id: Uuid, message: String) {
        let mut data = self.sessions.get(&user_id).await.unwrap_or_default();
        data.flash = Some(message);
        self.sessions.insert(user_id, data).await;
    }

    pub async fn take_flash(&self, user_id: Uuid) -> Option<String> {
        let mut data = self.sessions.get(&user_id).await?;
        let message = data.flash.take()?;
        self.sessions.insert(user_id, data).await;
        Some(message)
    }
}

/// Exclusive access to one user's session. Dropping the last holder removes
/// the user's mutex from the lock map.
pub struct SessionGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
    user_id: Uuid,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.guard.take();
        // Waiters hold their own clone, so the map entry is the only one left
        // when nobody is queued.
        self.locks
            .remove_if(&self.user_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
