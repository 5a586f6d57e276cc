use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    application::{error::ApplicationError, repositories::session_repository::SessionRepository},
    domain::models::session::{Flash, SessionUser},
};

/// Process-local session store, used when no Redis URL is configured.
/// Expired sessions are dropped when they are next looked up.
pub struct InMemorySessionRepository {
    ttl: Duration,
    users: Mutex<HashMap<String, (SessionUser, Instant)>>,
    flashes: Mutex<HashMap<String, Flash>>,
}

impl InMemorySessionRepository {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            users: Mutex::new(HashMap::new()),
            flashes: Mutex::new(HashMap::new()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, ApplicationError> {
    mutex
        .lock()
        .map_err(|_| ApplicationError::InternalError("Session store lock poisoned".to_string()))
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create_session(&self, user: SessionUser) -> Result<String, ApplicationError> {
        let session_id = Uuid::new_v4().to_string();
        let expires_at = Instant::now() + self.ttl;
        lock(&self.users)?.insert(session_id.clone(), (user, expires_at));
        Ok(session_id)
    }

    async fn get_user(&self, session_id: &str) -> Result<Option<SessionUser>, ApplicationError> {
        let mut users = lock(&self.users)?;
        match users.get(session_id) {
            Some((_, expires_at)) if Instant::now() >= *expires_at => {
                users.remove(session_id);
                lock(&self.flashes)?.remove(session_id);
                Ok(None)
            }
            Some((user, _)) => Ok(Some(user.clone())),
            None => Ok(None),
        }
    }

    async fn set_flash(&self, session_id: &str, flash: Flash) -> Result<(), ApplicationError> {
        lock(&self.flashes)?.insert(session_id.to_string(), flash);
        Ok(())
    }

    async fn take_flash(&self, session_id: &str) -> Result<Option<Flash>, ApplicationError> {
        Ok(lock(&self.flashes)?.remove(session_id))
    }
}
