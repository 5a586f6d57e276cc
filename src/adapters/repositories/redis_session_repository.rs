use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;
use uuid::Uuid;

use crate::{
    application::{error::ApplicationError, repositories::session_repository::SessionRepository},
    domain::models::session::{Flash, SessionUser},
};

pub struct RedisSessionRepository {
    client: redis::aio::ConnectionManager,
    ttl_seconds: u64,
}

impl RedisSessionRepository {
    pub fn new(client: redis::aio::ConnectionManager, ttl_seconds: u64) -> Self {
        Self {
            client,
            ttl_seconds,
        }
    }

    fn user_key(session_id: &str) -> String {
        format!("session:{}:user", session_id)
    }

    fn flash_key(session_id: &str) -> String {
        format!("session:{}:flash", session_id)
    }
}

#[async_trait]
impl SessionRepository for RedisSessionRepository {
    async fn create_session(&self, user: SessionUser) -> Result<String, ApplicationError> {
        let session_id = Uuid::new_v4().to_string();
        let value = serde_json::to_string(&user).map_err(|e| {
            ApplicationError::InternalError(format!("Failed to encode session user: {}", e))
        })?;

        let mut conn = self.client.clone();
        conn.set_ex::<_, _, ()>(Self::user_key(&session_id), value, self.ttl_seconds)
            .await
            .map_err(|e| {
                ApplicationError::InternalError(format!("Failed to store session: {}", e))
            })?;

        debug!("Session created for user {}", user.id);
        Ok(session_id)
    }

    async fn get_user(&self, session_id: &str) -> Result<Option<SessionUser>, ApplicationError> {
        let mut conn = self.client.clone();
        let value: Option<String> = conn.get(Self::user_key(session_id)).await.map_err(|e| {
            ApplicationError::InternalError(format!("Failed to read session: {}", e))
        })?;

        value
            .map(|v| serde_json::from_str(&v))
            .transpose()
            .map_err(|e| {
                ApplicationError::InternalError(format!("Corrupt session user: {}", e))
            })
    }

    async fn set_flash(&self, session_id: &str, flash: Flash) -> Result<(), ApplicationError> {
        let value = serde_json::to_string(&flash).map_err(|e| {
            ApplicationError::InternalError(format!("Failed to encode flash: {}", e))
        })?;

        let mut conn = self.client.clone();
        conn.set_ex::<_, _, ()>(Self::flash_key(session_id), value, self.ttl_seconds)
            .await
            .map_err(|e| ApplicationError::InternalError(format!("Failed to store flash: {}", e)))
    }

    async fn take_flash(&self, session_id: &str) -> Result<Option<Flash>, ApplicationError> {
        let mut conn = self.client.clone();

        // GETDEL is atomic, so a flash is only ever delivered once
        let value: Option<String> = conn.get_del(Self::flash_key(session_id)).await.map_err(|e| {
            ApplicationError::InternalError(format!("Failed to read flash: {}", e))
        })?;

        value
            .map(|v| serde_json::from_str(&v))
            .transpose()
            .map_err(|e| ApplicationError::InternalError(format!("Corrupt flash: {}", e)))
    }
}
