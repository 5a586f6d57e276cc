use async_trait::async_trait;

use crate::{
    application::error::ApplicationError,
    domain::models::session::{Flash, SessionUser},
};

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Stores a session for `user` and returns its identifier.
    async fn create_session(&self, user: SessionUser) -> Result<String, ApplicationError>;

    /// Returns `Ok(None)` for unknown or expired sessions.
    async fn get_user(&self, session_id: &str) -> Result<Option<SessionUser>, ApplicationError>;

    async fn set_flash(&self, session_id: &str, flash: Flash) -> Result<(), ApplicationError>;

    /// Reads and deletes the pending flash message in a single step, so it is
    /// delivered at most once.
    async fn take_flash(&self, session_id: &str) -> Result<Option<Flash>, ApplicationError>;
}
