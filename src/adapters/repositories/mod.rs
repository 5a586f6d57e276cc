mod memory_session_repository;
mod redis_session_repository;

pub use memory_session_repository::InMemorySessionRepository;
pub use redis_session_repository::RedisSessionRepository;
