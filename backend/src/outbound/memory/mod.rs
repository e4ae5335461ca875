//! In-process adapters used when no external store or cache is configured.

mod user_cache;
mod user_repository;

pub use user_cache::InMemoryUserCache;
pub use user_repository::InMemoryUserRepository;
