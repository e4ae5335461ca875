//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories are thin translators between Diesel rows and domain types.
//! Row structs and table definitions stay private to this module. Pooling
//! goes through `diesel-async` and `bb8`, and schema migrations are embedded
//! in the binary.
//!
//! ```ignore
//! use socialgate::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/socialgate")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_role_repository;
mod diesel_user_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_role_repository::DieselRoleRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError, QUERY_TIMEOUT, run_migrations};
