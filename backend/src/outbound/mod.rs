//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: PostgreSQL credential store and role hierarchy (Diesel)
//! - **cache**: Redis identity cache (`bb8-redis`)
//! - **mail**: HTTP mail API and a logging development mailer
//! - **token**: HS256 JWT issue and validation
//! - **memory**: process-local stand-ins used when no database or Redis is
//!   configured
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business rules.

pub mod cache;
pub mod mail;
pub mod memory;
pub mod persistence;
pub mod token;
