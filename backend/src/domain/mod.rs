//! Domain primitives, services and ports.
//!
//! Purpose: hold the gatekeeping rules (who the caller is, what they may do,
//! how often they may ask, and how accounts come into being) independent of
//! HTTP, SQL, Redis or SMTP. Adapters reach the domain through [`ports`].
//!
//! Public surface:
//! - Identity types: [`User`], [`UserId`], [`Role`], [`TokenClaims`].
//! - Services: [`IdentityDirectory`], [`RoleAuthorizer`],
//!   [`FixedWindowRateLimiter`], [`TokenService`], [`RegistrationService`],
//!   [`AccountService`].
//! - [`Error`] and [`ErrorCode`], the transport-agnostic failure payload.

pub mod account_service;
pub mod auth;
pub mod authentication;
pub mod authorization;
pub mod error;
pub mod identity_directory;
pub mod invitation;
pub mod password;
mod port_errors;
pub mod ports;
pub mod rate_limit;
pub mod registration;
pub mod role;
pub mod token;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{LoginCredentials, RegistrationRequest};
pub use self::authentication::{TokenConfig, TokenService};
pub use self::authorization::{PrecedenceError, RoleAuthorizer};
pub use self::error::{Error, ErrorCode};
pub use self::identity_directory::IdentityDirectory;
pub use self::invitation::{InvitationToken, InvitationTokenHash, NewInvitation};
pub use self::password::{PASSWORD_MAX, PASSWORD_MIN, Password, PasswordHash, PasswordHashError};
pub use self::rate_limit::{FixedWindowRateLimiter, RateDecision, RateLimitConfig};
pub use self::registration::{
    DeliveryPolicy, DeliverySleeper, RegistrationConfig, RegistrationService, TokioSleeper,
};
pub use self::role::{
    ADMIN_ROLE, DEFAULT_ROLE, Role, RoleName, RoleValidationError, seeded_roles,
};
pub use self::token::TokenClaims;
pub use self::trace_id::TraceId;
pub use self::user::{
    EMAIL_MAX, EmailAddress, NewUser, USERNAME_MAX, User, UserCredentials, UserId,
    UserValidationError, Username,
};

/// Response header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";
