//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`UserRepository`, `RoleRepository`, `UserCache`, `Mailer`,
//! `TokenAuthenticator`) are implemented by outbound adapters. Driving ports
//! (`IdentityQuery`, `TokenCommand`, `RegistrationCommand`, `AccountCommand`)
//! are implemented by domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod identity_query;
mod mailer;
mod registration_command;
mod role_repository;
mod token_authenticator;
mod token_command;
mod user_cache;
mod user_repository;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::AccountCommand;
#[cfg(test)]
pub use identity_query::MockIdentityQuery;
pub use identity_query::IdentityQuery;
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{DeliveryReceipt, MailTemplate, Mailer, MailerError, OutboundMessage};
#[cfg(test)]
pub use registration_command::MockRegistrationCommand;
pub use registration_command::{RegisteredUser, RegistrationCommand};
#[cfg(test)]
pub use role_repository::MockRoleRepository;
pub use role_repository::{FixtureRoleRepository, RoleRepository, RoleRepositoryError};
#[cfg(test)]
pub use token_authenticator::MockTokenAuthenticator;
pub use token_authenticator::{TokenAuthenticator, TokenError};
#[cfg(test)]
pub use token_command::MockTokenCommand;
pub use token_command::TokenCommand;
#[cfg(test)]
pub use user_cache::MockUserCache;
pub use user_cache::{UserCache, UserCacheError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
