//! Socialgate library: identity, authorization, throttling and sign-up for a
//! social-network API.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::{RateLimit, Trace};

#[cfg(test)]
pub(crate) mod test_support;
