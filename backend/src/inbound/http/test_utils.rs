//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use crate::domain::ports::{
    MockAccountCommand, MockIdentityQuery, MockRegistrationCommand, MockTokenCommand,
};

use super::state::HttpState;

/// State whose token and identity ports are the supplied mocks.
///
/// The registration and account ports expect no calls.
pub fn state_with(tokens: MockTokenCommand, identities: MockIdentityQuery) -> HttpState {
    HttpState::new(
        Arc::new(identities),
        Arc::new(tokens),
        Arc::new(MockRegistrationCommand::new()),
        Arc::new(MockAccountCommand::new()),
    )
}

/// State built from all four mocks.
pub fn full_state(
    tokens: MockTokenCommand,
    identities: MockIdentityQuery,
    registration: MockRegistrationCommand,
    accounts: MockAccountCommand,
) -> HttpState {
    HttpState::new(
        Arc::new(identities),
        Arc::new(tokens),
        Arc::new(registration),
        Arc::new(accounts),
    )
}
