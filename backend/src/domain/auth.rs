//! Authentication inputs: login credentials and registration requests.
//!
//! Handlers parse raw strings through these constructors before a service is
//! called, so services only ever see validated values.

use super::{EmailAddress, Password, UserValidationError, Username};

/// Validated credentials exchanged for a bearer token.
///
/// # Examples
/// ```
/// use socialgate::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ada@Example.com ", "secret").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// assert_eq!(creds.password().expose(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, UserValidationError> {
        Ok(Self {
            email: EmailAddress::new(email)?,
            password: Password::new(password)?,
        })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password presented by the caller.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Validated sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    username: Username,
    email: EmailAddress,
    password: Password,
}

impl RegistrationRequest {
    /// Validate the three registration fields, reporting the first failure.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            email: EmailAddress::new(email)?,
            password: Password::new(password)?,
        })
    }

    /// Requested handle.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Requested email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Chosen password.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw1", "email")]
    #[case("ada@example.com", "", "password")]
    #[case("not-an-email", "secret", "email")]
    fn invalid_login_reports_field(
        #[case] email: &str,
        #[case] password: &str,
        #[case] field: &str,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    #[case("", "ada@example.com", "secret", "username")]
    #[case("ada", "ada@", "secret", "email")]
    #[case("ada", "ada@example.com", "no", "password")]
    fn invalid_registration_reports_field(
        #[case] username: &str,
        #[case] email: &str,
        #[case] password: &str,
        #[case] field: &str,
    ) {
        let err = RegistrationRequest::try_from_parts(username, email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn valid_registration_normalises_inputs() {
        let request = RegistrationRequest::try_from_parts(" ada ", "ADA@example.com", "secret")
            .expect("valid registration");
        assert_eq!(request.username().as_ref(), "ada");
        assert_eq!(request.email().as_ref(), "ada@example.com");
    }
}
