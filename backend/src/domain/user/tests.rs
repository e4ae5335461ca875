//! Tests for the domain user model.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn user() -> User {
    User::new(
        UserId::new(7).expect("valid id"),
        Username::new("ada").expect("valid username"),
        EmailAddress::new("ada@example.com").expect("valid email"),
        false,
        Role::new(1, RoleName::default_role(), 1, "member"),
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp"),
    )
}

#[rstest]
#[case(0)]
#[case(-3)]
fn non_positive_ids_are_rejected(#[case] raw: i64) {
    assert_eq!(UserId::new(raw), Err(UserValidationError::InvalidId));
}

#[rstest]
#[case("42", Some(42))]
#[case("0", None)]
#[case("abc", None)]
fn user_id_parses_from_path_segments(#[case] raw: &str, #[case] expected: Option<i64>) {
    let parsed = raw.parse::<UserId>().ok().map(UserId::get);
    assert_eq!(parsed, expected);
}

#[rstest]
#[case("", UserValidationError::EmptyUsername)]
#[case("   ", UserValidationError::EmptyUsername)]
fn blank_usernames_are_rejected(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Username::new(raw), Err(expected));
}

#[rstest]
fn overlong_usernames_are_rejected() {
    let raw = "a".repeat(USERNAME_MAX + 1);
    assert_eq!(
        Username::new(raw),
        Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX })
    );
}

#[rstest]
#[case("  Ada@Example.COM ", "ada@example.com")]
#[case("x@y.io", "x@y.io")]
fn emails_are_normalised(#[case] raw: &str, #[case] expected: &str) {
    let email = EmailAddress::new(raw).expect("valid email");
    assert_eq!(email.as_ref(), expected);
}

#[rstest]
#[case("")]
#[case("no-at-sign")]
#[case("@example.com")]
#[case("ada@localhost")]
#[case("ada@.com")]
#[case("ada@example.")]
#[case("a@b@example.com")]
#[case("ada lovelace@example.com")]
fn malformed_emails_are_rejected(#[case] raw: &str) {
    assert!(EmailAddress::new(raw).is_err());
}

#[rstest]
fn validation_errors_expose_field_and_code() {
    let err = EmailAddress::new("nope").expect_err("invalid email");
    assert_eq!(err.field(), "email");
    assert_eq!(err.code(), "invalid_email");
}

#[rstest]
fn serialises_without_password_material(user: User) {
    let value = serde_json::to_value(&user).expect("serialise user");
    assert_eq!(value["id"], json!(7));
    assert_eq!(value["username"], json!("ada"));
    assert_eq!(value["isActive"], json!(false));
    assert_eq!(value["role"]["name"], json!("user"));
    assert!(value.get("password").is_none());
    assert!(value.get("passwordHash").is_none());
}

#[rstest]
fn json_snapshot_round_trips_for_the_cache(user: User) {
    let encoded = serde_json::to_string(&user).expect("serialise user");
    let decoded: User = serde_json::from_str(&encoded).expect("deserialise user");
    assert_eq!(decoded, user);
}

#[rstest]
fn deserialising_rejects_invalid_ids() {
    let payload = json!({
        "id": 0,
        "username": "ada",
        "email": "ada@example.com",
        "isActive": true,
        "role": {"id": 1, "name": "user", "level": 1, "description": "member"},
        "createdAt": "2024-05-01T12:00:00Z"
    });
    assert!(serde_json::from_value::<User>(payload).is_err());
}

#[rstest]
fn activated_sets_flag(user: User) {
    assert!(user.activated().is_active());
}
