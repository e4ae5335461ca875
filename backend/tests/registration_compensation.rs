//! Sign-up when the activation email cannot be delivered.

mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;
use socialgate::domain::{Error, ErrorCode, UserId};

use common::{ScriptedMailer, Stack, StackOptions, register};

#[actix_web::test]
async fn undeliverable_signup_is_rolled_back() {
    let stack = Stack::new(StackOptions {
        mailer: ScriptedMailer::failing(),
        ..StackOptions::default()
    });
    let app = stack.app().await;

    let req = test::TestRequest::post()
        .uri("/v1/authentication/user")
        .set_json(json!({
            "username": "ada",
            "email": "ada@example.com",
            "password": "lovelace",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let err: Error = test::read_body_json(res).await;
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(stack.mailer.attempts().len(), 3);
    assert_eq!(stack.users.invitation_count(), 0);
}

#[actix_web::test]
async fn rolled_back_signup_frees_the_username_and_email() {
    let stack = Stack::new(StackOptions {
        mailer: ScriptedMailer::failing(),
        ..StackOptions::default()
    });
    let app = stack.app().await;

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/v1/authentication/user")
            .set_json(json!({
                "username": "ada",
                "email": "ada@example.com",
                "password": "lovelace",
            }))
            .to_request();
        // A leftover pending row would turn the second attempt into 409.
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}

#[actix_web::test]
async fn delivered_signup_keeps_the_pending_user() {
    let stack = Stack::new(StackOptions::default());
    let app = stack.app().await;

    let (id, _) = register(&app, "ada", "ada@example.com", "lovelace").await;
    assert!(stack.users.contains(UserId::new(id).expect("valid id")));
    assert_eq!(stack.users.invitation_count(), 1);
}
