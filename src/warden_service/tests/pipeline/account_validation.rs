use warden_application::{ClassifyError, ErrorKind};
use warden_core::{ActionType, InvalidTokenReason, UserStore};

use crate::helpers::{TestApp, email, password, random_email, token_from};

#[tokio::test]
async fn test_verification_token_is_single_use() {
    let app = TestApp::new();
    let address = random_email();
    let user = app.seed_user(&address, "password123", false).await;

    app.service
        .request_account_validation
        .execute(email(&address))
        .await
        .unwrap();

    assert_eq!(app.queue.pending_len().await, 1);
    assert_eq!(app.tokens.tokens_for(ActionType::AccountVerification).await.len(), 1);

    let sent = app.deliver_notifications().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, address);
    assert_eq!(sent[0].subject, "Verify your account");
    let token = token_from(&sent[0]);

    app.service.confirm_account_user.execute(&token).await.unwrap();

    let stored = app.users.find_by_id(user.id()).await.unwrap();
    assert!(stored.is_verified());
    assert!(!app.tokens.contains(&token).await);

    let replay = app.service.confirm_account_user.execute(&token).await;
    assert_eq!(
        replay.unwrap_err().kind(),
        ErrorKind::InvalidToken(InvalidTokenReason::NotFound)
    );
}

#[tokio::test]
async fn test_second_request_inside_window_is_rate_limited() {
    let app = TestApp::new();
    let address = random_email();
    app.seed_user(&address, "password123", false).await;

    app.service
        .request_account_validation
        .execute(email(&address))
        .await
        .unwrap();
    let second = app
        .service
        .request_account_validation
        .execute(email(&address))
        .await;

    assert_eq!(second.unwrap_err().kind(), ErrorKind::RateLimitExceeded);
    assert_eq!(app.queue.pending_len().await, 1);
    assert_eq!(app.tokens.tokens_for(ActionType::AccountVerification).await.len(), 1);
}

#[tokio::test]
async fn test_login_requires_verified_account() {
    let app = TestApp::new();
    let address = random_email();
    app.seed_user(&address, "password123", false).await;

    let blocked = app
        .service
        .login
        .execute(email(&address), password("password123"))
        .await;
    assert_eq!(blocked.unwrap_err().kind(), ErrorKind::EmailNotVerified);

    app.service
        .request_account_validation
        .execute(email(&address))
        .await
        .unwrap();
    let sent = app.deliver_notifications().await;
    app.service
        .confirm_account_user
        .execute(&token_from(&sent[0]))
        .await
        .unwrap();

    let response = app
        .service
        .login
        .execute(email(&address), password("password123"))
        .await
        .unwrap();
    let authenticated = app.service.authenticate(response.session.as_str()).unwrap();
    assert_eq!(authenticated, response.identity);
}

#[tokio::test]
async fn test_registration_sends_verification_link() {
    let app = TestApp::new();
    let address = random_email();

    let user_id = app
        .service
        .register_user
        .execute("Grace Hopper".to_owned(), email(&address), password("password123"))
        .await
        .unwrap();

    let sent = app.deliver_notifications().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].content.contains("Hi Grace Hopper,"));

    app.service
        .confirm_account_user
        .execute(&token_from(&sent[0]))
        .await
        .unwrap();

    let identity = app.login(&address, "password123").await;
    assert_eq!(identity.user_id, user_id);
}

#[tokio::test]
async fn test_verified_user_cannot_request_again() {
    let app = TestApp::new();
    let address = random_email();
    app.seed_user(&address, "password123", true).await;

    let result = app
        .service
        .request_account_validation
        .execute(email(&address))
        .await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::UserAlreadyVerified);
    assert_eq!(app.queue.pending_len().await, 0);
}
