use std::sync::Arc;

use warden_application::{ClassifyError, ErrorKind};
use warden_core::{ActionType, InvalidTokenReason};

use crate::helpers::{TestApp, config, email, password, random_email, token_from};

#[tokio::test]
async fn test_unknown_email_succeeds_silently() {
    let app = TestApp::new();

    app.service
        .request_password_reset
        .execute(email("doesnotexist@example.com"))
        .await
        .unwrap();

    assert!(app.tokens.tokens_for(ActionType::PasswordReset).await.is_empty());
    assert_eq!(app.queue.pending_len().await, 0);
}

#[tokio::test]
async fn test_reset_link_sets_new_password_once() {
    let app = TestApp::new();
    let address = random_email();
    app.seed_user(&address, "old-password", true).await;

    app.service
        .request_password_reset
        .execute(email(&address))
        .await
        .unwrap();
    let sent = app.deliver_notifications().await;
    assert_eq!(sent[0].subject, "Reset your password");
    let token = token_from(&sent[0]);

    app.service
        .confirm_password_reset
        .execute(&token, password("new-password"))
        .await
        .unwrap();

    app.login(&address, "new-password").await;
    let old = app
        .service
        .login
        .execute(email(&address), password("old-password"))
        .await;
    assert_eq!(old.unwrap_err().kind(), ErrorKind::InvalidCredentials);

    let replay = app
        .service
        .confirm_password_reset
        .execute(&token, password("third-password"))
        .await;
    assert_eq!(
        replay.unwrap_err().kind(),
        ErrorKind::InvalidToken(InvalidTokenReason::NotFound)
    );
}

#[tokio::test]
async fn test_concurrent_confirmations_apply_once() {
    let app = Arc::new(TestApp::new());
    let address = random_email();
    app.seed_user(&address, "old-password", true).await;
    app.service
        .request_password_reset
        .execute(email(&address))
        .await
        .unwrap();
    let token = app.tokens.tokens_for(ActionType::PasswordReset).await[0]
        .token
        .clone();

    let attempts: Vec<_> = (0..8)
        .map(|i| {
            let app = Arc::clone(&app);
            let token = token.clone();
            tokio::spawn(async move {
                app.service
                    .confirm_password_reset
                    .execute(&token, password(&format!("new-password-{i}")))
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(()) => winners += 1,
            Err(e) => assert_eq!(e.kind(), ErrorKind::InvalidToken(InvalidTokenReason::NotFound)),
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_expired_token_is_burned_on_first_use() {
    let mut expired = config();
    expired.action_token_ttl = chrono::Duration::seconds(-1);
    let app = TestApp::with_config(expired);
    let address = random_email();
    app.seed_user(&address, "old-password", true).await;

    app.service
        .request_password_reset
        .execute(email(&address))
        .await
        .unwrap();
    let token = token_from(&app.deliver_notifications().await[0]);

    let first = app
        .service
        .confirm_password_reset
        .execute(&token, password("new-password"))
        .await;
    let second = app
        .service
        .confirm_password_reset
        .execute(&token, password("new-password"))
        .await;

    assert_eq!(
        first.unwrap_err().kind(),
        ErrorKind::InvalidToken(InvalidTokenReason::Expired)
    );
    assert_eq!(
        second.unwrap_err().kind(),
        ErrorKind::InvalidToken(InvalidTokenReason::NotFound)
    );
    app.login(&address, "old-password").await;
}
