use warden_application::{ClassifyError, ErrorKind};
use warden_core::{ActionType, UserStore};

use crate::helpers::{TestApp, email, password, random_email, token_from};

#[tokio::test]
async fn test_wrong_password_changes_nothing() {
    let app = TestApp::new();
    let address = random_email();
    let user = app.seed_user(&address, "password123", true).await;
    let actor = app.login(&address, "password123").await;

    let result = app
        .service
        .request_email_change
        .execute(actor, password("not-my-password"), email("new@example.com"))
        .await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidCredentials);
    assert!(app.tokens.tokens_for(ActionType::EmailConfirmation).await.is_empty());
    assert_eq!(app.queue.pending_len().await, 0);
    let stored = app.users.find_by_id(user.id()).await.unwrap();
    assert_eq!(stored.email().as_str(), address);
}

#[tokio::test]
async fn test_confirmed_change_moves_login_to_new_address() {
    let app = TestApp::new();
    let address = random_email();
    app.seed_user(&address, "password123", true).await;
    let actor = app.login(&address, "password123").await;

    app.service
        .request_email_change
        .execute(actor, password("password123"), email("moved@example.com"))
        .await
        .unwrap();

    let sent = app.deliver_notifications().await;
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|message| message.recipient == address));

    let confirmation = sent
        .iter()
        .find(|message| message.subject == "Confirm your new email address")
        .unwrap();
    let alert = sent
        .iter()
        .find(|message| message.subject == "Security alert for your account")
        .unwrap();
    assert!(!alert.content.contains("token="));

    let new_email = app
        .service
        .confirm_email_change
        .execute(&token_from(confirmation))
        .await
        .unwrap();
    assert_eq!(new_email.as_str(), "moved@example.com");

    let identity = app.login("moved@example.com", "password123").await;
    assert_eq!(identity.user_id, actor.user_id);
    let old = app
        .service
        .login
        .execute(email(&address), password("password123"))
        .await;
    assert_eq!(old.unwrap_err().kind(), ErrorKind::InvalidCredentials);
}

#[tokio::test]
async fn test_taken_address_is_a_conflict() {
    let app = TestApp::new();
    let address = random_email();
    app.seed_user(&address, "password123", true).await;
    app.seed_user("taken@example.com", "password123", true).await;
    let actor = app.login(&address, "password123").await;

    let result = app
        .service
        .request_email_change
        .execute(actor, password("password123"), email("taken@example.com"))
        .await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Conflict);
    assert_eq!(app.queue.pending_len().await, 0);
}
