use warden_application::{ClassifyError, ErrorKind};
use warden_core::{Role, UserStore};

use crate::helpers::{TestApp, email, password, random_email};

async fn seed_with_role(app: &TestApp, role: Role) -> warden_core::User {
    let mut user = app.seed_user(&random_email(), "password123", true).await;
    user.change_role(role);
    app.users.update(&user).await.unwrap();
    user
}

#[tokio::test]
async fn test_manager_promotes_client_and_user_is_notified() {
    let app = TestApp::new();
    let manager = seed_with_role(&app, Role::Manager).await;
    let client = seed_with_role(&app, Role::Client).await;

    app.service
        .promote_user
        .execute(manager.identity(), client.id(), Role::Cashier)
        .await
        .unwrap();

    let stored = app.users.find_by_id(client.id()).await.unwrap();
    assert_eq!(stored.role(), Role::Cashier);

    let sent = app.deliver_notifications().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, client.email().as_str());
    assert!(sent[0].content.contains("cashier"));
}

#[tokio::test]
async fn test_manager_cannot_create_admins() {
    let app = TestApp::new();
    let manager = seed_with_role(&app, Role::Manager).await;
    let client = seed_with_role(&app, Role::Client).await;

    let result = app
        .service
        .promote_user
        .execute(manager.identity(), client.id(), Role::Admin)
        .await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Forbidden);
    assert_eq!(app.queue.pending_len().await, 0);
}

#[tokio::test]
async fn test_last_admin_is_protected_but_others_can_go() {
    let app = TestApp::new();
    let admin = seed_with_role(&app, Role::Admin).await;
    let client = seed_with_role(&app, Role::Client).await;

    let result = app
        .service
        .delete_user
        .execute(admin.identity(), admin.id())
        .await;
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Conflict);

    app.service
        .delete_user
        .execute(client.identity(), client.id())
        .await
        .unwrap();
    assert!(app.users.find_by_id(client.id()).await.is_err());
}

#[tokio::test]
async fn test_change_password_requires_current_password() {
    let app = TestApp::new();
    let address = random_email();
    app.seed_user(&address, "password123", true).await;
    let actor = app.login(&address, "password123").await;

    let wrong = app
        .service
        .change_password
        .execute(actor, password("not-my-password"), password("brand-new-pass"))
        .await;
    assert_eq!(wrong.unwrap_err().kind(), ErrorKind::InvalidCredentials);

    app.service
        .change_password
        .execute(actor, password("password123"), password("brand-new-pass"))
        .await
        .unwrap();

    app.login(&address, "brand-new-pass").await;
    let old = app
        .service
        .login
        .execute(email(&address), password("password123"))
        .await;
    assert_eq!(old.unwrap_err().kind(), ErrorKind::InvalidCredentials);
}
