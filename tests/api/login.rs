use crate::helpers::{LoginResponse, TestApp};

#[actix_web::test]
pub async fn login_returns_token_for_valid_credentials(){
    let app = TestApp::spawn_app().await;

    let response = app.register_owner("Aman Rao", "owner@example.com", "ownerpassword").await;
    assert_eq!(response.status().as_u16(), 200);

    let login: LoginResponse = app.login("owner@example.com", "ownerpassword").await;

    assert!(!login.access_token.is_empty());
    assert_eq!(login.email, "owner@example.com");
    assert_eq!(login.role, "Owner");
}

#[actix_web::test]
pub async fn login_with_wrong_password_returns_401(){
    let app = TestApp::spawn_app().await;

    let response = app.register_owner("Aman Rao", "owner@example.com", "ownerpassword").await;
    assert_eq!(response.status().as_u16(), 200);

    let body = serde_json::json!({
        "email": "owner@example.com",
        "password": "wrongpassword"
    });

    let response = app.api_client.post(format!("{}/api/auth/login", app.get_app_url()))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[actix_web::test]
pub async fn login_with_unknown_email_returns_400(){
    let app = TestApp::spawn_app().await;

    let body = serde_json::json!({
        "email": "nobody@example.com",
        "password": "whatever"
    });

    let response = app.api_client.post(format!("{}/api/auth/login", app.get_app_url()))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[actix_web::test]
pub async fn cashier_login_reports_cashier_role(){
    let app = TestApp::spawn_app().await;

    let owner = app.create_owner_and_login().await;
    let cashier = app.create_cashier_and_login(&owner).await;

    let login = app.login(&cashier.email, "cashierpassword").await;
    assert_eq!(login.role, "Cashier");
}
