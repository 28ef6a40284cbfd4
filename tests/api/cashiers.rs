use diesel::{BoolExpressionMethods, ExpressionMethods, QueryDsl, RunQueryDsl};
use kasir::schema::users;

use crate::helpers::TestApp;

#[actix_web::test]
pub async fn owner_can_create_and_list_cashiers(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;

    let cashier = app.create_cashier_and_login(&owner).await;

    let cashiers: Vec<serde_json::Value> = app.api_client
        .get(format!("{}/api/cashiers", app.get_app_url()))
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(cashiers.len(), 1);
    assert_eq!(cashiers[0]["email"].as_str().unwrap(), cashier.email);
    // The response shape never carries password material
    assert!(cashiers[0].get("password").is_none());

    let mut conn = app.pool.get().unwrap();
    let (role, stored_password): (String, String) = users::table
        .select((users::role, users::password))
        .filter(
            users::email.eq(&cashier.email)
                .and(users::owner_id.eq(owner.user_id))
        )
        .first::<(String, String)>(&mut conn)
        .unwrap();

    assert_eq!(role, "Cashier");
    assert_ne!(stored_password, "cashierpassword");
    assert!(stored_password.starts_with("$argon2"));
}

#[actix_web::test]
pub async fn role_and_owner_sent_by_the_client_are_ignored(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;

    // Extra fields trying to smuggle a role or a different owner
    let body = serde_json::json!({
        "user_name": "sneaky cashier",
        "email": "sneaky@example.com",
        "password": "cashierpassword",
        "role": "Owner",
        "owner_id": uuid::Uuid::new_v4()
    });

    let response = app.api_client.post(format!("{}/api/cashiers", app.get_app_url()))
        .bearer_auth(&owner.token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let mut conn = app.pool.get().unwrap();
    let (role, stored_owner): (String, Option<uuid::Uuid>) = users::table
        .select((users::role, users::owner_id))
        .filter(users::email.eq("sneaky@example.com"))
        .first(&mut conn)
        .unwrap();

    assert_eq!(role, "Cashier");
    assert_eq!(stored_owner, Some(owner.user_id));
}

#[actix_web::test]
pub async fn cashier_cannot_manage_cashiers(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;
    let cashier = app.create_cashier_and_login(&owner).await;

    let response = app.api_client
        .get(format!("{}/api/cashiers", app.get_app_url()))
        .bearer_auth(&cashier.token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[actix_web::test]
pub async fn edit_cashier_updates_only_supplied_fields(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;
    let cashier = app.create_cashier_and_login(&owner).await;

    let body = serde_json::json!({ "is_deactivated": true });
    let response = app.api_client
        .patch(format!("{}/api/cashiers/{}", app.get_app_url(), cashier.user_id))
        .bearer_auth(&owner.token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let updated: serde_json::Value = response.json().await.unwrap();
    assert_eq!(updated["is_deactivated"].as_bool().unwrap(), true);
    assert_eq!(updated["user_name"].as_str().unwrap(), "integration cashier");
    assert_eq!(updated["email"].as_str().unwrap(), cashier.email);
}

#[actix_web::test]
pub async fn edit_cashier_rehashes_a_supplied_password(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;
    let cashier = app.create_cashier_and_login(&owner).await;

    let body = serde_json::json!({ "password": "newpassword" });
    let response = app.api_client
        .patch(format!("{}/api/cashiers/{}", app.get_app_url(), cashier.user_id))
        .bearer_auth(&owner.token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    // Old password no longer works, the new one does
    let login_body = serde_json::json!({
        "email": cashier.email,
        "password": "cashierpassword"
    });
    let response = app.api_client.post(format!("{}/api/auth/login", app.get_app_url()))
        .json(&login_body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let login = app.login(&cashier.email, "newpassword").await;
    assert_eq!(login.role, "Cashier");
}

#[actix_web::test]
pub async fn editing_foreign_cashier_returns_404(){
    let app = TestApp::spawn_app().await;
    let owner1 = app.create_owner_and_login().await;
    let owner2 = app.create_owner_and_login().await;
    let cashier = app.create_cashier_and_login(&owner1).await;

    let body = serde_json::json!({ "user_name": "hijacked" });
    let response = app.api_client
        .patch(format!("{}/api/cashiers/{}", app.get_app_url(), cashier.user_id))
        .bearer_auth(&owner2.token)
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[actix_web::test]
pub async fn delete_cashier_removes_the_row(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;
    let cashier = app.create_cashier_and_login(&owner).await;

    let response = app.api_client
        .delete(format!("{}/api/cashiers/{}", app.get_app_url(), cashier.user_id))
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let mut conn = app.pool.get().unwrap();
    let count: i64 = users::table
        .filter(users::user_id.eq(cashier.user_id))
        .count()
        .get_result::<i64>(&mut conn)
        .unwrap();

    assert_eq!(count, 0);
}
