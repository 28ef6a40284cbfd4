use chrono::{Duration, Utc};
use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};
use kasir::schema::{transaction_details, transactions};
use uuid::Uuid;

use crate::helpers::{Session, TestApp};

async fn seed_product(app: &TestApp, session: &Session, name: &str, price: f64, discount: f64) -> Uuid {
    let product = app.create_product(&session.token, name, price, discount, None).await;
    Uuid::parse_str(product["product_id"].as_str().unwrap()).unwrap()
}

#[actix_web::test]
pub async fn create_transaction_persists_parent_and_details(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;

    let kopi = seed_product(&app, &owner, "kopi susu", 10000.0, 1000.0).await;
    let teh = seed_product(&app, &owner, "teh manis", 5000.0, 0.0).await;

    let response = app.create_transaction(&owner.token, "cash", serde_json::json!([
        { "product_id": kopi, "quantity": 2 },
        { "product_id": teh, "quantity": 1 }
    ])).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["is_paid"].as_bool().unwrap(), false);
    assert_eq!(body["payment"].as_str().unwrap(), "cash");
    assert!(body["code"].as_str().unwrap().starts_with("TRX-"));

    let mut conn = app.pool.get().unwrap();
    let parent_count: i64 = transactions::table
        .filter(transactions::user_id.eq(owner.user_id))
        .count()
        .get_result::<i64>(&mut conn)
        .unwrap();
    let detail_count: i64 = transaction_details::table
        .count()
        .get_result::<i64>(&mut conn)
        .unwrap();

    assert_eq!(parent_count, 1);
    assert_eq!(detail_count, 2);
}

#[actix_web::test]
pub async fn create_transaction_with_zero_items_is_rejected(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;

    let response = app.create_transaction(&owner.token, "cash", serde_json::json!([])).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[actix_web::test]
pub async fn create_transaction_with_foreign_product_persists_nothing(){
    let app = TestApp::spawn_app().await;
    let owner1 = app.create_owner_and_login().await;
    let owner2 = app.create_owner_and_login().await;

    let own_product = seed_product(&app, &owner1, "kopi susu", 10000.0, 0.0).await;
    let foreign_product = seed_product(&app, &owner2, "teh manis", 5000.0, 0.0).await;

    let response = app.create_transaction(&owner1.token, "cash", serde_json::json!([
        { "product_id": own_product, "quantity": 1 },
        { "product_id": foreign_product, "quantity": 1 }
    ])).await;
    assert_eq!(response.status().as_u16(), 400);

    // All-or-nothing: neither the parent nor any detail row may exist
    let mut conn = app.pool.get().unwrap();
    let parent_count: i64 = transactions::table
        .count()
        .get_result::<i64>(&mut conn)
        .unwrap();
    let detail_count: i64 = transaction_details::table
        .count()
        .get_result::<i64>(&mut conn)
        .unwrap();

    assert_eq!(parent_count, 0);
    assert_eq!(detail_count, 0);
}

#[actix_web::test]
pub async fn create_transaction_with_zero_quantity_is_rejected(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;

    let product = seed_product(&app, &owner, "kopi susu", 10000.0, 0.0).await;

    let response = app.create_transaction(&owner.token, "cash", serde_json::json!([
        { "product_id": product, "quantity": 0 }
    ])).await;

    assert_eq!(response.status().as_u16(), 400);
}

#[actix_web::test]
pub async fn get_by_id_returns_computed_totals(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;

    let kopi = seed_product(&app, &owner, "kopi susu", 10000.0, 1000.0).await;

    let response = app.create_transaction(&owner.token, "cash", serde_json::json!([
        { "product_id": kopi, "quantity": 3 }
    ])).await;
    let created: serde_json::Value = response.json().await.unwrap();
    let transaction_id = created["transaction_id"].as_str().unwrap();

    let body: serde_json::Value = app.api_client
        .get(format!("{}/api/transactions/{}", app.get_app_url(), transaction_id))
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // 3 * (10000 - 1000)
    assert_eq!(body["total_amount"].as_f64().unwrap(), 27000.0);
    let details = body["details"].as_array().unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0]["subtotal"].as_f64().unwrap(), 27000.0);
    assert_eq!(details[0]["product_name"].as_str().unwrap(), "kopi susu");
}

#[actix_web::test]
pub async fn owner_sees_all_days_cashier_sees_only_today(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;
    let cashier = app.create_cashier_and_login(&owner).await;

    let kopi = seed_product(&app, &owner, "kopi susu", 10000.0, 0.0).await;

    let response = app.create_transaction(&owner.token, "cash", serde_json::json!([
        { "product_id": kopi, "quantity": 1 }
    ])).await;
    let old: serde_json::Value = response.json().await.unwrap();
    let old_id = Uuid::parse_str(old["transaction_id"].as_str().unwrap()).unwrap();
    app.set_transaction_created_at(old_id, Utc::now() - Duration::days(2));

    app.create_transaction(&owner.token, "cash", serde_json::json!([
        { "product_id": kopi, "quantity": 1 }
    ])).await;

    let owner_view: Vec<serde_json::Value> = app.api_client
        .get(format!("{}/api/transactions", app.get_app_url()))
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(owner_view.len(), 2);

    let cashier_view: Vec<serde_json::Value> = app.api_client
        .get(format!("{}/api/transactions", app.get_app_url()))
        .bearer_auth(&cashier.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cashier_view.len(), 1);

    // The backdated row is also unreachable for the cashier by id
    let response = app.api_client
        .get(format!("{}/api/transactions/{}", app.get_app_url(), old_id))
        .bearer_auth(&cashier.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[actix_web::test]
pub async fn list_supports_filters_search_and_amount_sort(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;

    let kopi = seed_product(&app, &owner, "kopi susu", 10000.0, 0.0).await;
    let teh = seed_product(&app, &owner, "teh manis", 5000.0, 0.0).await;

    let response = app.create_transaction(&owner.token, "cash", serde_json::json!([
        { "product_id": kopi, "quantity": 1 }
    ])).await;
    let cash_transaction: serde_json::Value = response.json().await.unwrap();
    let cash_id = Uuid::parse_str(cash_transaction["transaction_id"].as_str().unwrap()).unwrap();
    app.mark_transaction_paid(cash_id);

    app.create_transaction(&owner.token, "qris", serde_json::json!([
        { "product_id": teh, "quantity": 4 }
    ])).await;

    // Exact payment filter
    let by_payment: Vec<serde_json::Value> = app.api_client
        .get(format!("{}/api/transactions", app.get_app_url()))
        .query(&[("payment", "cash")])
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_payment.len(), 1);
    assert_eq!(by_payment[0]["payment"].as_str().unwrap(), "cash");

    // Paid flag filter
    let paid_only: Vec<serde_json::Value> = app.api_client
        .get(format!("{}/api/transactions", app.get_app_url()))
        .query(&[("is_paid", "true")])
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(paid_only.len(), 1);
    assert_eq!(paid_only[0]["is_paid"].as_bool().unwrap(), true);

    // Free text search over line item product names
    let by_product_name: Vec<serde_json::Value> = app.api_client
        .get(format!("{}/api/transactions", app.get_app_url()))
        .query(&[("search", "TEH")])
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_product_name.len(), 1);
    assert_eq!(by_product_name[0]["payment"].as_str().unwrap(), "qris");

    // Ascending amount sort puts the 10000 cash sale before the 20000 qris sale
    let by_amount: Vec<serde_json::Value> = app.api_client
        .get(format!("{}/api/transactions", app.get_app_url()))
        .query(&[("sort_by", "amount"), ("sort_order", "asc")])
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_amount.len(), 2);
    assert_eq!(by_amount[0]["total_amount"].as_f64().unwrap(), 10000.0);
    assert_eq!(by_amount[1]["total_amount"].as_f64().unwrap(), 20000.0);
}

#[actix_web::test]
pub async fn list_defaults_to_newest_first_and_paginates(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;

    let kopi = seed_product(&app, &owner, "kopi susu", 10000.0, 0.0).await;

    let mut ids = Vec::new();
    for i in 0..3 {
        let response = app.create_transaction(&owner.token, "cash", serde_json::json!([
            { "product_id": kopi, "quantity": 1 }
        ])).await;
        let body: serde_json::Value = response.json().await.unwrap();
        let id = Uuid::parse_str(body["transaction_id"].as_str().unwrap()).unwrap();
        app.set_transaction_created_at(id, Utc::now() - Duration::minutes(30 - i));
        ids.push(id);
    }

    let listed: Vec<serde_json::Value> = app.api_client
        .get(format!("{}/api/transactions", app.get_app_url()))
        .query(&[("page", "1"), ("page_size", "2")])
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(listed.len(), 2);
    // Newest first: the last created (least backdated) row leads
    assert_eq!(
        listed[0]["transaction_id"].as_str().unwrap(),
        ids[2].to_string()
    );

    let second_page: Vec<serde_json::Value> = app.api_client
        .get(format!("{}/api/transactions", app.get_app_url()))
        .query(&[("page", "2"), ("page_size", "2")])
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(second_page.len(), 1);
    assert_eq!(
        second_page[0]["transaction_id"].as_str().unwrap(),
        ids[0].to_string()
    );
}

#[actix_web::test]
pub async fn owner_delete_cascades_detail_rows(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;

    let kopi = seed_product(&app, &owner, "kopi susu", 10000.0, 0.0).await;

    let response = app.create_transaction(&owner.token, "cash", serde_json::json!([
        { "product_id": kopi, "quantity": 2 }
    ])).await;
    let body: serde_json::Value = response.json().await.unwrap();
    let transaction_id = body["transaction_id"].as_str().unwrap();

    let response = app.api_client
        .delete(format!("{}/api/transactions/{}", app.get_app_url(), transaction_id))
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let mut conn = app.pool.get().unwrap();
    let parent_count: i64 = transactions::table
        .count()
        .get_result::<i64>(&mut conn)
        .unwrap();
    let detail_count: i64 = transaction_details::table
        .count()
        .get_result::<i64>(&mut conn)
        .unwrap();

    assert_eq!(parent_count, 0);
    assert_eq!(detail_count, 0);
}

#[actix_web::test]
pub async fn cashier_cannot_delete_transactions(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;
    let cashier = app.create_cashier_and_login(&owner).await;

    let kopi = seed_product(&app, &owner, "kopi susu", 10000.0, 0.0).await;
    let response = app.create_transaction(&cashier.token, "cash", serde_json::json!([
        { "product_id": kopi, "quantity": 1 }
    ])).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();

    let response = app.api_client
        .delete(format!(
            "{}/api/transactions/{}",
            app.get_app_url(),
            body["transaction_id"].as_str().unwrap()
        ))
        .bearer_auth(&cashier.token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[actix_web::test]
pub async fn deleting_foreign_transaction_returns_404_and_keeps_details(){
    let app = TestApp::spawn_app().await;
    let owner1 = app.create_owner_and_login().await;
    let owner2 = app.create_owner_and_login().await;

    let kopi = seed_product(&app, &owner1, "kopi susu", 10000.0, 0.0).await;
    let response = app.create_transaction(&owner1.token, "cash", serde_json::json!([
        { "product_id": kopi, "quantity": 1 }
    ])).await;
    let body: serde_json::Value = response.json().await.unwrap();

    let response = app.api_client
        .delete(format!(
            "{}/api/transactions/{}",
            app.get_app_url(),
            body["transaction_id"].as_str().unwrap()
        ))
        .bearer_auth(&owner2.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let mut conn = app.pool.get().unwrap();
    let detail_count: i64 = transaction_details::table
        .count()
        .get_result::<i64>(&mut conn)
        .unwrap();
    assert_eq!(detail_count, 1);
}
