use chrono::{Duration, SecondsFormat, Utc};
use uuid::Uuid;

use crate::helpers::{Session, TestApp};

async fn seed_paid_sale(app: &TestApp, owner: &Session, product_id: Uuid, quantity: i32) -> Uuid {
    let response = app.create_transaction(&owner.token, "cash", serde_json::json!([
        { "product_id": product_id, "quantity": quantity }
    ])).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    let transaction_id = Uuid::parse_str(body["transaction_id"].as_str().unwrap()).unwrap();
    app.mark_transaction_paid(transaction_id);

    transaction_id
}

fn window_around_now() -> (String, String) {
    let start = (Utc::now() - Duration::hours(1)).to_rfc3339_opts(SecondsFormat::Micros, true);
    let end = (Utc::now() + Duration::hours(1)).to_rfc3339_opts(SecondsFormat::Micros, true);
    (start, end)
}

#[actix_web::test]
pub async fn revenue_matches_the_discount_aware_formula(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;

    let product = app.create_product(&owner.token, "kopi susu", 10000.0, 1000.0, None).await;
    let product_id = Uuid::parse_str(product["product_id"].as_str().unwrap()).unwrap();

    // Two paid transactions totaling 3 units: 3 * (10000 - 1000) = 27000
    seed_paid_sale(&app, &owner, product_id, 2).await;
    seed_paid_sale(&app, &owner, product_id, 1).await;

    let (start, end) = window_around_now();
    let body: serde_json::Value = app.api_client
        .get(format!("{}/api/analytics/revenue", app.get_app_url()))
        .query(&[("start", &start), ("end", &end)])
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["total"].as_f64().unwrap(), 27000.0);
    assert_eq!(body["currency"].as_str().unwrap(), "IDR");
}

#[actix_web::test]
pub async fn revenue_ignores_unpaid_and_out_of_window_transactions(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;

    let product = app.create_product(&owner.token, "kopi susu", 10000.0, 0.0, None).await;
    let product_id = Uuid::parse_str(product["product_id"].as_str().unwrap()).unwrap();

    // Unpaid sale: never counted
    let response = app.create_transaction(&owner.token, "cash", serde_json::json!([
        { "product_id": product_id, "quantity": 5 }
    ])).await;
    assert_eq!(response.status().as_u16(), 200);

    // Paid but outside the queried window
    let outside = seed_paid_sale(&app, &owner, product_id, 5).await;
    app.set_transaction_created_at(outside, Utc::now() - Duration::days(30));

    // Paid and inside
    seed_paid_sale(&app, &owner, product_id, 2).await;

    let (start, end) = window_around_now();
    let body: serde_json::Value = app.api_client
        .get(format!("{}/api/analytics/revenue", app.get_app_url()))
        .query(&[("start", &start), ("end", &end)])
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["total"].as_f64().unwrap(), 20000.0);
}

#[actix_web::test]
pub async fn revenue_is_scoped_to_the_calling_owner(){
    let app = TestApp::spawn_app().await;
    let owner1 = app.create_owner_and_login().await;
    let owner2 = app.create_owner_and_login().await;

    let product = app.create_product(&owner1.token, "kopi susu", 10000.0, 0.0, None).await;
    let product_id = Uuid::parse_str(product["product_id"].as_str().unwrap()).unwrap();
    seed_paid_sale(&app, &owner1, product_id, 2).await;

    let (start, end) = window_around_now();
    let body: serde_json::Value = app.api_client
        .get(format!("{}/api/analytics/revenue", app.get_app_url()))
        .query(&[("start", &start), ("end", &end)])
        .bearer_auth(&owner2.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["total"].as_f64().unwrap(), 0.0);
}

#[actix_web::test]
pub async fn top_products_rank_by_revenue_and_honor_take(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;

    let kopi = app.create_product(&owner.token, "kopi susu", 10000.0, 1000.0, None).await;
    let kopi_id = Uuid::parse_str(kopi["product_id"].as_str().unwrap()).unwrap();
    let teh = app.create_product(&owner.token, "teh manis", 5000.0, 0.0, None).await;
    let teh_id = Uuid::parse_str(teh["product_id"].as_str().unwrap()).unwrap();

    // kopi: 3 * 9000 = 27000, teh: 2 * 5000 = 10000
    seed_paid_sale(&app, &owner, kopi_id, 3).await;
    seed_paid_sale(&app, &owner, teh_id, 2).await;

    let (start, end) = window_around_now();
    let ranking: Vec<serde_json::Value> = app.api_client
        .get(format!("{}/api/analytics/top-products", app.get_app_url()))
        .query(&[("start", &start), ("end", &end)])
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0]["name"].as_str().unwrap(), "kopi susu");
    assert_eq!(ranking[0]["revenue"].as_f64().unwrap(), 27000.0);
    assert_eq!(ranking[0]["quantity_sold"].as_i64().unwrap(), 3);
    assert_eq!(ranking[1]["name"].as_str().unwrap(), "teh manis");

    let take = "1".to_string();
    let top_one: Vec<serde_json::Value> = app.api_client
        .get(format!("{}/api/analytics/top-products", app.get_app_url()))
        .query(&[("start", &start), ("end", &end), ("take", &take)])
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(top_one.len(), 1);
    assert_eq!(top_one[0]["name"].as_str().unwrap(), "kopi susu");
}

#[actix_web::test]
pub async fn tied_revenue_breaks_on_product_id_ascending(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;

    let first = app.create_product(&owner.token, "kopi susu", 10000.0, 0.0, None).await;
    let first_id = Uuid::parse_str(first["product_id"].as_str().unwrap()).unwrap();
    let second = app.create_product(&owner.token, "teh manis", 10000.0, 0.0, None).await;
    let second_id = Uuid::parse_str(second["product_id"].as_str().unwrap()).unwrap();

    // Identical revenue on both products
    seed_paid_sale(&app, &owner, first_id, 1).await;
    seed_paid_sale(&app, &owner, second_id, 1).await;

    let (start, end) = window_around_now();
    let ranking: Vec<serde_json::Value> = app.api_client
        .get(format!("{}/api/analytics/top-products", app.get_app_url()))
        .query(&[("start", &start), ("end", &end)])
        .bearer_auth(&owner.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(ranking.len(), 2);

    let mut expected = vec![first_id, second_id];
    expected.sort();
    assert_eq!(
        ranking[0]["product_id"].as_str().unwrap(),
        expected[0].to_string()
    );
    assert_eq!(
        ranking[1]["product_id"].as_str().unwrap(),
        expected[1].to_string()
    );
}

#[actix_web::test]
pub async fn cashier_cannot_query_analytics(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_owner_and_login().await;
    let cashier = app.create_cashier_and_login(&owner).await;

    let (start, end) = window_around_now();
    let response = app.api_client
        .get(format!("{}/api/analytics/revenue", app.get_app_url()))
        .query(&[("start", &start), ("end", &end)])
        .bearer_auth(&cashier.token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}
