use chrono::{DateTime, Utc};
use diesel::prelude::{Insertable, Queryable};
use uuid::Uuid;

use crate::schema::categories;
use crate::schema::products;
use crate::schema::transaction_details;
use crate::schema::transactions;
use crate::schema::users;

// One row covers both roles: Owner rows have owner_id = NULL,
// Cashier rows point at their Owner.
#[derive(Queryable, Insertable, Clone)]
#[diesel(table_name = users)]
pub struct User{
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub business_name: String,
    pub business_description: Option<String>,
    pub role: String,
    pub owner_id: Option<Uuid>,
    pub is_deactivated: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>
}

#[derive(Queryable, Insertable, Clone)]
#[diesel(table_name = categories)]
pub struct Category{
    pub category_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>
}

#[derive(Queryable, Insertable, Clone)]
#[diesel(table_name = products)]
pub struct Product{
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub discount: f64,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>
}

#[derive(Queryable, Insertable, Clone)]
#[diesel(table_name = transactions)]
pub struct Transaction{
    pub transaction_id: Uuid,
    pub user_id: Uuid,
    pub is_paid: bool,
    pub payment: String,
    pub code: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>
}

#[derive(Queryable, Insertable, Clone)]
#[diesel(table_name = transaction_details)]
pub struct TransactionDetail{
    pub transaction_detail_id: Uuid,
    pub transaction_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>
}
