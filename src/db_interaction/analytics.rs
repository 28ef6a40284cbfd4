use std::collections::HashMap;

use anyhow::Context;
use chrono::{DateTime, Utc};
use diesel::{BoolExpressionMethods, ExpressionMethods, QueryDsl, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{telemetry::spawn_blocking_with_tracing, utils::DbConnection};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TopProduct{
    pub product_id: Uuid,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue: f64
}

// Revenue counts only paid, non-deleted transactions inside the inclusive
// window; each line contributes quantity * (price - discount).
#[tracing::instrument(
    "Aggregating revenue over window",
    skip(conn)
)]
pub async fn get_revenue_total(
    mut conn: DbConnection,
    owner_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>
) -> Result<f64, anyhow::Error> {

    let rows = spawn_blocking_with_tracing(move || {
        use crate::schema::products;
        use crate::schema::transaction_details;
        use crate::schema::transactions;

        transaction_details::table
            .inner_join(transactions::table)
            .inner_join(products::table)
            .filter(
                transactions::user_id.eq(owner_id)
                    .and(transactions::is_paid.eq(true))
                    .and(transactions::is_deleted.eq(false))
                    .and(transactions::created_at.between(start, end))
            )
            .select((
                transaction_details::quantity,
                products::price,
                products::discount,
            ))
            .load::<(i32, f64, f64)>(&mut conn)
            .context("Failed to load transaction lines for revenue")
    })
    .await
    .context("Failed due to threadpool error")??;

    let total = rows
        .iter()
        .map(|(quantity, price, discount)| *quantity as f64 * (price - discount))
        .sum();

    Ok(total)
}

// Top sellers are ranked by revenue descending; ties break on product id
// ascending so the ordering is deterministic.
#[tracing::instrument(
    "Aggregating top products over window",
    skip(conn)
)]
pub async fn get_top_products(
    mut conn: DbConnection,
    owner_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    take: i64
) -> Result<Vec<TopProduct>, anyhow::Error> {

    let rows = spawn_blocking_with_tracing(move || {
        use crate::schema::products;
        use crate::schema::transaction_details;
        use crate::schema::transactions;

        transaction_details::table
            .inner_join(transactions::table)
            .inner_join(products::table)
            .filter(
                transactions::user_id.eq(owner_id)
                    .and(transactions::is_deleted.eq(false))
                    .and(transactions::created_at.between(start, end))
            )
            .select((
                products::product_id,
                products::name,
                products::price,
                products::discount,
                transaction_details::quantity,
            ))
            .load::<(Uuid, String, f64, f64, i32)>(&mut conn)
            .context("Failed to load transaction lines for top products")
    })
    .await
    .context("Failed due to threadpool error")??;

    let mut grouped: HashMap<Uuid, TopProduct> = HashMap::new();
    for (product_id, name, price, discount, quantity) in rows {
        let entry = grouped.entry(product_id).or_insert_with(|| TopProduct{
            product_id,
            name,
            quantity_sold: 0,
            revenue: 0.0
        });

        entry.quantity_sold += quantity as i64;
        entry.revenue += quantity as f64 * (price - discount);
    }

    let mut ranking: Vec<TopProduct> = grouped.into_values().collect();
    ranking.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    ranking.truncate(take.max(0) as usize);

    Ok(ranking)
}
