use actix_web::{error::ErrorInternalServerError, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{auth::extractors::IsOwner, auth::jwt::UserRole, db_interaction, identity::resolve_owner_scope, utils::{get_pooled_connection, DbPool}};

pub const REVENUE_CURRENCY: &str = "IDR";

#[derive(Deserialize, Debug)]
pub struct RevenueQuery{
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RevenueResponse{
    pub total: f64,
    pub currency: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>
}

#[tracing::instrument(
    "Getting revenue over window",
    skip(pool, owner)
)]
pub async fn get_revenue(
    pool: web::Data<DbPool>,
    query: web::Query<RevenueQuery>,
    owner: IsOwner
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;
    let scope = resolve_owner_scope(conn, owner.0, UserRole::Owner).await?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let total = db_interaction::get_revenue_total(conn, scope.owner_id, query.start, query.end)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(RevenueResponse{
        total,
        currency: REVENUE_CURRENCY.to_string(),
        start: query.start,
        end: query.end
    }))
}
