use actix_web::{error::ErrorInternalServerError, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{auth::extractors::IsOwner, auth::jwt::UserRole, db_interaction, identity::resolve_owner_scope, utils::{get_pooled_connection, DbPool}};

pub const DEFAULT_TAKE: i64 = 5;

#[derive(Deserialize, Debug)]
pub struct TopProductsQuery{
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub take: Option<i64>
}

#[tracing::instrument(
    "Getting top products over window",
    skip(pool, owner)
)]
pub async fn get_top_products(
    pool: web::Data<DbPool>,
    query: web::Query<TopProductsQuery>,
    owner: IsOwner
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;
    let scope = resolve_owner_scope(conn, owner.0, UserRole::Owner).await?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let ranking = db_interaction::get_top_products(
        conn,
        scope.owner_id,
        query.start,
        query.end,
        query.take.unwrap_or(DEFAULT_TAKE)
    )
    .await
    .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(ranking))
}
