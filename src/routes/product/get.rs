use actix_web::{error::ErrorInternalServerError, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::extractors::IsStaff, db_interaction, identity::resolve_owner_scope, utils::{get_pooled_connection, DbPool}};

use super::ProductResponse;

#[derive(Deserialize, Debug)]
pub struct GetProductsQuery{
    pub search: Option<String>,
    #[serde(rename = "categoryId")]
    pub category_id: Option<Uuid>
}

#[tracing::instrument(
    "Getting list of products",
    skip(pool, staff)
)]
pub async fn get_products(
    pool: web::Data<DbPool>,
    query: web::Query<GetProductsQuery>,
    staff: IsStaff
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;
    let scope = resolve_owner_scope(conn, staff.0, staff.1).await?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let query = query.into_inner();
    let products = db_interaction::get_products(
        conn,
        scope.owner_id,
        query.search,
        query.category_id
    )
    .await
    .map_err(ErrorInternalServerError)?;

    let response: Vec<ProductResponse> = products
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(response))
}
