use actix_web::{error::{ErrorBadRequest, ErrorInternalServerError, ErrorNotFound}, web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::extractors::IsOwner, auth::jwt::UserRole, db_interaction::{self, ProductChanges, ProductUpdateError}, identity::resolve_owner_scope, utils::{get_pooled_connection, non_empty, DbPool}};

use super::ProductResponse;

#[derive(Deserialize, Debug)]
pub struct EditProductRequest{
    name: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    discount: Option<f64>,
    category_id: Option<Uuid>,
    image_url: Option<String>
}

#[tracing::instrument(
    "Updating product",
    skip(pool, owner)
)]
pub async fn update_product(
    pool: web::Data<DbPool>,
    product_id: web::Path<Uuid>,
    form: web::Json<EditProductRequest>,
    owner: IsOwner
) -> Result<HttpResponse, actix_web::Error> {
    if form.price.map_or(false, |price| price < 0.0)
        || form.discount.map_or(false, |discount| discount < 0.0)
    {
        return Err(ErrorBadRequest("Price and discount must be non-negative"))
    }

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;
    let scope = resolve_owner_scope(conn, owner.0, UserRole::Owner).await?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let form = form.into_inner();
    let changes = ProductChanges{
        name: non_empty(form.name),
        description: non_empty(form.description),
        price: form.price,
        discount: form.discount,
        // Resolved against the owner scope by the store layer
        category_id: None,
        image_url: non_empty(form.image_url),
        updated_at: Some(Utc::now())
    };

    let product = db_interaction::update_product(
        conn,
        scope.owner_id,
        product_id.into_inner(),
        form.category_id,
        changes
    )
    .await
    .map_err(|e| {
        match e {
            ProductUpdateError::NotFound => ErrorNotFound("Product not found"),
            _ => ErrorInternalServerError(e)
        }
    })?;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}
