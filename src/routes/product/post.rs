use actix_web::{error::{ErrorBadRequest, ErrorInternalServerError}, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::extractors::IsOwner, auth::jwt::UserRole, db_interaction::{self, NewProductData}, identity::resolve_owner_scope, utils::{get_pooled_connection, non_empty, DbPool}};

use super::ProductResponse;

#[derive(Deserialize, Debug)]
pub struct CreateProductRequest{
    name: String,
    description: Option<String>,
    price: f64,
    #[serde(default)]
    discount: f64,
    category_id: Option<Uuid>,
    image_url: Option<String>
}

#[tracing::instrument(
    "Creating product",
    skip(pool, owner)
)]
pub async fn post_product(
    pool: web::Data<DbPool>,
    form: web::Json<CreateProductRequest>,
    owner: IsOwner
) -> Result<HttpResponse, actix_web::Error> {
    if form.name.trim().is_empty() {
        return Err(ErrorBadRequest("Product name can't be empty"))
    }

    if form.price < 0.0 || form.discount < 0.0 {
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
    let product = db_interaction::insert_product(
        conn,
        scope.owner_id,
        NewProductData{
            name: form.name.trim().to_string(),
            description: non_empty(form.description),
            price: form.price,
            discount: form.discount,
            category_id: form.category_id,
            image_url: non_empty(form.image_url)
        }
    )
    .await
    .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}
