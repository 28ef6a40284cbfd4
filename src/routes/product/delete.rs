use actix_web::{error::{ErrorInternalServerError, ErrorNotFound}, web, HttpResponse};
use uuid::Uuid;

use crate::{auth::extractors::IsOwner, auth::jwt::UserRole, db_interaction::{self, ProductDeleteError}, identity::resolve_owner_scope, utils::{get_pooled_connection, DbPool}};

#[tracing::instrument(
    "Deleting product",
    skip(pool, owner)
)]
pub async fn delete_product(
    pool: web::Data<DbPool>,
    product_id: web::Path<Uuid>,
    owner: IsOwner
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;
    let scope = resolve_owner_scope(conn, owner.0, UserRole::Owner).await?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    db_interaction::delete_product(conn, scope.owner_id, product_id.into_inner())
        .await
        .map_err(|e| {
            match e {
                ProductDeleteError::NotFound => ErrorNotFound("Product not found"),
                _ => ErrorInternalServerError(e)
            }
        })?;

    Ok(HttpResponse::NoContent().finish())
}
