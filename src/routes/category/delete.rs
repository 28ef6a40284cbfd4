use actix_web::{error::{ErrorBadRequest, ErrorInternalServerError, ErrorNotFound}, web, HttpResponse};
use uuid::Uuid;

use crate::{auth::extractors::IsOwner, auth::jwt::UserRole, db_interaction::{self, CategoryDeleteError}, identity::resolve_owner_scope, utils::{get_pooled_connection, DbPool}};

#[tracing::instrument(
    "Deleting category",
    skip(pool, owner)
)]
pub async fn delete_category(
    pool: web::Data<DbPool>,
    category_id: web::Path<Uuid>,
    owner: IsOwner
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;
    let scope = resolve_owner_scope(conn, owner.0, UserRole::Owner).await?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    db_interaction::delete_category(conn, scope.owner_id, category_id.into_inner())
        .await
        .map_err(|e| {
            match e {
                CategoryDeleteError::NotFound => ErrorNotFound("Category not found"),
                CategoryDeleteError::HasProducts => {
                    ErrorBadRequest("Cannot delete category with associated products")
                },
                _ => ErrorInternalServerError(e)
            }
        })?;

    Ok(HttpResponse::NoContent().finish())
}
