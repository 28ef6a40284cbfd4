use actix_web::{error::{ErrorInternalServerError, ErrorNotFound}, web, HttpResponse};
use uuid::Uuid;

use crate::{auth::extractors::IsOwner, auth::jwt::UserRole, db_interaction::{self, TransactionDeleteError}, identity::resolve_owner_scope, utils::{get_pooled_connection, DbPool}};

// Owner only; cashiers can never remove ledger rows.
#[tracing::instrument(
    "Deleting transaction",
    skip(pool, owner)
)]
pub async fn delete_transaction(
    pool: web::Data<DbPool>,
    transaction_id: web::Path<Uuid>,
    owner: IsOwner
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;
    let scope = resolve_owner_scope(conn, owner.0, UserRole::Owner).await?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    db_interaction::delete_transaction(conn, scope.owner_id, transaction_id.into_inner())
        .await
        .map_err(|e| {
            match e {
                TransactionDeleteError::NotFound => ErrorNotFound("Transaction not found"),
                _ => ErrorInternalServerError(e)
            }
        })?;

    Ok(HttpResponse::NoContent().finish())
}
