use actix_web::{error::ErrorInternalServerError, web, HttpResponse};

use crate::{auth::extractors::IsOwner, auth::jwt::UserRole, db_interaction, identity::resolve_owner_scope, utils::{get_pooled_connection, DbPool}};

use super::CashierResponse;

#[tracing::instrument(
    "Getting list of cashiers",
    skip(pool, owner)
)]
pub async fn get_cashiers(
    pool: web::Data<DbPool>,
    owner: IsOwner
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;
    let scope = resolve_owner_scope(conn, owner.0, UserRole::Owner).await?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let cashiers = db_interaction::get_cashiers(conn, scope.owner_id)
        .await
        .map_err(ErrorInternalServerError)?;

    let response: Vec<CashierResponse> = cashiers
        .into_iter()
        .map(CashierResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(response))
}
