use actix_web::{error::ErrorInternalServerError, web, HttpResponse};

use crate::{auth::extractors::IsStaff, db_interaction, identity::resolve_owner_scope, utils::{get_pooled_connection, DbPool}};

use super::CategoryResponse;

#[tracing::instrument(
    "Getting list of categories",
    skip(pool, staff)
)]
pub async fn get_categories(
    pool: web::Data<DbPool>,
    staff: IsStaff
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;
    let scope = resolve_owner_scope(conn, staff.0, staff.1).await?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;
    let categories = db_interaction::get_categories(conn, scope.owner_id)
        .await
        .map_err(ErrorInternalServerError)?;

    let response: Vec<CategoryResponse> = categories
        .into_iter()
        .map(CategoryResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(response))
}
