use actix_web::{error::{ErrorBadRequest, ErrorInternalServerError}, web, HttpResponse};
use serde::Deserialize;

use crate::{auth::extractors::IsOwner, auth::jwt::UserRole, db_interaction::{self, CategoryInsertError}, identity::resolve_owner_scope, utils::{get_pooled_connection, non_empty, DbPool}};

use super::CategoryResponse;

#[derive(Deserialize, Debug)]
pub struct CreateCategoryRequest{
    name: String,
    description: Option<String>
}

#[tracing::instrument(
    "Creating category",
    skip(pool, owner)
)]
pub async fn post_category(
    pool: web::Data<DbPool>,
    form: web::Json<CreateCategoryRequest>,
    owner: IsOwner
) -> Result<HttpResponse, actix_web::Error> {
    if form.name.trim().is_empty() {
        return Err(ErrorBadRequest("Category name can't be empty"))
    }

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;
    let scope = resolve_owner_scope(conn, owner.0, UserRole::Owner).await?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let form = form.into_inner();
    let category = db_interaction::insert_category(
        conn,
        scope.owner_id,
        form.name.trim().to_string(),
        non_empty(form.description)
    )
    .await
    .map_err(|e| {
        match e {
            CategoryInsertError::DuplicateName(_) => {
                ErrorBadRequest("Category name can't have duplicate")
            },
            _ => ErrorInternalServerError(e)
        }
    })?;

    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}
