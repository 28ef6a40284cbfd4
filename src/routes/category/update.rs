use actix_web::{error::{ErrorBadRequest, ErrorInternalServerError, ErrorNotFound}, web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::extractors::IsOwner, auth::jwt::UserRole, db_interaction::{self, CategoryChanges, CategoryUpdateError}, identity::resolve_owner_scope, utils::{get_pooled_connection, non_empty, DbPool}};

use super::CategoryResponse;

#[derive(Deserialize, Debug)]
pub struct EditCategoryRequest{
    name: Option<String>,
    description: Option<String>
}

#[tracing::instrument(
    "Updating category",
    skip(pool, owner)
)]
pub async fn update_category(
    pool: web::Data<DbPool>,
    category_id: web::Path<Uuid>,
    form: web::Json<EditCategoryRequest>,
    owner: IsOwner
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;
    let scope = resolve_owner_scope(conn, owner.0, UserRole::Owner).await?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let form = form.into_inner();
    let changes = CategoryChanges{
        name: non_empty(form.name),
        description: non_empty(form.description),
        updated_at: Some(Utc::now())
    };

    let category = db_interaction::update_category(
        conn,
        scope.owner_id,
        category_id.into_inner(),
        changes
    )
    .await
    .map_err(|e| {
        match e {
            CategoryUpdateError::NotFound => ErrorNotFound("Category not found"),
            CategoryUpdateError::DuplicateName(_) => {
                ErrorBadRequest("Category name can't have duplicate")
            },
            _ => ErrorInternalServerError(e)
        }
    })?;

    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}
