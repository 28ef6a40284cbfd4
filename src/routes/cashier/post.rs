use actix_web::{error::{ErrorBadRequest, ErrorInternalServerError}, web, HttpResponse};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{auth::extractors::IsOwner, auth::jwt::UserRole, db_interaction::{self, CashierInsertError}, domain::UserEmail, identity::resolve_owner_scope, utils::{get_pooled_connection, DbPool}};

use super::CashierResponse;

#[derive(Deserialize, Debug)]
pub struct CreateCashierRequest{
    user_name: String,
    email: String,
    password: SecretString
}

// Role and owner link always come from the caller's token; any client
// supplied values would be ignored.
#[tracing::instrument(
    "Creating cashier account",
    skip(pool, owner, form)
)]
pub async fn post_cashier(
    pool: web::Data<DbPool>,
    form: web::Json<CreateCashierRequest>,
    owner: IsOwner
) -> Result<HttpResponse, actix_web::Error> {
    if form.user_name.trim().is_empty() {
        return Err(ErrorBadRequest("User name can't be empty"))
    }

    if form.password.expose_secret().is_empty() {
        return Err(ErrorBadRequest("Password can't be empty"))
    }

    let email = UserEmail::parse(form.email.clone())
        .map_err(ErrorBadRequest)?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;
    let scope = resolve_owner_scope(conn, owner.0, UserRole::Owner).await?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let form = form.into_inner();
    let cashier = db_interaction::insert_cashier(
        conn,
        scope.owner_id,
        form.user_name.trim().to_string(),
        email.inner(),
        form.password
    )
    .await
    .map_err(|e| {
        match e {
            CashierInsertError::EmailNotUnique(_) => {
                ErrorBadRequest("Email is already in use")
            },
            _ => ErrorInternalServerError(e)
        }
    })?;

    Ok(HttpResponse::Ok().json(CashierResponse::from(cashier)))
}
