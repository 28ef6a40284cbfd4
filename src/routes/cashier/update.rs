use actix_web::{error::{ErrorBadRequest, ErrorInternalServerError, ErrorNotFound}, web, HttpResponse};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::extractors::IsOwner, auth::jwt::UserRole, db_interaction::{self, CashierChanges, CashierUpdateError}, domain::UserEmail, identity::resolve_owner_scope, password::compute_password_hash, telemetry::spawn_blocking_with_tracing, utils::{get_pooled_connection, non_empty, DbPool}};

use super::CashierResponse;

#[derive(Deserialize, Debug)]
pub struct EditCashierRequest{
    user_name: Option<String>,
    email: Option<String>,
    password: Option<SecretString>,
    is_deactivated: Option<bool>
}

// Only username, email, password and the deactivation flag are editable;
// role and owner link stay fixed for the lifetime of the account.
#[tracing::instrument(
    "Updating cashier account",
    skip(pool, owner, form)
)]
pub async fn update_cashier(
    pool: web::Data<DbPool>,
    cashier_id: web::Path<Uuid>,
    form: web::Json<EditCashierRequest>,
    owner: IsOwner
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;
    let scope = resolve_owner_scope(conn, owner.0, UserRole::Owner).await?;

    let form = form.into_inner();

    let email = match non_empty(form.email) {
        Some(email) => Some(
            UserEmail::parse(email)
                .map_err(ErrorBadRequest)?
                .inner()
        ),
        None => None
    };

    let password_hash = match form.password {
        Some(password) => {
            if password.expose_secret().is_empty() {
                None
            } else {
                let hash = spawn_blocking_with_tracing(move || {
                    compute_password_hash(password)
                })
                .await
                .map_err(ErrorInternalServerError)?
                .map_err(ErrorInternalServerError)?;

                Some(hash.expose_secret().to_string())
            }
        },
        None => None
    };

    let changes = CashierChanges{
        user_name: non_empty(form.user_name),
        email,
        password: password_hash,
        is_deactivated: form.is_deactivated,
        updated_at: Some(Utc::now())
    };

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let cashier = db_interaction::update_cashier(
        conn,
        scope.owner_id,
        cashier_id.into_inner(),
        changes
    )
    .await
    .map_err(|e| {
        match e {
            CashierUpdateError::NotFound => {
                ErrorNotFound("Cashier not found or not owned by you")
            },
            CashierUpdateError::EmailNotUnique(_) => {
                ErrorBadRequest("Email is already in use")
            },
            _ => ErrorInternalServerError(e)
        }
    })?;

    Ok(HttpResponse::Ok().json(CashierResponse::from(cashier)))
}
